// src/db/analytics_repo.rs
//
// Read-only reporting queries. Most of them run against the legacy
// `main_data` / `energy` tables. Every statement is a fixed template; the
// only runtime inputs are bound parameters.

use chrono::NaiveDate;
use sqlx::{postgres::PgRow, FromRow, PgPool};

use crate::{
    common::{error::AppError, time_window::TimeWindow},
    models::analytics::{
        CategoryReliability, DailyEnergy, DailyReliability, DailyReport, DowntimeBucket,
        EnergyInputTotal, EquipmentReliability, LegacyWorkOrderRow, LegacyWorkRequestRow,
        MonthlyEnergy, MonthlyTrend, WeeklyStatusRollup,
    },
};

/// Work-order types counted as planned downtime (compared lower-cased).
pub const PLANNED_WORK_TYPES: [&str; 5] = ["preventive", "routine", "inspection", "calibration", "pm"];

/// Legacy `wo_status` values used by the weekly rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyStatus {
    Released,
    Unreleased,
}

impl LegacyStatus {
    fn as_str(self) -> &'static str {
        match self {
            LegacyStatus::Released => "Released",
            LegacyStatus::Unreleased => "Unreleased",
        }
    }
}

/// Grouping key for the MTTR/MTBF report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReliabilityKey {
    /// Calendar day. Failure gaps run across the whole series and are
    /// attributed to the day of the later failure.
    Day,
    /// `resource`, gaps measured within each resource.
    Category,
    /// `asset_group`, gaps measured within each group.
    Equipment,
}

impl ReliabilityKey {
    fn repair_key(self) -> &'static str {
        match self {
            ReliabilityKey::Day => "wo_actual_completion_date::date",
            ReliabilityKey::Category => "COALESCE(resource, 'Unassigned')",
            ReliabilityKey::Equipment => "COALESCE(asset_group, 'Unassigned')",
        }
    }

    fn failure_key(self) -> &'static str {
        match self {
            ReliabilityKey::Day => "actual_failure_date::date",
            other => other.repair_key(),
        }
    }

    fn partition(self) -> &'static str {
        match self {
            ReliabilityKey::Day => "",
            ReliabilityKey::Category => "PARTITION BY COALESCE(resource, 'Unassigned') ",
            ReliabilityKey::Equipment => "PARTITION BY COALESCE(asset_group, 'Unassigned') ",
        }
    }

    fn columns(self) -> (&'static str, &'static str, &'static str) {
        match self {
            ReliabilityKey::Day => ("date", "mttr_hours", "mtbf_hours"),
            ReliabilityKey::Category => ("category", "mttr", "mtbf"),
            ReliabilityKey::Equipment => ("equipment", "mttr", "mtbf"),
        }
    }
}

/// MTTR: mean of (completion - start) in hours over rows with both stamps and
/// completion >= start. MTBF: mean gap between consecutive failures; the first
/// failure of a series has no gap and is left out of the mean, so a key with a
/// single failure gets a NULL MTBF.
pub fn reliability_sql(key: ReliabilityKey) -> String {
    let (alias, mttr, mtbf) = key.columns();
    format!(
        r#"
        WITH scoped AS (
            SELECT *
            FROM main_data
            WHERE COALESCE(wo_actual_completion_date, actual_failure_date, wo_created_date)
                  >= now() - make_interval(days => $1)
        ),
        repairs AS (
            SELECT {repair_key} AS key,
                   AVG(EXTRACT(EPOCH FROM (wo_actual_completion_date - wo_actual_start_date)) / 3600) AS mttr_hours
            FROM scoped
            WHERE wo_actual_start_date IS NOT NULL
              AND wo_actual_completion_date IS NOT NULL
              AND wo_actual_completion_date >= wo_actual_start_date
            GROUP BY 1
        ),
        failures AS (
            SELECT {failure_key} AS key,
                   EXTRACT(EPOCH FROM (
                       actual_failure_date
                       - LAG(actual_failure_date) OVER ({partition}ORDER BY actual_failure_date)
                   )) / 3600 AS gap_hours
            FROM scoped
            WHERE actual_failure_date IS NOT NULL
        ),
        failure_counts AS (
            SELECT key, COUNT(*) AS failure_count FROM failures GROUP BY key
        ),
        gaps AS (
            SELECT key, AVG(gap_hours) AS mtbf_hours
            FROM failures
            WHERE gap_hours IS NOT NULL
            GROUP BY key
        ),
        keys AS (
            SELECT key FROM repairs
            UNION
            SELECT key FROM failure_counts
        )
        SELECT k.key AS {alias},
               COALESCE(r.mttr_hours, 0)::float8 AS {mttr},
               g.mtbf_hours::float8 AS {mtbf},
               COALESCE(c.failure_count, 0) AS failure_count
        FROM keys k
        LEFT JOIN repairs r ON r.key = k.key
        LEFT JOIN gaps g ON g.key = k.key
        LEFT JOIN failure_counts c ON c.key = k.key
        ORDER BY 1
        "#,
        repair_key = key.repair_key(),
        failure_key = key.failure_key(),
        partition = key.partition(),
    )
}

const WEEKLY_STATUS_SQL: &str = r#"
    WITH weekly AS (
        SELECT
            EXTRACT(YEAR FROM wo_created_date)::int AS year,
            EXTRACT(MONTH FROM wo_created_date)::int AS month,
            (FLOOR((EXTRACT(DAY FROM wo_created_date) - 1) / 7) + 1)::int AS week_of_month,
            COUNT(*) AS count
        FROM main_data
        WHERE wo_status = $1 AND wo_created_date IS NOT NULL
        GROUP BY 1, 2, 3
    )
    SELECT
        year, month, week_of_month, count,
        LAG(count) OVER w AS last_week_count,
        count - COALESCE(LAG(count) OVER w, 0) AS diff_from_last_week
    FROM weekly
    WINDOW w AS (PARTITION BY year, month ORDER BY week_of_month)
    ORDER BY year DESC, month DESC, week_of_month DESC
"#;

const WORK_ORDER_LIST_SQL: &str = r#"
    SELECT
        no, title, wo_created_date, wo_status, resource, wo_description, wo_type,
        wr_requestor, wo_actual_completion_date,
        (EXTRACT(EPOCH FROM actual_duration) / 3600)::float8 AS actual_duration_hours,
        EXTRACT(YEAR FROM wo_created_date)::int AS year,
        EXTRACT(MONTH FROM wo_created_date)::int AS month,
        (FLOOR((EXTRACT(DAY FROM wo_created_date) - 1) / 7) + 1)::int AS week_of_month
    FROM main_data
    ORDER BY wo_created_date DESC NULLS LAST
"#;

const WORK_REQUEST_LIST_SQL: &str = r#"
    SELECT
        wr_number, title, wo_description, resource, wr_type, wr_request_by_date, wr_requestor,
        EXTRACT(YEAR FROM wr_request_by_date)::int AS year,
        EXTRACT(MONTH FROM wr_request_by_date)::int AS month,
        (FLOOR((EXTRACT(DAY FROM wr_request_by_date) - 1) / 7) + 1)::int AS week_of_month
    FROM main_data
    WHERE wr_request_by_date IS NOT NULL
    ORDER BY wr_request_by_date DESC
"#;

const MONTHLY_TREND_SQL: &str = r#"
    WITH monthly AS (
        SELECT
            EXTRACT(YEAR FROM wo_created_date)::int AS year,
            EXTRACT(MONTH FROM wo_created_date)::int AS month,
            COUNT(*) AS work_order_count,
            COUNT(*) FILTER (WHERE wo_actual_completion_date IS NOT NULL) AS completed_count,
            COALESCE(
                AVG(EXTRACT(EPOCH FROM (wo_actual_completion_date - wo_actual_start_date)) / 3600)
                    FILTER (WHERE wo_actual_start_date IS NOT NULL
                              AND wo_actual_completion_date >= wo_actual_start_date),
                0
            )::float8 AS mttr_hours
        FROM main_data
        WHERE wo_created_date >= now() - make_interval(days => $1)
        GROUP BY 1, 2
    )
    SELECT
        year, month,
        trim(to_char(make_date(year, month, 1), 'Mon')) AS month_name,
        work_order_count, completed_count, mttr_hours,
        LAG(work_order_count) OVER w AS last_month_count,
        work_order_count - COALESCE(LAG(work_order_count) OVER w, 0) AS diff_from_last_month
    FROM monthly
    WINDOW w AS (PARTITION BY year ORDER BY month)
    ORDER BY year, month
"#;

const DOWNTIME_SQL: &str = r#"
    SELECT
        date_trunc('week', wo_actual_completion_date)::date AS week,
        (lower(COALESCE(wo_type, '')) = ANY($2)) AS planned,
        COALESCE(SUM(EXTRACT(EPOCH FROM COALESCE(
            actual_duration,
            wo_actual_completion_date - wo_actual_start_date
        )) / 3600), 0)::float8 AS hours
    FROM main_data
    WHERE wo_actual_completion_date >= now() - make_interval(days => $1)
    GROUP BY 1, 2
    ORDER BY 1
"#;

const ENERGY_DAILY_SQL: &str = r#"
    SELECT
        date,
        water_consumption::float8 AS water_consumption,
        cng_consumption::float8 AS cng_consumption,
        electricity_consumption::float8 AS electricity_consumption,
        EXTRACT(YEAR FROM date)::int AS year,
        EXTRACT(MONTH FROM date)::int AS month,
        EXTRACT(DAY FROM date)::int AS day,
        (FLOOR((EXTRACT(DAY FROM date) - 1) / 7) + 1)::int AS week_of_month
    FROM energy
    WHERE date >= CURRENT_DATE - $1
    ORDER BY date
"#;

const ENERGY_MONTHLY_SQL: &str = r#"
    WITH monthly AS (
        SELECT
            EXTRACT(YEAR FROM date)::int AS year,
            EXTRACT(MONTH FROM date)::int AS month,
            SUM(water_consumption)::float8 AS water_monthly,
            SUM(cng_consumption)::float8 AS cng_monthly,
            SUM(electricity_consumption)::float8 AS electricity_monthly
        FROM energy
        GROUP BY 1, 2
    )
    SELECT
        year, month,
        trim(to_char(make_date(year, month, 1), 'Mon')) AS month_name,
        water_monthly, cng_monthly, electricity_monthly,
        (water_monthly - COALESCE(LAG(water_monthly) OVER w, 0))::float8 AS water_diff,
        (cng_monthly - COALESCE(LAG(cng_monthly) OVER w, 0))::float8 AS cng_diff,
        (electricity_monthly - COALESCE(LAG(electricity_monthly) OVER w, 0))::float8 AS electricity_diff
    FROM monthly
    WINDOW w AS (PARTITION BY year ORDER BY month)
    ORDER BY year, month
"#;

const ENERGY_INPUT_TOTALS_SQL: &str = r#"
    SELECT date, type AS energy_type, SUM(value)::float8 AS total
    FROM energy_inputs
    WHERE date >= CURRENT_DATE - $1
    GROUP BY 1, 2
    ORDER BY 1
"#;

const DAILY_REPORT_SQL: &str = r#"
    SELECT
        $1::date AS report_date,
        (SELECT COUNT(*) FROM work_requests WHERE created_at::date = $1) AS work_requests_created,
        (SELECT COUNT(*) FROM work_requests WHERE approved_at::date = $1) AS work_requests_approved,
        (SELECT COUNT(*) FROM work_orders WHERE wo_completion_date::date = $1) AS work_orders_completed,
        (SELECT COUNT(*) FROM work_orders
           WHERE status IN ('unreleased', 'planned', 'released')) AS work_orders_open
"#;

#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn weekly_status_rollup(&self, status: LegacyStatus) -> Result<Vec<WeeklyStatusRollup>, AppError> {
        let rows = sqlx::query_as::<_, WeeklyStatusRollup>(WEEKLY_STATUS_SQL)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn legacy_work_orders(&self) -> Result<Vec<LegacyWorkOrderRow>, AppError> {
        let rows = sqlx::query_as::<_, LegacyWorkOrderRow>(WORK_ORDER_LIST_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn legacy_work_requests(&self) -> Result<Vec<LegacyWorkRequestRow>, AppError> {
        let rows = sqlx::query_as::<_, LegacyWorkRequestRow>(WORK_REQUEST_LIST_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn reliability<T>(&self, key: ReliabilityKey, window: TimeWindow) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = reliability_sql(key);
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(window.days())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn daily_reliability(&self, window: TimeWindow) -> Result<Vec<DailyReliability>, AppError> {
        self.reliability(ReliabilityKey::Day, window).await
    }

    pub async fn category_reliability(&self, window: TimeWindow) -> Result<Vec<CategoryReliability>, AppError> {
        self.reliability(ReliabilityKey::Category, window).await
    }

    pub async fn equipment_reliability(&self, window: TimeWindow) -> Result<Vec<EquipmentReliability>, AppError> {
        self.reliability(ReliabilityKey::Equipment, window).await
    }

    pub async fn monthly_trend(&self, window: TimeWindow) -> Result<Vec<MonthlyTrend>, AppError> {
        let rows = sqlx::query_as::<_, MonthlyTrend>(MONTHLY_TREND_SQL)
            .bind(window.days())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn downtime_buckets(&self, window: TimeWindow) -> Result<Vec<DowntimeBucket>, AppError> {
        let rows = sqlx::query_as::<_, DowntimeBucket>(DOWNTIME_SQL)
            .bind(window.days())
            .bind(&PLANNED_WORK_TYPES[..])
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn daily_energy(&self, window: TimeWindow) -> Result<Vec<DailyEnergy>, AppError> {
        let rows = sqlx::query_as::<_, DailyEnergy>(ENERGY_DAILY_SQL)
            .bind(window.days())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn monthly_energy(&self) -> Result<Vec<MonthlyEnergy>, AppError> {
        let rows = sqlx::query_as::<_, MonthlyEnergy>(ENERGY_MONTHLY_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn energy_input_totals(&self, window: TimeWindow) -> Result<Vec<EnergyInputTotal>, AppError> {
        let rows = sqlx::query_as::<_, EnergyInputTotal>(ENERGY_INPUT_TOTALS_SQL)
            .bind(window.days())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn daily_report(&self, date: NaiveDate) -> Result<DailyReport, AppError> {
        let report = sqlx::query_as::<_, DailyReport>(DAILY_REPORT_SQL)
            .bind(date)
            .fetch_one(&self.pool)
            .await?;
        Ok(report)
    }
}
