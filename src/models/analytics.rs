// src/models/analytics.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::energy::EnergyType;

// --- Legacy work-order rollups ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct WeeklyStatusRollup {
    pub year: i32,
    pub month: i32,
    pub week_of_month: i32,
    pub count: i64,
    pub last_week_count: Option<i64>,
    /// `count - last_week_count`, a missing previous week counts as zero
    pub diff_from_last_week: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LegacyWorkOrderRow {
    pub no: i32,
    pub title: Option<String>,
    pub wo_created_date: Option<DateTime<Utc>>,
    pub wo_status: Option<String>,
    pub resource: Option<String>,
    pub wo_description: Option<String>,
    pub wo_type: Option<String>,
    pub wr_requestor: Option<String>,
    pub wo_actual_completion_date: Option<DateTime<Utc>>,
    pub actual_duration_hours: Option<f64>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub week_of_month: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LegacyWorkRequestRow {
    pub wr_number: Option<String>,
    pub title: Option<String>,
    pub wo_description: Option<String>,
    pub resource: Option<String>,
    pub wr_type: Option<String>,
    pub wr_request_by_date: DateTime<Utc>,
    pub wr_requestor: Option<String>,
    pub year: i32,
    pub month: i32,
    pub week_of_month: i32,
}

// --- Reliability (MTTR / MTBF) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DailyReliability {
    pub date: NaiveDate,
    pub mttr_hours: f64,
    /// Absent until the series has two failures
    pub mtbf_hours: Option<f64>,
    pub failure_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CategoryReliability {
    #[schema(example = "MTC")]
    pub category: String,
    pub mttr: f64,
    pub mtbf: Option<f64>,
    pub failure_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EquipmentReliability {
    #[schema(example = "Boiler")]
    pub equipment: String,
    pub mttr: f64,
    pub mtbf: Option<f64>,
    pub failure_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MonthlyTrend {
    pub year: i32,
    pub month: i32,
    #[schema(example = "Mar")]
    pub month_name: String,
    pub work_order_count: i64,
    pub completed_count: i64,
    pub mttr_hours: f64,
    pub last_month_count: Option<i64>,
    pub diff_from_last_month: i64,
}

// --- Downtime ---

/// One SQL row: hours for one ISO week, either planned or not.
#[derive(Debug, Clone, FromRow)]
pub struct DowntimeBucket {
    pub week: NaiveDate,
    pub planned: bool,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeeklyDowntime {
    /// Monday of the ISO week
    pub week: NaiveDate,
    pub planned: f64,
    pub unplanned: f64,
}

// --- Energy ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DailyEnergy {
    pub date: NaiveDate,
    pub water_consumption: f64,
    pub cng_consumption: f64,
    pub electricity_consumption: f64,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub week_of_month: i32,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MonthlyEnergy {
    pub year: i32,
    pub month: i32,
    pub month_name: String,
    pub water_monthly: f64,
    pub cng_monthly: f64,
    pub electricity_monthly: f64,
    pub water_diff: f64,
    pub cng_diff: f64,
    pub electricity_diff: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct EnergyInputTotal {
    pub date: NaiveDate,
    pub energy_type: EnergyType,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyEnergyInputs {
    pub date: NaiveDate,
    pub electricity: f64,
    pub water: f64,
    pub cng: f64,
}

// --- Daily report ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DailyReport {
    pub report_date: NaiveDate,
    pub work_requests_created: i64,
    pub work_requests_approved: i64,
    pub work_orders_completed: i64,
    pub work_orders_open: i64,
}
