// src/services/analytics_service.rs

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};

use crate::{
    common::{error::AppError, time_window::TimeWindow},
    db::{analytics_repo::LegacyStatus, AnalyticsRepository},
    models::{
        analytics::{
            CategoryReliability, DailyEnergy, DailyEnergyInputs, DailyReliability, DailyReport,
            DowntimeBucket, EnergyInputTotal, EquipmentReliability, LegacyWorkOrderRow,
            LegacyWorkRequestRow, MonthlyEnergy, MonthlyTrend, WeeklyDowntime, WeeklyStatusRollup,
        },
        energy::EnergyType,
    },
    services::{effects::{Effect, EffectRunner}, mailer::EmailMessage},
};

/// Read-only reports. Every query is bound to a validated `TimeWindow`.
#[derive(Clone)]
pub struct AnalyticsService {
    repo: AnalyticsRepository,
    effects: EffectRunner,
    report_recipient: String,
}

impl AnalyticsService {
    pub fn new(repo: AnalyticsRepository, effects: EffectRunner, report_recipient: String) -> Self {
        Self { repo, effects, report_recipient }
    }

    pub async fn active_work_orders(&self) -> Result<Vec<WeeklyStatusRollup>, AppError> {
        self.repo.weekly_status_rollup(LegacyStatus::Released).await
    }

    pub async fn unreleased_work_orders(&self) -> Result<Vec<WeeklyStatusRollup>, AppError> {
        self.repo.weekly_status_rollup(LegacyStatus::Unreleased).await
    }

    pub async fn work_order_list(&self) -> Result<Vec<LegacyWorkOrderRow>, AppError> {
        self.repo.legacy_work_orders().await
    }

    pub async fn work_request_list(&self) -> Result<Vec<LegacyWorkRequestRow>, AppError> {
        self.repo.legacy_work_requests().await
    }

    pub async fn daily_reliability(&self, window: TimeWindow) -> Result<Vec<DailyReliability>, AppError> {
        self.repo.daily_reliability(window).await
    }

    pub async fn category_reliability(&self, window: TimeWindow) -> Result<Vec<CategoryReliability>, AppError> {
        self.repo.category_reliability(window).await
    }

    pub async fn equipment_reliability(&self, window: TimeWindow) -> Result<Vec<EquipmentReliability>, AppError> {
        self.repo.equipment_reliability(window).await
    }

    pub async fn monthly_trend(&self, window: TimeWindow) -> Result<Vec<MonthlyTrend>, AppError> {
        self.repo.monthly_trend(window).await
    }

    pub async fn downtime(&self, window: TimeWindow) -> Result<Vec<WeeklyDowntime>, AppError> {
        let buckets = self.repo.downtime_buckets(window).await?;
        Ok(pivot_downtime(buckets))
    }

    pub async fn daily_energy(&self, window: TimeWindow) -> Result<Vec<DailyEnergy>, AppError> {
        self.repo.daily_energy(window).await
    }

    pub async fn monthly_energy(&self) -> Result<Vec<MonthlyEnergy>, AppError> {
        self.repo.monthly_energy().await
    }

    pub async fn energy_input_daily(&self, window: TimeWindow) -> Result<Vec<DailyEnergyInputs>, AppError> {
        let totals = self.repo.energy_input_totals(window).await?;
        Ok(pivot_energy_inputs(totals))
    }

    /// Summarises the previous calendar day and mails it. Mail is best-effort.
    pub async fn send_daily_report(&self) -> Result<DailyReport, AppError> {
        let day = Utc::now().date_naive() - Duration::days(1);
        let report = self.repo.daily_report(day).await?;

        tracing::info!(date = %report.report_date, "Daily maintenance report compiled");

        self.effects
            .run(vec![Effect::Email {
                message: daily_report_email(&report, &self.report_recipient),
                delivery_audit: None,
            }])
            .await;

        Ok(report)
    }
}

/// One row per week, planned and unplanned side by side. Missing halves are zero.
pub fn pivot_downtime(buckets: Vec<DowntimeBucket>) -> Vec<WeeklyDowntime> {
    let mut weeks: BTreeMap<NaiveDate, WeeklyDowntime> = BTreeMap::new();

    for bucket in buckets {
        let row = weeks.entry(bucket.week).or_insert(WeeklyDowntime {
            week: bucket.week,
            planned: 0.0,
            unplanned: 0.0,
        });
        if bucket.planned {
            row.planned += bucket.hours;
        } else {
            row.unplanned += bucket.hours;
        }
    }

    weeks.into_values().collect()
}

pub fn pivot_energy_inputs(totals: Vec<EnergyInputTotal>) -> Vec<DailyEnergyInputs> {
    let mut days: BTreeMap<NaiveDate, DailyEnergyInputs> = BTreeMap::new();

    for total in totals {
        let row = days.entry(total.date).or_insert(DailyEnergyInputs {
            date: total.date,
            electricity: 0.0,
            water: 0.0,
            cng: 0.0,
        });
        match total.energy_type {
            EnergyType::Electricity => row.electricity += total.total,
            EnergyType::Water => row.water += total.total,
            EnergyType::Cng => row.cng += total.total,
        }
    }

    days.into_values().collect()
}

fn daily_report_email(report: &DailyReport, to: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Daily Maintenance Report {}", report.report_date),
        body: format!(
            "Maintenance summary for {}\n\n\
             Work requests created: {}\n\
             Work requests approved: {}\n\
             Work orders completed: {}\n\
             Work orders still open: {}",
            report.report_date,
            report.work_requests_created,
            report.work_requests_approved,
            report.work_orders_completed,
            report.work_orders_open,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn downtime_pivot_fills_missing_side_with_zero() {
        let rows = pivot_downtime(vec![
            DowntimeBucket { week: day(10), planned: true, hours: 4.0 },
            DowntimeBucket { week: day(3), planned: false, hours: 2.5 },
            DowntimeBucket { week: day(10), planned: false, hours: 1.5 },
        ]);

        assert_eq!(
            rows,
            vec![
                WeeklyDowntime { week: day(3), planned: 0.0, unplanned: 2.5 },
                WeeklyDowntime { week: day(10), planned: 4.0, unplanned: 1.5 },
            ]
        );
    }

    #[test]
    fn energy_pivot_groups_by_day() {
        let rows = pivot_energy_inputs(vec![
            EnergyInputTotal { date: day(2), energy_type: EnergyType::Water, total: 12.0 },
            EnergyInputTotal { date: day(1), energy_type: EnergyType::Electricity, total: 300.0 },
            EnergyInputTotal { date: day(2), energy_type: EnergyType::Cng, total: 7.5 },
        ]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], DailyEnergyInputs { date: day(1), electricity: 300.0, water: 0.0, cng: 0.0 });
        assert_eq!(rows[1], DailyEnergyInputs { date: day(2), electricity: 0.0, water: 12.0, cng: 7.5 });
    }

    #[test]
    fn empty_inputs_give_empty_reports() {
        assert!(pivot_downtime(Vec::new()).is_empty());
        assert!(pivot_energy_inputs(Vec::new()).is_empty());
    }

    #[test]
    fn daily_report_email_lists_every_counter() {
        let report = DailyReport {
            report_date: day(9),
            work_requests_created: 4,
            work_requests_approved: 3,
            work_orders_completed: 2,
            work_orders_open: 11,
        };
        let email = daily_report_email(&report, "ops@plant.local");

        assert_eq!(email.to, "ops@plant.local");
        assert!(email.subject.ends_with("2025-03-09"));
        for needle in ["created: 4", "approved: 3", "completed: 2", "open: 11"] {
            assert!(email.body.contains(needle), "missing {needle}");
        }
    }
}
