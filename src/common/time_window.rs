// src/common/time_window.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::error::AppError;

/// Reporting window accepted by the analytics endpoints.
/// Only these values ever reach SQL, and only as a bound integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub enum TimeWindow {
    #[default]
    Last30Days,
    Last90Days,
    Last180Days,
    Last365Days,
}

impl TimeWindow {
    pub fn days(self) -> i32 {
        match self {
            TimeWindow::Last30Days => 30,
            TimeWindow::Last90Days => 90,
            TimeWindow::Last180Days => 180,
            TimeWindow::Last365Days => 365,
        }
    }

    /// Accepts `30`, `30d` or `30days` style values.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim().to_ascii_lowercase();
        let digits = trimmed
            .strip_suffix("days")
            .or_else(|| trimmed.strip_suffix('d'))
            .unwrap_or(&trimmed);

        match digits {
            "30" => Ok(TimeWindow::Last30Days),
            "90" => Ok(TimeWindow::Last90Days),
            "180" => Ok(TimeWindow::Last180Days),
            "365" => Ok(TimeWindow::Last365Days),
            _ => Err(AppError::BadRequest(format!(
                "Unsupported period '{}'. Use one of 30, 90, 180, 365.",
                raw
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PeriodQuery {
    /// Days to look back: 30, 90, 180 or 365 (default 30)
    pub period: Option<String>,
}

impl PeriodQuery {
    pub fn window(&self) -> Result<TimeWindow, AppError> {
        match self.period.as_deref() {
            None | Some("") => Ok(TimeWindow::default()),
            Some(raw) => TimeWindow::parse(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_fixed_windows() {
        assert_eq!(TimeWindow::parse("30").unwrap().days(), 30);
        assert_eq!(TimeWindow::parse("90d").unwrap(), TimeWindow::Last90Days);
        assert_eq!(TimeWindow::parse(" 180days ").unwrap(), TimeWindow::Last180Days);
        assert_eq!(TimeWindow::parse("365").unwrap().days(), 365);
    }

    #[test]
    fn rejects_anything_else() {
        for raw in ["7", "-30", "30; DROP TABLE main_data", "1 year", "abc"] {
            assert!(matches!(TimeWindow::parse(raw), Err(AppError::BadRequest(_))), "{raw}");
        }
    }

    #[test]
    fn missing_period_defaults_to_thirty_days() {
        let q = PeriodQuery::default();
        assert_eq!(q.window().unwrap(), TimeWindow::Last30Days);
        let q = PeriodQuery { period: Some(String::new()) };
        assert_eq!(q.window().unwrap().days(), 30);
    }
}
