// src/services/energy_service.rs

use chrono::Utc;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::EnergyRepository,
    models::{
        auth::User,
        energy::{CreateEnergyInputPayload, EnergyInput, EnergyType, TodayEnergy},
    },
};

const DAILY_BUDGET: f64 = 100.0;

#[derive(Clone)]
pub struct EnergyService {
    repo: EnergyRepository,
}

impl EnergyService {
    pub fn new(repo: EnergyRepository) -> Self {
        Self { repo }
    }

    pub async fn submit(&self, actor: &User, payload: CreateEnergyInputPayload) -> Result<EnergyInput, AppError> {
        payload.validate()?;

        let input = self.repo.insert(actor.id, &payload).await?;
        tracing::info!(
            user = %actor.username,
            energy_type = ?input.energy_type,
            meter = %input.meter_number,
            "Energy reading recorded"
        );
        Ok(input)
    }

    pub async fn list_mine(&self, actor: &User, energy_type: Option<EnergyType>) -> Result<Vec<EnergyInput>, AppError> {
        self.repo.list_for_user(actor.id, energy_type).await
    }

    pub async fn today(&self, actor: &User) -> Result<Vec<TodayEnergy>, AppError> {
        let totals = self.repo.totals_for_day(actor.id, Utc::now().date_naive()).await?;
        Ok(today_summary(&totals))
    }
}

/// One entry per energy type, zero when nothing was read today.
fn today_summary(totals: &[(EnergyType, f64)]) -> Vec<TodayEnergy> {
    EnergyType::ALL
        .iter()
        .map(|&energy_type| TodayEnergy {
            energy_type,
            current: totals
                .iter()
                .filter(|(t, _)| *t == energy_type)
                .map(|(_, v)| v)
                .sum(),
            budget: DAILY_BUDGET,
            unit: energy_type.unit(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_covers_every_type() {
        let summary = today_summary(&[(EnergyType::Water, 42.0)]);

        assert_eq!(summary.len(), 3);
        let water = summary.iter().find(|s| s.energy_type == EnergyType::Water).unwrap();
        assert_eq!(water.current, 42.0);
        assert_eq!(water.unit, "m³");

        let power = summary.iter().find(|s| s.energy_type == EnergyType::Electricity).unwrap();
        assert_eq!(power.current, 0.0);
        assert_eq!(power.unit, "kWh");
        assert!(summary.iter().all(|s| s.budget == DAILY_BUDGET));
    }
}
