// src/models/energy.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "energy_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnergyType {
    Electricity,
    Water,
    Cng,
}

impl EnergyType {
    pub const ALL: [EnergyType; 3] = [EnergyType::Electricity, EnergyType::Water, EnergyType::Cng];

    pub fn unit(self) -> &'static str {
        match self {
            EnergyType::Electricity => "kWh",
            EnergyType::Water | EnergyType::Cng => "m³",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EnergyInput {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub energy_type: EnergyType,
    #[schema(example = "1520.50")]
    pub value: Decimal,
    pub meter_number: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("Reading value must be greater than zero.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEnergyInputPayload {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub energy_type: EnergyType,
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "1520.50")]
    pub value: Decimal,
    #[validate(length(min = 1, max = 100, message = "Meter number is required."))]
    pub meter_number: String,
    #[validate(url(message = "Photo must be a URL."))]
    pub photo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct EnergyInputQuery {
    #[serde(rename = "type")]
    pub energy_type: Option<EnergyType>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TodayEnergy {
    #[serde(rename = "type")]
    pub energy_type: EnergyType,
    pub current: f64,
    pub budget: f64,
    pub unit: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(value: Decimal) -> CreateEnergyInputPayload {
        CreateEnergyInputPayload {
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            energy_type: EnergyType::Electricity,
            value,
            meter_number: "EL-01".into(),
            photo_url: None,
        }
    }

    #[test]
    fn reading_must_be_positive() {
        assert!(payload(Decimal::new(1520, 1)).validate().is_ok());
        assert!(payload(Decimal::ZERO).validate().is_err());
        assert!(payload(Decimal::new(-5, 0)).validate().is_err());
    }

    #[test]
    fn type_field_uses_its_wire_name() {
        let parsed: EnergyInputQuery = serde_json::from_str(r#"{"type":"cng"}"#).unwrap();
        assert_eq!(parsed.energy_type, Some(EnergyType::Cng));
    }
}
