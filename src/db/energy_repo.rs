// src/db/energy_repo.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::energy::{CreateEnergyInputPayload, EnergyInput, EnergyType},
};

const ENERGY_COLUMNS: &str = "id, user_id, date, type, value, meter_number, photo_url, created_at";

#[derive(Clone)]
pub struct EnergyRepository {
    pool: PgPool,
}

impl EnergyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, user_id: Uuid, payload: &CreateEnergyInputPayload) -> Result<EnergyInput, AppError> {
        let sql = format!(
            r#"
            INSERT INTO energy_inputs (user_id, date, type, value, meter_number, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ENERGY_COLUMNS}
            "#
        );
        let input = sqlx::query_as::<_, EnergyInput>(&sql)
            .bind(user_id)
            .bind(payload.date)
            .bind(payload.energy_type)
            .bind(payload.value)
            .bind(payload.meter_number.trim())
            .bind(&payload.photo_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(input)
    }

    pub async fn list_for_user(&self, user_id: Uuid, energy_type: Option<EnergyType>) -> Result<Vec<EnergyInput>, AppError> {
        let sql = format!(
            r#"
            SELECT {ENERGY_COLUMNS} FROM energy_inputs
            WHERE user_id = $1 AND ($2::energy_type IS NULL OR type = $2)
            ORDER BY created_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, EnergyInput>(&sql)
            .bind(user_id)
            .bind(energy_type)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Sum per type for one user and day. Types without readings are absent.
    pub async fn totals_for_day(&self, user_id: Uuid, date: NaiveDate) -> Result<Vec<(EnergyType, f64)>, AppError> {
        let rows = sqlx::query_as::<_, (EnergyType, f64)>(
            r#"
            SELECT type, COALESCE(SUM(value), 0)::float8
            FROM energy_inputs
            WHERE user_id = $1 AND date = $2
            GROUP BY type
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
