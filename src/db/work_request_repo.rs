// src/db/work_request_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::work_request::{NewWorkRequest, WorkRequest, WorkRequestStatus},
};

const WR_COLUMNS: &str = r#"
    id, wr_number, title, description, asset_number, asset_department, resource,
    urgency, wr_type, failure_code, failure_cause, resolution,
    actual_failure_date, completion_by_date, status, requested_by,
    created_at, approved_at
"#;

#[derive(Clone)]
pub struct WorkRequestRepository {
    pool: PgPool,
}

impl WorkRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A clash on `wr_number` comes back as `Conflict` so the caller can draw a new number.
    pub async fn insert<'e, E>(&self, executor: E, new: &NewWorkRequest) -> Result<WorkRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO work_requests (
                wr_number, title, description, asset_number, asset_department, resource,
                urgency, wr_type, failure_code, failure_cause, resolution,
                actual_failure_date, completion_by_date, status, requested_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'pending', $14)
            RETURNING {WR_COLUMNS}
            "#
        );

        sqlx::query_as::<_, WorkRequest>(&sql)
            .bind(&new.wr_number)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.asset_number)
            .bind(&new.asset_department)
            .bind(&new.resource)
            .bind(new.urgency)
            .bind(new.wr_type)
            .bind(&new.failure_code)
            .bind(&new.failure_cause)
            .bind(&new.resolution)
            .bind(new.actual_failure_date)
            .bind(new.completion_by_date)
            .bind(new.requested_by)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_unique_violation(e, format!("wr_number {} already taken", new.wr_number)))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<WorkRequest>, AppError> {
        let sql = format!("SELECT {WR_COLUMNS} FROM work_requests WHERE id = $1");
        let wr = sqlx::query_as::<_, WorkRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(wr)
    }

    /// Row-locks the request for the rest of the transaction.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<WorkRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {WR_COLUMNS} FROM work_requests WHERE id = $1 FOR UPDATE");
        let wr = sqlx::query_as::<_, WorkRequest>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(wr)
    }

    pub async fn list_all(&self) -> Result<Vec<WorkRequest>, AppError> {
        let sql = format!("SELECT {WR_COLUMNS} FROM work_requests ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, WorkRequest>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_by_requester(&self, user_id: Uuid) -> Result<Vec<WorkRequest>, AppError> {
        let sql = format!(
            "SELECT {WR_COLUMNS} FROM work_requests WHERE requested_by = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, WorkRequest>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Only moves a request that is still pending; `None` means somebody else decided first.
    /// `approved_at` is never overwritten once set.
    pub async fn decide<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: WorkRequestStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<Option<WorkRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE work_requests
            SET status = $2, approved_at = COALESCE(approved_at, $3)
            WHERE id = $1 AND status = 'pending'
            RETURNING {WR_COLUMNS}
            "#
        );
        let wr = sqlx::query_as::<_, WorkRequest>(&sql)
            .bind(id)
            .bind(status)
            .bind(approved_at)
            .fetch_optional(executor)
            .await?;
        Ok(wr)
    }
}
