// src/db/work_order_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::work_order::{NewWorkOrder, UpdateWorkOrderPayload, WorkOrder, WorkOrderStamp, WorkOrderStatus},
};

const WO_COLUMNS: &str = r#"
    id, work_request_id, wo_number, wr_number, title, description,
    asset_number, asset_department, asset_group, asset_area, parent_asset,
    resource, urgency, wo_type, failure_code, failure_cause, resolution,
    actual_failure_date, completion_by_date, cost, status, wo_created_at,
    scheduled_start, wo_start_date, wo_completion_date, actual_duration,
    requester_id, engineer_id
"#;

#[derive(Clone)]
pub struct WorkOrderRepository {
    pool: PgPool,
}

impl WorkOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `work_request_id` and `wr_number` are UNIQUE, so a second order for the
    /// same request fails here and is reported as a conflict.
    pub async fn insert<'e, E>(&self, executor: E, new: &NewWorkOrder) -> Result<WorkOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO work_orders (
                work_request_id, wo_number, wr_number, title, description,
                asset_number, asset_department, resource, urgency, wo_type,
                failure_code, failure_cause, resolution,
                actual_failure_date, completion_by_date, status, requester_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, 'unreleased', $16)
            RETURNING {WO_COLUMNS}
            "#
        );

        sqlx::query_as::<_, WorkOrder>(&sql)
            .bind(new.work_request_id)
            .bind(&new.wo_number)
            .bind(&new.wr_number)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.asset_number)
            .bind(&new.asset_department)
            .bind(&new.resource)
            .bind(new.urgency)
            .bind(new.wo_type)
            .bind(&new.failure_code)
            .bind(&new.failure_cause)
            .bind(&new.resolution)
            .bind(new.actual_failure_date)
            .bind(new.completion_by_date)
            .bind(new.requester_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                AppError::from_unique_violation(
                    e,
                    format!("A work order already exists for {}.", new.wr_number),
                )
            })
    }

    pub async fn find_by_number(&self, wo_number: &str) -> Result<Option<WorkOrder>, AppError> {
        let sql = format!("SELECT {WO_COLUMNS} FROM work_orders WHERE wo_number = $1");
        let wo = sqlx::query_as::<_, WorkOrder>(&sql)
            .bind(wo_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(wo)
    }

    pub async fn find_by_number_for_update<'e, E>(
        &self,
        executor: E,
        wo_number: &str,
    ) -> Result<Option<WorkOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {WO_COLUMNS} FROM work_orders WHERE wo_number = $1 FOR UPDATE");
        let wo = sqlx::query_as::<_, WorkOrder>(&sql)
            .bind(wo_number)
            .fetch_optional(executor)
            .await?;
        Ok(wo)
    }

    pub async fn list_all(&self, status: Option<WorkOrderStatus>) -> Result<Vec<WorkOrder>, AppError> {
        let sql = format!(
            r#"
            SELECT {WO_COLUMNS} FROM work_orders
            WHERE ($1::wo_status IS NULL OR status = $1)
            ORDER BY wo_created_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, WorkOrder>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn apply_stamp<'e, E>(&self, executor: E, id: Uuid, stamp: &WorkOrderStamp) -> Result<WorkOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE work_orders
            SET status = $2, wo_start_date = $3, wo_completion_date = $4, actual_duration = $5
            WHERE id = $1
            RETURNING {WO_COLUMNS}
            "#
        );
        let wo = sqlx::query_as::<_, WorkOrder>(&sql)
            .bind(id)
            .bind(stamp.status)
            .bind(stamp.wo_start_date)
            .bind(stamp.wo_completion_date)
            .bind(stamp.actual_duration)
            .fetch_one(executor)
            .await?;
        Ok(wo)
    }

    /// Absent fields keep their stored value.
    pub async fn update_details(&self, id: Uuid, payload: &UpdateWorkOrderPayload) -> Result<WorkOrder, AppError> {
        let sql = format!(
            r#"
            UPDATE work_orders SET
                asset_group         = COALESCE($2, asset_group),
                asset_area          = COALESCE($3, asset_area),
                parent_asset        = COALESCE($4, parent_asset),
                failure_code        = COALESCE($5, failure_code),
                failure_cause       = COALESCE($6, failure_cause),
                resolution          = COALESCE($7, resolution),
                cost                = COALESCE($8, cost),
                actual_failure_date = COALESCE($9, actual_failure_date),
                completion_by_date  = COALESCE($10, completion_by_date),
                scheduled_start     = COALESCE($11, scheduled_start),
                engineer_id         = COALESCE($12, engineer_id)
            WHERE id = $1
            RETURNING {WO_COLUMNS}
            "#
        );
        let wo = sqlx::query_as::<_, WorkOrder>(&sql)
            .bind(id)
            .bind(&payload.asset_group)
            .bind(&payload.asset_area)
            .bind(&payload.parent_asset)
            .bind(&payload.failure_code)
            .bind(&payload.failure_cause)
            .bind(&payload.resolution)
            .bind(payload.cost)
            .bind(payload.actual_failure_date)
            .bind(payload.completion_by_date)
            .bind(payload.scheduled_start)
            .bind(payload.engineer_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(wo)
    }

    /// Flips every planned order scheduled for the calendar day of `now` to released.
    /// Running it twice releases nothing the second time.
    pub async fn release_planned_for_day<'e, E>(&self, executor: E, now: DateTime<Utc>) -> Result<Vec<WorkOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE work_orders
            SET status = 'released', wo_start_date = COALESCE(wo_start_date, $1)
            WHERE status = 'planned'
              AND scheduled_start >= date_trunc('day', $1)
              AND scheduled_start < date_trunc('day', $1) + INTERVAL '1 day'
            RETURNING {WO_COLUMNS}
            "#
        );
        let rows = sqlx::query_as::<_, WorkOrder>(&sql)
            .bind(now)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{UserRepository, WorkRequestRepository},
        models::{
            auth::Role,
            work_request::{NewWorkRequest, Urgency, WorkType},
        },
        services::lifecycle,
    };

    #[sqlx::test(migrations = "./migrations")]
    async fn second_order_for_a_request_is_a_conflict(pool: PgPool) {
        let requester = UserRepository::new(pool.clone())
            .create_user(&pool, "shift.lead", "shift.lead@plant.local", "x", "Shift Lead", Role::Requester, "")
            .await
            .unwrap();
        let wr = WorkRequestRepository::new(pool.clone())
            .insert(
                &pool,
                &NewWorkRequest {
                    wr_number: "WR-ABC123".to_string(),
                    title: "Chiller alarm".to_string(),
                    description: "High pressure trip".to_string(),
                    asset_number: "CHL-0001".to_string(),
                    asset_department: "EN".to_string(),
                    resource: "MTC".to_string(),
                    urgency: Urgency::Medium,
                    wr_type: WorkType::Inspection,
                    failure_code: None,
                    failure_cause: None,
                    resolution: None,
                    actual_failure_date: None,
                    completion_by_date: None,
                    requested_by: requester,
                },
            )
            .await
            .unwrap();

        let repo = WorkOrderRepository::new(pool.clone());
        let first = repo
            .insert(&pool, &lifecycle::work_order_from_request(&wr, "WO-11111111".to_string()))
            .await
            .unwrap();
        assert_eq!(first.status, WorkOrderStatus::Unreleased);

        let second = repo
            .insert(&pool, &lifecycle::work_order_from_request(&wr, "WO-22222222".to_string()))
            .await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }
}
