// src/services/work_order_service.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    common::{error::AppError, identifiers},
    db::{UserRepository, WorkOrderRepository},
    models::{
        auth::User,
        work_order::{
            ScheduledReleaseResult, UpdateWorkOrderPayload, WorkOrder, WorkOrderStatus,
        },
    },
    services::{effects::EffectRunner, lifecycle},
};

#[derive(Clone)]
pub struct WorkOrderService {
    pool: PgPool,
    wo_repo: WorkOrderRepository,
    user_repo: UserRepository,
    effects: EffectRunner,
    default_recipient: String,
}

impl WorkOrderService {
    pub fn new(
        pool: PgPool,
        wo_repo: WorkOrderRepository,
        user_repo: UserRepository,
        effects: EffectRunner,
        default_recipient: String,
    ) -> Self {
        Self { pool, wo_repo, user_repo, effects, default_recipient }
    }

    pub async fn list(&self, status: Option<&str>) -> Result<Vec<WorkOrder>, AppError> {
        let status = status.map(parse_status).transpose()?;
        self.wo_repo.list_all(status).await
    }

    pub async fn get(&self, wo_number: &str) -> Result<WorkOrder, AppError> {
        if !identifiers::is_wo_number(wo_number) {
            return Err(AppError::ResourceNotFound(format!("Work order {}", wo_number)));
        }
        self.wo_repo
            .find_by_number(wo_number)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Work order {}", wo_number)))
    }

    pub async fn update_details(
        &self,
        actor: &User,
        wo_number: &str,
        payload: UpdateWorkOrderPayload,
    ) -> Result<WorkOrder, AppError> {
        payload.validate()?;

        let current = self.get(wo_number).await?;
        let wo = self.wo_repo.update_details(current.id, &payload).await?;

        tracing::info!(wo_number = %wo.wo_number, user = %actor.username, "Work order details updated");
        Ok(wo)
    }

    pub async fn update_status(&self, actor: &User, wo_number: &str, raw_status: &str) -> Result<WorkOrder, AppError> {
        let target = parse_status(raw_status)?;
        self.transition(actor, wo_number, target, Utc::now()).await
    }

    async fn transition(
        &self,
        actor: &User,
        wo_number: &str,
        target: WorkOrderStatus,
        now: DateTime<Utc>,
    ) -> Result<WorkOrder, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .wo_repo
            .find_by_number_for_update(&mut *tx, wo_number)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Work order {}", wo_number)))?;

        let Some(stamp) = lifecycle::transition_work_order(&current, target, now)? else {
            tx.rollback().await?;
            return Ok(current);
        };

        let wo = self.wo_repo.apply_stamp(&mut *tx, current.id, &stamp).await?;
        tx.commit().await?;

        tracing::info!(
            wo_number = %wo.wo_number,
            from = current.status.as_str(),
            to = wo.status.as_str(),
            user = %actor.username,
            "Work order status changed"
        );

        let recipient = if wo.status == WorkOrderStatus::Completed {
            Some(self.requester_recipient(&wo).await)
        } else {
            None
        };

        let effects = lifecycle::work_order_status_effects(actor, current.status, &wo, recipient.as_deref());
        self.effects.run(effects).await;

        Ok(wo)
    }

    /// Releases every planned order scheduled for today. Safe to call repeatedly.
    pub async fn release_scheduled(&self) -> Result<ScheduledReleaseResult, AppError> {
        let mut tx = self.pool.begin().await?;
        let released = self.wo_repo.release_planned_for_day(&mut *tx, Utc::now()).await?;
        tx.commit().await?;

        tracing::info!(count = released.len(), "Scheduled work orders released");

        self.effects.run(lifecycle::scheduled_release_effects(&released)).await;

        Ok(ScheduledReleaseResult {
            released: released.into_iter().map(|wo| wo.wo_number).collect(),
        })
    }

    async fn requester_recipient(&self, wo: &WorkOrder) -> String {
        let email = match wo.requester_id {
            Some(id) => match self.user_repo.find_by_id(id).await {
                Ok(user) => user.map(|u| u.email),
                Err(e) => {
                    tracing::warn!(wo_number = %wo.wo_number, "Could not load requester: {}", e);
                    None
                }
            },
            None => None,
        };
        lifecycle::pick_recipient(email.as_deref(), &self.default_recipient)
    }
}

fn parse_status(raw: &str) -> Result<WorkOrderStatus, AppError> {
    WorkOrderStatus::parse(raw).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid status '{}'. Expected one of unreleased, planned, released, completed, cancelled.",
            raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!(parse_status("Released").unwrap(), WorkOrderStatus::Released);
        assert_eq!(parse_status(" completed ").unwrap(), WorkOrderStatus::Completed);
        assert!(matches!(parse_status("done"), Err(AppError::BadRequest(_))));
    }
}
