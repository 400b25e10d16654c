// src/services/work_request_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, identifiers},
    db::{UserRepository, WorkOrderRepository, WorkRequestRepository},
    models::{
        auth::{Role, User},
        work_order::WorkOrderDetail,
        work_request::{CreateWorkRequestPayload, NewWorkRequest, WorkRequest, WorkRequestDecision},
    },
    services::{
        effects::EffectRunner,
        lifecycle::{self, WorkRequestDecisionKind},
    },
};

const NUMBER_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct WorkRequestService {
    pool: PgPool,
    wr_repo: WorkRequestRepository,
    wo_repo: WorkOrderRepository,
    user_repo: UserRepository,
    effects: EffectRunner,
    default_recipient: String,
}

impl WorkRequestService {
    pub fn new(
        pool: PgPool,
        wr_repo: WorkRequestRepository,
        wo_repo: WorkOrderRepository,
        user_repo: UserRepository,
        effects: EffectRunner,
        default_recipient: String,
    ) -> Self {
        Self { pool, wr_repo, wo_repo, user_repo, effects, default_recipient }
    }

    pub async fn create(&self, actor: &User, payload: CreateWorkRequestPayload) -> Result<WorkRequest, AppError> {
        let mut new = NewWorkRequest::from_payload(payload, identifiers::new_wr_number(), actor.id);

        // A 6-hex number space can collide; draw again a couple of times
        let mut attempt = 1;
        let wr = loop {
            match self.wr_repo.insert(&self.pool, &new).await {
                Ok(wr) => break wr,
                Err(AppError::Conflict(_)) if attempt < NUMBER_ATTEMPTS => {
                    tracing::warn!(wr_number = %new.wr_number, "wr_number collision, retrying");
                    new.wr_number = identifiers::new_wr_number();
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        tracing::info!(wr_number = %wr.wr_number, user = %actor.username, "Work request created");

        let effects = lifecycle::work_request_created_effects(actor, &wr, &self.default_recipient);
        self.effects.run(effects).await;

        Ok(wr)
    }

    /// Requesters only see what they submitted.
    pub async fn list(&self, actor: &User) -> Result<Vec<WorkRequest>, AppError> {
        if actor.role == Role::Requester {
            self.wr_repo.list_by_requester(actor.id).await
        } else {
            self.wr_repo.list_all().await
        }
    }

    pub async fn get(&self, actor: &User, id: Uuid) -> Result<WorkRequest, AppError> {
        let wr = self
            .wr_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Work request".to_string()))?;

        if actor.role == Role::Requester && wr.requested_by != actor.id {
            return Err(AppError::ResourceNotFound("Work request".to_string()));
        }
        Ok(wr)
    }

    /// Approve or reject a pending request. Approval creates the work order in
    /// the same transaction; notifications and audit run after commit.
    pub async fn update_status(&self, actor: &User, id: Uuid, raw_status: &str) -> Result<WorkRequestDecision, AppError> {
        let decision = WorkRequestDecisionKind::parse(raw_status)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let current = self
            .wr_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Work request".to_string()))?;

        let outcome = lifecycle::decide_work_request(&current, decision, now)?;

        let wr = self
            .wr_repo
            .decide(&mut *tx, id, outcome.status, outcome.approved_at)
            .await?
            .ok_or_else(|| AppError::Conflict(format!("Work request {} was already decided.", current.wr_number)))?;

        let work_order = match decision {
            WorkRequestDecisionKind::Approve => {
                let new_wo = lifecycle::work_order_from_request(&wr, identifiers::new_wo_number());
                Some(self.wo_repo.insert(&mut *tx, &new_wo).await?)
            }
            WorkRequestDecisionKind::Reject => None,
        };

        tx.commit().await?;

        tracing::info!(
            wr_number = %wr.wr_number,
            status = wr.status.as_str(),
            wo_number = work_order.as_ref().map(|wo| wo.wo_number.as_str()).unwrap_or("-"),
            admin = %actor.username,
            "Work request decided"
        );

        let requester_email = match self.user_repo.find_by_id(wr.requested_by).await {
            Ok(user) => user.map(|u| u.email),
            Err(e) => {
                tracing::warn!(wr_number = %wr.wr_number, "Could not load requester: {}", e);
                None
            }
        };
        let recipient = lifecycle::pick_recipient(requester_email.as_deref(), &self.default_recipient);

        let effects = lifecycle::work_request_decided_effects(actor, &wr, work_order.as_ref(), &recipient);
        self.effects.run(effects).await;

        Ok(WorkRequestDecision {
            work_request: wr,
            work_order: work_order.map(WorkOrderDetail::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        common::error::AppError,
        models::work_request::{Urgency, WorkRequestStatus, WorkType},
        services::effects::testing::{MemoryAudit, RecordingMailer},
    };

    struct Harness {
        pool: PgPool,
        service: WorkRequestService,
        mailer: Arc<RecordingMailer>,
        requester: User,
        admin: User,
    }

    async fn account(pool: &PgPool, username: &str, role: Role) -> User {
        let repo = UserRepository::new(pool.clone());
        let id = repo
            .create_user(pool, username, &format!("{username}@plant.local"), "x", username, role, "")
            .await
            .unwrap();
        repo.find_by_id(id).await.unwrap().unwrap()
    }

    async fn harness(pool: PgPool) -> Harness {
        let mailer = Arc::new(RecordingMailer::default());
        let effects = EffectRunner::new(mailer.clone(), Arc::new(MemoryAudit::default()));
        let service = WorkRequestService::new(
            pool.clone(),
            WorkRequestRepository::new(pool.clone()),
            WorkOrderRepository::new(pool.clone()),
            UserRepository::new(pool.clone()),
            effects,
            "ops@plant.local".to_string(),
        );
        let requester = account(&pool, "line.operator", Role::Requester).await;
        let admin = account(&pool, "plant.admin", Role::Admin).await;
        Harness { pool, service, mailer, requester, admin }
    }

    fn payload() -> CreateWorkRequestPayload {
        CreateWorkRequestPayload {
            title: "Conveyor 3 belt slipping".to_string(),
            description: "Belt slips under full load".to_string(),
            urgency: Urgency::High,
            wr_type: WorkType::Repair,
            asset_number: Some("CNV-0003".to_string()),
            asset_department: None,
            resource: None,
            failure_code: None,
            failure_cause: None,
            resolution: None,
            actual_failure_date: None,
            completion_by_date: None,
        }
    }

    async fn work_order_count(pool: &PgPool, work_request_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM work_orders WHERE work_request_id = $1")
            .bind(work_request_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn approving_twice_leaves_one_work_order(pool: PgPool) {
        let h = harness(pool).await;
        let wr = h.service.create(&h.requester, payload()).await.unwrap();
        assert_eq!(wr.status, WorkRequestStatus::Pending);
        assert_eq!(work_order_count(&h.pool, wr.id).await, 0);

        let decision = h.service.update_status(&h.admin, wr.id, "approved").await.unwrap();
        let approved_at = decision.work_request.approved_at.expect("approved_at stamped");
        let wo = decision.work_order.expect("work order created");
        assert_eq!(wo.order.wr_number, wr.wr_number);
        assert_eq!(wo.order.asset_number, "CNV-0003");
        assert_eq!(wo.order.status, crate::models::work_order::WorkOrderStatus::Unreleased);

        let again = h.service.update_status(&h.admin, wr.id, "approved").await.unwrap_err();
        assert!(matches!(again, AppError::InvalidTransition { .. }));
        assert_eq!(again.status_code(), axum::http::StatusCode::CONFLICT);

        assert_eq!(work_order_count(&h.pool, wr.id).await, 1);
        let stored = h.service.get(&h.admin, wr.id).await.unwrap();
        assert_eq!(stored.approved_at, Some(approved_at));

        let sent = h.mailer.sent.lock().unwrap();
        assert!(sent.iter().any(|m| m.to == "line.operator@plant.local" && m.subject.contains("Approved")));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn concurrent_approvals_create_one_work_order(pool: PgPool) {
        let h = harness(pool).await;
        let wr = h.service.create(&h.requester, payload()).await.unwrap();

        let (a, b) = tokio::join!(
            h.service.update_status(&h.admin, wr.id, "approved"),
            h.service.update_status(&h.admin, wr.id, "approved"),
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(work_order_count(&h.pool, wr.id).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn rejected_request_cannot_be_approved(pool: PgPool) {
        let h = harness(pool).await;
        let wr = h.service.create(&h.requester, payload()).await.unwrap();

        let decision = h.service.update_status(&h.admin, wr.id, "rejected").await.unwrap();
        assert_eq!(decision.work_request.status, WorkRequestStatus::Rejected);
        assert!(decision.work_order.is_none());

        let err = h.service.update_status(&h.admin, wr.id, "approved").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        let stored = h.service.get(&h.admin, wr.id).await.unwrap();
        assert_eq!(stored.status, WorkRequestStatus::Rejected);
        assert_eq!(stored.approved_at, None);
        assert_eq!(work_order_count(&h.pool, wr.id).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn requesters_only_see_their_own_requests(pool: PgPool) {
        let h = harness(pool).await;
        let other = account(&h.pool, "second.operator", Role::Requester).await;
        let wr = h.service.create(&h.requester, payload()).await.unwrap();

        assert!(matches!(
            h.service.get(&other, wr.id).await,
            Err(AppError::ResourceNotFound(_))
        ));
        assert!(h.service.list(&other).await.unwrap().is_empty());
        assert_eq!(h.service.list(&h.admin).await.unwrap().len(), 1);
    }
}
