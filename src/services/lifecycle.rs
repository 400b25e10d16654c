// src/services/lifecycle.rs
//
// State transitions for work requests and work orders. Nothing here touches
// the database or the mailer: each function returns the new state and the
// effects the caller runs once the transaction has committed.

use chrono::{DateTime, Utc};

use crate::{
    common::error::AppError,
    models::{
        audit::NewAuditEntry,
        auth::User,
        work_order::{NewWorkOrder, WorkOrder, WorkOrderStamp, WorkOrderStatus},
        work_request::{WorkRequest, WorkRequestStatus},
    },
    services::{effects::Effect, mailer::EmailMessage},
};

const WORK_REQUEST: &str = "WorkRequest";
const WORK_ORDER: &str = "WorkOrder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkRequestDecisionKind {
    Approve,
    Reject,
}

impl WorkRequestDecisionKind {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "approved" => Ok(Self::Approve),
            "rejected" => Ok(Self::Reject),
            other => Err(AppError::BadRequest(format!(
                "Invalid status '{}'. Expected 'approved' or 'rejected'.",
                other
            ))),
        }
    }

    pub fn target(self) -> WorkRequestStatus {
        match self {
            Self::Approve => WorkRequestStatus::Approved,
            Self::Reject => WorkRequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkRequestOutcome {
    pub status: WorkRequestStatus,
    pub approved_at: Option<DateTime<Utc>>,
}

/// Only a pending request can be decided. Approved and rejected are terminal.
pub fn decide_work_request(
    wr: &WorkRequest,
    decision: WorkRequestDecisionKind,
    now: DateTime<Utc>,
) -> Result<WorkRequestOutcome, AppError> {
    let target = decision.target();

    if wr.status != WorkRequestStatus::Pending {
        return Err(AppError::InvalidTransition {
            entity: "work request",
            from: wr.status.as_str().to_string(),
            to: target.as_str().to_string(),
        });
    }

    let approved_at = match decision {
        WorkRequestDecisionKind::Approve => Some(wr.approved_at.unwrap_or(now)),
        WorkRequestDecisionKind::Reject => None,
    };

    Ok(WorkRequestOutcome { status: target, approved_at })
}

pub fn work_order_from_request(wr: &WorkRequest, wo_number: String) -> NewWorkOrder {
    NewWorkOrder {
        work_request_id: wr.id,
        wo_number,
        wr_number: wr.wr_number.clone(),
        title: wr.title.clone(),
        description: wr.description.clone(),
        asset_number: wr.asset_number.clone(),
        asset_department: wr.asset_department.clone(),
        resource: wr.resource.clone(),
        urgency: wr.urgency,
        wo_type: wr.wr_type,
        failure_code: wr.failure_code.clone(),
        failure_cause: wr.failure_cause.clone(),
        resolution: wr.resolution.clone(),
        actual_failure_date: wr.actual_failure_date,
        completion_by_date: wr.completion_by_date,
        requester_id: Some(wr.requested_by),
    }
}

pub fn can_transition(from: WorkOrderStatus, to: WorkOrderStatus) -> bool {
    use WorkOrderStatus::*;

    matches!(
        (from, to),
        (Unreleased, Planned | Released | Cancelled)
            | (Planned, Unreleased | Released | Cancelled)
            | (Released, Completed | Cancelled)
    )
}

/// `Ok(None)` when the order already has the requested status.
///
/// Released stamps the start once. Completed stamps the completion once and
/// derives the duration only when a start exists.
pub fn transition_work_order(
    wo: &WorkOrder,
    target: WorkOrderStatus,
    now: DateTime<Utc>,
) -> Result<Option<WorkOrderStamp>, AppError> {
    if wo.status == target {
        return Ok(None);
    }

    if !can_transition(wo.status, target) {
        return Err(AppError::InvalidTransition {
            entity: "work order",
            from: wo.status.as_str().to_string(),
            to: target.as_str().to_string(),
        });
    }

    let mut stamp = WorkOrderStamp {
        status: target,
        wo_start_date: wo.wo_start_date,
        wo_completion_date: wo.wo_completion_date,
        actual_duration: wo.actual_duration,
    };

    match target {
        WorkOrderStatus::Planned if wo.scheduled_start.is_none() => {
            return Err(AppError::BadRequest(
                "A planned work order needs a scheduled_start.".to_string(),
            ));
        }
        WorkOrderStatus::Released => {
            stamp.wo_start_date.get_or_insert(now);
        }
        WorkOrderStatus::Completed => {
            let completed_at = match (stamp.wo_completion_date, stamp.wo_start_date) {
                (Some(done), _) => done,
                (None, Some(start)) => now.max(start),
                (None, None) => now,
            };
            stamp.wo_completion_date = Some(completed_at);
            stamp.actual_duration = stamp
                .wo_start_date
                .map(|start| (completed_at - start).num_seconds());
        }
        _ => {}
    }

    Ok(Some(stamp))
}

/// Requester address when they have one, otherwise the configured fallback.
pub fn pick_recipient(requester_email: Option<&str>, default_recipient: &str) -> String {
    requester_email
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .unwrap_or(default_recipient)
        .to_string()
}

pub fn work_request_created_effects(actor: &User, wr: &WorkRequest, recipient: &str) -> Vec<Effect> {
    let body = format!(
        "A new work request was submitted by {}.\n\n\
         Number: {}\nTitle: {}\nUrgency: {:?}\nType: {:?}\nAsset: {} ({})\n\n{}",
        actor.full_name,
        wr.wr_number,
        wr.title,
        wr.urgency,
        wr.wr_type,
        wr.asset_number,
        wr.asset_department,
        wr.description,
    );

    vec![
        Effect::Audit(NewAuditEntry::by(
            actor,
            "create",
            WORK_REQUEST,
            &wr.wr_number,
            format!("Created work request {} '{}'", wr.wr_number, wr.title),
        )),
        Effect::Email {
            message: EmailMessage {
                to: recipient.to_string(),
                subject: format!("New Work Request {}", wr.wr_number),
                body,
            },
            delivery_audit: None,
        },
    ]
}

pub fn work_request_decided_effects(
    actor: &User,
    wr: &WorkRequest,
    work_order: Option<&WorkOrder>,
    recipient: &str,
) -> Vec<Effect> {
    let verdict = wr.status.as_str();
    let mut effects = vec![Effect::Audit(NewAuditEntry::by(
        actor,
        "status_change",
        WORK_REQUEST,
        &wr.wr_number,
        format!("Work request {} {}", wr.wr_number, verdict),
    ))];

    let mut body = format!(
        "Your work request {} '{}' was {} by {}.",
        wr.wr_number, wr.title, verdict, actor.full_name
    );

    if let Some(wo) = work_order {
        effects.push(Effect::Audit(NewAuditEntry::by(
            actor,
            "create",
            WORK_ORDER,
            &wo.wo_number,
            format!("Created work order {} from {}", wo.wo_number, wr.wr_number),
        )));
        body.push_str(&format!("\n\nWork order {} has been opened for it.", wo.wo_number));
    }

    let subject = match wr.status {
        WorkRequestStatus::Approved => format!("Work Request {} Approved", wr.wr_number),
        _ => format!("Work Request {} Rejected", wr.wr_number),
    };

    effects.push(Effect::Email {
        message: EmailMessage {
            to: recipient.to_string(),
            subject,
            body,
        },
        delivery_audit: Some(NewAuditEntry::by(
            actor,
            "email",
            WORK_REQUEST,
            &wr.wr_number,
            format!("{} notice sent to {}", verdict, recipient),
        )),
    });

    effects
}

/// Always audits the change; completion also notifies the requester.
pub fn work_order_status_effects(
    actor: &User,
    previous: WorkOrderStatus,
    wo: &WorkOrder,
    recipient: Option<&str>,
) -> Vec<Effect> {
    let mut effects = vec![Effect::Audit(NewAuditEntry::by(
        actor,
        "status_change",
        WORK_ORDER,
        &wo.wo_number,
        format!(
            "Work order {} moved from {} to {}",
            wo.wo_number,
            previous.as_str(),
            wo.status.as_str()
        ),
    ))];

    if wo.status != WorkOrderStatus::Completed {
        return effects;
    }

    let Some(to) = recipient else {
        tracing::warn!(wo_number = %wo.wo_number, "Completed work order has no requester to notify");
        return effects;
    };

    let duration = wo
        .actual_duration_hours()
        .map(|h| format!("{:.2} hours", h))
        .unwrap_or_else(|| "not recorded".to_string());

    effects.push(Effect::Email {
        message: EmailMessage {
            to: to.to_string(),
            subject: format!("Work Order {} Completed", wo.wo_number),
            body: format!(
                "Work order {} for request {} has been completed.\n\n\
                 Title: {}\nDescription: {}\nResource: {}\nDuration: {}",
                wo.wo_number, wo.wr_number, wo.title, wo.description, wo.resource, duration,
            ),
        },
        delivery_audit: Some(NewAuditEntry::by(
            actor,
            "email",
            WORK_ORDER,
            &wo.wo_number,
            format!("Completion notice sent to {}", to),
        )),
    });

    effects
}

pub fn scheduled_release_effects(released: &[WorkOrder]) -> Vec<Effect> {
    released
        .iter()
        .map(|wo| {
            Effect::Audit(NewAuditEntry::system(
                "status_change",
                WORK_ORDER,
                &wo.wo_number,
                format!("Work order {} released on its scheduled day", wo.wo_number),
            ))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    use super::*;
    use crate::models::{
        auth::{Role, UserStatus},
        work_request::{Urgency, WorkType},
    };

    pub fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap()
    }

    pub fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: format!("{}.user", role.as_str()),
            email: format!("{}@plant.local", role.as_str()),
            password_hash: String::new(),
            date_joined: at(0) - Duration::days(30),
            full_name: format!("{} User", role.as_str()),
            role,
            division: String::new(),
            status: UserStatus::Active,
            avatar: None,
        }
    }

    pub fn work_request(status: WorkRequestStatus) -> WorkRequest {
        WorkRequest {
            id: Uuid::new_v4(),
            wr_number: "WR-3F9A1C".to_string(),
            title: "Compressor 2 leaking oil".to_string(),
            description: "Oil under the unit since night shift".to_string(),
            asset_number: "CMP-0002".to_string(),
            asset_department: "EN".to_string(),
            resource: "MTC".to_string(),
            urgency: Urgency::High,
            wr_type: WorkType::Repair,
            failure_code: Some("LEAK".to_string()),
            failure_cause: None,
            resolution: None,
            actual_failure_date: at(0).date_naive().pred_opt(),
            completion_by_date: at(0).date_naive().succ_opt(),
            status,
            requested_by: Uuid::new_v4(),
            created_at: at(1),
            approved_at: (status == WorkRequestStatus::Approved).then(|| at(2)),
        }
    }

    pub fn work_order(status: WorkOrderStatus) -> WorkOrder {
        let wr = work_request(WorkRequestStatus::Approved);
        let new = work_order_from_request(&wr, "WO-7B21C0DE".to_string());
        WorkOrder {
            id: Uuid::new_v4(),
            work_request_id: new.work_request_id,
            wo_number: new.wo_number,
            wr_number: new.wr_number,
            title: new.title,
            description: new.description,
            asset_number: new.asset_number,
            asset_department: new.asset_department,
            asset_group: None,
            asset_area: None,
            parent_asset: None,
            resource: new.resource,
            urgency: new.urgency,
            wo_type: new.wo_type,
            failure_code: new.failure_code,
            failure_cause: new.failure_cause,
            resolution: new.resolution,
            actual_failure_date: new.actual_failure_date,
            completion_by_date: new.completion_by_date,
            cost: None,
            status,
            wo_created_at: at(2),
            scheduled_start: None,
            wo_start_date: None,
            wo_completion_date: None,
            actual_duration: None,
            requester_id: new.requester_id,
            engineer_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::auth::Role;

    #[test]
    fn decision_parsing_accepts_only_approved_and_rejected() {
        assert_eq!(WorkRequestDecisionKind::parse("approved").unwrap(), WorkRequestDecisionKind::Approve);
        assert_eq!(WorkRequestDecisionKind::parse(" Rejected ").unwrap(), WorkRequestDecisionKind::Reject);
        assert!(matches!(WorkRequestDecisionKind::parse("in_review"), Err(AppError::BadRequest(_))));
        assert!(matches!(WorkRequestDecisionKind::parse("pending"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn approving_pending_request_stamps_approved_at() {
        let wr = work_request(WorkRequestStatus::Pending);
        assert!(wr.approved_at.is_none());

        let outcome = decide_work_request(&wr, WorkRequestDecisionKind::Approve, at(9)).unwrap();
        assert_eq!(outcome.status, WorkRequestStatus::Approved);
        assert_eq!(outcome.approved_at, Some(at(9)));
    }

    #[test]
    fn rejecting_leaves_approved_at_empty() {
        let wr = work_request(WorkRequestStatus::Pending);
        let outcome = decide_work_request(&wr, WorkRequestDecisionKind::Reject, at(9)).unwrap();
        assert_eq!(outcome.status, WorkRequestStatus::Rejected);
        assert_eq!(outcome.approved_at, None);
    }

    #[test]
    fn decided_requests_are_terminal() {
        for status in [WorkRequestStatus::Approved, WorkRequestStatus::Rejected] {
            let wr = work_request(status);
            for decision in [WorkRequestDecisionKind::Approve, WorkRequestDecisionKind::Reject] {
                let err = decide_work_request(&wr, decision, at(9)).unwrap_err();
                assert!(matches!(err, AppError::InvalidTransition { .. }));
            }
        }
    }

    #[test]
    fn work_order_copies_request_fields() {
        let wr = work_request(WorkRequestStatus::Approved);
        let wo = work_order_from_request(&wr, "WO-00AA11BB".to_string());

        assert_eq!(wo.work_request_id, wr.id);
        assert_eq!(wo.wr_number, wr.wr_number);
        assert_eq!(wo.asset_number, wr.asset_number);
        assert_eq!(wo.asset_department, wr.asset_department);
        assert_eq!(wo.urgency, wr.urgency);
        assert_eq!(wo.wo_type, wr.wr_type);
        assert_eq!(wo.actual_failure_date, wr.actual_failure_date);
        assert_eq!(wo.completion_by_date, wr.completion_by_date);
        assert_eq!(wo.requester_id, Some(wr.requested_by));
    }

    #[test]
    fn release_then_complete_computes_duration() {
        let mut wo = work_order(WorkOrderStatus::Unreleased);

        let released = transition_work_order(&wo, WorkOrderStatus::Released, at(8)).unwrap().unwrap();
        assert_eq!(released.wo_start_date, Some(at(8)));
        assert_eq!(released.actual_duration, None);

        wo.status = released.status;
        wo.wo_start_date = released.wo_start_date;

        let done = transition_work_order(&wo, WorkOrderStatus::Completed, at(11)).unwrap().unwrap();
        assert_eq!(done.status, WorkOrderStatus::Completed);
        assert_eq!(done.wo_completion_date, Some(at(11)));
        assert_eq!(done.actual_duration, Some(3 * 3600));
    }

    #[test]
    fn repeated_status_is_a_no_op() {
        let mut wo = work_order(WorkOrderStatus::Released);
        wo.wo_start_date = Some(at(8));
        assert_eq!(transition_work_order(&wo, WorkOrderStatus::Released, at(10)).unwrap(), None);
    }

    #[test]
    fn release_keeps_an_existing_start_date() {
        let mut wo = work_order(WorkOrderStatus::Planned);
        wo.scheduled_start = Some(at(6));
        wo.wo_start_date = Some(at(7));

        let stamp = transition_work_order(&wo, WorkOrderStatus::Released, at(10)).unwrap().unwrap();
        assert_eq!(stamp.wo_start_date, Some(at(7)));
    }

    #[test]
    fn completion_without_start_has_no_duration() {
        let wo = work_order(WorkOrderStatus::Released);
        let stamp = transition_work_order(&wo, WorkOrderStatus::Completed, at(10)).unwrap().unwrap();
        assert_eq!(stamp.wo_completion_date, Some(at(10)));
        assert_eq!(stamp.actual_duration, None);
    }

    #[test]
    fn completion_never_precedes_start() {
        let mut wo = work_order(WorkOrderStatus::Released);
        wo.wo_start_date = Some(at(12));

        let stamp = transition_work_order(&wo, WorkOrderStatus::Completed, at(10)).unwrap().unwrap();
        assert_eq!(stamp.wo_completion_date, Some(at(12)));
        assert_eq!(stamp.actual_duration, Some(0));
    }

    #[test]
    fn transition_table() {
        use WorkOrderStatus::*;

        assert!(can_transition(Unreleased, Released));
        assert!(can_transition(Unreleased, Planned));
        assert!(can_transition(Planned, Unreleased));
        assert!(can_transition(Released, Completed));
        assert!(can_transition(Released, Cancelled));

        assert!(!can_transition(Unreleased, Completed));
        assert!(!can_transition(Completed, Released));
        assert!(!can_transition(Cancelled, Unreleased));
        assert!(!can_transition(Released, Planned));
    }

    #[test]
    fn skipping_release_is_rejected() {
        let wo = work_order(WorkOrderStatus::Unreleased);
        let err = transition_work_order(&wo, WorkOrderStatus::Completed, at(10)).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[test]
    fn planning_needs_a_scheduled_start() {
        let mut wo = work_order(WorkOrderStatus::Unreleased);
        assert!(matches!(
            transition_work_order(&wo, WorkOrderStatus::Planned, at(10)),
            Err(AppError::BadRequest(_))
        ));

        wo.scheduled_start = Some(at(14));
        let stamp = transition_work_order(&wo, WorkOrderStatus::Planned, at(10)).unwrap().unwrap();
        assert_eq!(stamp.status, WorkOrderStatus::Planned);
        assert_eq!(stamp.wo_start_date, None);
    }

    #[test]
    fn recipient_falls_back_to_default() {
        assert_eq!(pick_recipient(Some("req@plant.local"), "ops@plant.local"), "req@plant.local");
        assert_eq!(pick_recipient(Some("  "), "ops@plant.local"), "ops@plant.local");
        assert_eq!(pick_recipient(None, "ops@plant.local"), "ops@plant.local");
    }

    #[test]
    fn creation_audits_and_notifies() {
        let actor = user(Role::Requester);
        let wr = work_request(WorkRequestStatus::Pending);
        let effects = work_request_created_effects(&actor, &wr, "ops@plant.local");

        assert!(matches!(&effects[0], Effect::Audit(e) if e.action == "create" && e.model_name == "WorkRequest"));
        assert!(matches!(&effects[1], Effect::Email { message, .. } if message.to == "ops@plant.local"));
    }

    #[test]
    fn approval_effects_include_work_order_audit_and_email() {
        let admin = user(Role::Admin);
        let wr = work_request(WorkRequestStatus::Approved);
        let wo = work_order(WorkOrderStatus::Unreleased);

        let effects = work_request_decided_effects(&admin, &wr, Some(&wo), "req@plant.local");
        assert_eq!(effects.len(), 3);
        assert!(matches!(&effects[1], Effect::Audit(e) if e.model_name == "WorkOrder"));
        match &effects[2] {
            Effect::Email { message, delivery_audit } => {
                assert!(message.subject.contains("Approved"));
                assert!(message.body.contains(&wo.wo_number));
                assert!(delivery_audit.is_some());
            }
            other => panic!("expected email, got {:?}", other),
        }
    }

    #[test]
    fn rejection_sends_rejection_email_only() {
        let admin = user(Role::Admin);
        let wr = work_request(WorkRequestStatus::Rejected);

        let effects = work_request_decided_effects(&admin, &wr, None, "req@plant.local");
        assert_eq!(effects.len(), 2);
        assert!(matches!(&effects[1], Effect::Email { message, .. } if message.subject.contains("Rejected")));
    }

    #[test]
    fn completion_email_summarises_the_order() {
        let engineer = user(Role::Engineer);
        let mut wo = work_order(WorkOrderStatus::Completed);
        wo.actual_duration = Some(5400);

        let effects = work_order_status_effects(&engineer, WorkOrderStatus::Released, &wo, Some("req@plant.local"));
        assert_eq!(effects.len(), 2);
        match &effects[1] {
            Effect::Email { message, delivery_audit } => {
                assert!(message.body.contains(&wo.title));
                assert!(message.body.contains(&wo.resource));
                assert!(message.body.contains("1.50 hours"));
                assert_eq!(delivery_audit.as_ref().map(|a| a.action.as_str()), Some("email"));
            }
            other => panic!("expected email, got {:?}", other),
        }
    }

    #[test]
    fn other_work_order_changes_only_audit() {
        let engineer = user(Role::Engineer);
        let wo = work_order(WorkOrderStatus::Released);
        let effects = work_order_status_effects(&engineer, WorkOrderStatus::Unreleased, &wo, Some("req@plant.local"));
        assert_eq!(effects.len(), 1);
    }
}
