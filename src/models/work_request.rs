// src/models/work_request.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::work_order::WorkOrderDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "wr_urgency", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "wr_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkType {
    Repair,
    Inspection,
    Corrective,
    Modification,
    Routine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "wr_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkRequestStatus {
    Pending,
    Approved,
    Rejected,
    InReview,
}

impl WorkRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkRequestStatus::Pending => "pending",
            WorkRequestStatus::Approved => "approved",
            WorkRequestStatus::Rejected => "rejected",
            WorkRequestStatus::InReview => "in_review",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct WorkRequest {
    pub id: Uuid,
    #[schema(example = "WR-3F9A1C")]
    pub wr_number: String,
    pub title: String,
    pub description: String,
    #[schema(example = "PMP-0042")]
    pub asset_number: String,
    pub asset_department: String,
    pub resource: String,
    pub urgency: Urgency,
    pub wr_type: WorkType,
    pub failure_code: Option<String>,
    pub failure_cause: Option<String>,
    pub resolution: Option<String>,
    pub actual_failure_date: Option<NaiveDate>,
    pub completion_by_date: Option<NaiveDate>,
    pub status: WorkRequestStatus,
    pub requested_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWorkRequestPayload {
    #[validate(
        length(max = 255, message = "Title is too long."),
        custom(function = "validate_not_blank", message = "Title is required.")
    )]
    #[schema(example = "Compressor 2 leaking oil")]
    pub title: String,

    #[validate(custom(function = "validate_not_blank", message = "Description is required."))]
    pub description: String,

    pub urgency: Urgency,
    pub wr_type: WorkType,

    #[validate(length(min = 1, max = 100))]
    pub asset_number: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub asset_department: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub resource: Option<String>,

    #[validate(length(max = 100))]
    pub failure_code: Option<String>,
    pub failure_cause: Option<String>,
    pub resolution: Option<String>,
    pub actual_failure_date: Option<NaiveDate>,
    pub completion_by_date: Option<NaiveDate>,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Fields persisted on creation, after defaults are applied.
#[derive(Debug, Clone)]
pub struct NewWorkRequest {
    pub wr_number: String,
    pub title: String,
    pub description: String,
    pub asset_number: String,
    pub asset_department: String,
    pub resource: String,
    pub urgency: Urgency,
    pub wr_type: WorkType,
    pub failure_code: Option<String>,
    pub failure_cause: Option<String>,
    pub resolution: Option<String>,
    pub actual_failure_date: Option<NaiveDate>,
    pub completion_by_date: Option<NaiveDate>,
    pub requested_by: Uuid,
}

impl NewWorkRequest {
    pub fn from_payload(payload: CreateWorkRequestPayload, wr_number: String, requested_by: Uuid) -> Self {
        Self {
            wr_number,
            title: payload.title.trim().to_string(),
            description: payload.description.trim().to_string(),
            asset_number: payload.asset_number.unwrap_or_else(|| "UNKNOWN".to_string()),
            asset_department: payload.asset_department.unwrap_or_else(|| "EN".to_string()),
            resource: payload.resource.unwrap_or_else(|| "MTC".to_string()),
            urgency: payload.urgency,
            wr_type: payload.wr_type,
            failure_code: payload.failure_code,
            failure_cause: payload.failure_cause,
            resolution: payload.resolution,
            actual_failure_date: payload.actual_failure_date,
            completion_by_date: payload.completion_by_date,
            requested_by,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateWorkRequestStatusPayload {
    /// `approved` or `rejected`
    #[schema(example = "approved")]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkRequestDecision {
    pub work_request: WorkRequest,
    /// Present when the request was approved
    pub work_order: Option<WorkOrderDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::work_order::WorkOrderStatus;
    use crate::services::lifecycle::fixtures;

    fn payload(title: &str, description: &str) -> CreateWorkRequestPayload {
        serde_json::from_value(serde_json::json!({
            "title": title,
            "description": description,
            "urgency": "high",
            "wr_type": "repair",
        }))
        .unwrap()
    }

    #[test]
    fn blank_title_and_description_are_rejected() {
        let errors = payload("   ", "  \n ").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("description"));
        assert_eq!(
            fields["title"][0].message.as_deref(),
            Some("Title is required.")
        );
    }

    #[test]
    fn accepted_payload_is_trimmed_and_defaulted() {
        let p = payload("  Pump 4 noisy ", " Bearing whine ");
        assert!(p.validate().is_ok());

        let new = NewWorkRequest::from_payload(p, "WR-00AA11".to_string(), Uuid::new_v4());
        assert_eq!(new.title, "Pump 4 noisy");
        assert_eq!(new.description, "Bearing whine");
        assert_eq!(new.asset_number, "UNKNOWN");
        assert_eq!(new.asset_department, "EN");
        assert_eq!(new.resource, "MTC");
    }

    #[test]
    fn decision_carries_work_order_duration_hours() {
        let mut wo = fixtures::work_order(WorkOrderStatus::Completed);
        wo.actual_duration = Some(7200);

        let decision = WorkRequestDecision {
            work_request: fixtures::work_request(WorkRequestStatus::Approved),
            work_order: Some(wo.into()),
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["work_order"]["actual_duration_hours"], 2.0);
        assert_eq!(json["work_order"]["wo_number"], "WO-7B21C0DE");
    }
}
