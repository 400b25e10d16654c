// src/models/work_order.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::work_request::{Urgency, WorkType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "wo_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkOrderStatus {
    Unreleased,
    Planned,
    Released,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkOrderStatus::Unreleased => "unreleased",
            WorkOrderStatus::Planned => "planned",
            WorkOrderStatus::Released => "released",
            WorkOrderStatus::Completed => "completed",
            WorkOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "unreleased" => Some(WorkOrderStatus::Unreleased),
            "planned" => Some(WorkOrderStatus::Planned),
            "released" => Some(WorkOrderStatus::Released),
            "completed" => Some(WorkOrderStatus::Completed),
            "cancelled" => Some(WorkOrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct WorkOrder {
    pub id: Uuid,
    pub work_request_id: Uuid,
    #[schema(example = "WO-7B21C0DE")]
    pub wo_number: String,
    #[schema(example = "WR-3F9A1C")]
    pub wr_number: String,
    pub title: String,
    pub description: String,
    pub asset_number: String,
    pub asset_department: String,
    pub asset_group: Option<String>,
    pub asset_area: Option<String>,
    pub parent_asset: Option<String>,
    pub resource: String,
    pub urgency: Urgency,
    pub wo_type: WorkType,
    pub failure_code: Option<String>,
    pub failure_cause: Option<String>,
    pub resolution: Option<String>,
    pub actual_failure_date: Option<NaiveDate>,
    pub completion_by_date: Option<NaiveDate>,
    #[schema(example = "1250000.00")]
    pub cost: Option<Decimal>,
    pub status: WorkOrderStatus,
    pub wo_created_at: DateTime<Utc>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub wo_start_date: Option<DateTime<Utc>>,
    pub wo_completion_date: Option<DateTime<Utc>>,
    /// Seconds between start and completion
    pub actual_duration: Option<i64>,
    pub requester_id: Option<Uuid>,
    pub engineer_id: Option<Uuid>,
}

impl WorkOrder {
    pub fn actual_duration_hours(&self) -> Option<f64> {
        self.actual_duration.map(|secs| secs as f64 / 3600.0)
    }
}

/// Fields copied from an approved work request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkOrder {
    pub work_request_id: Uuid,
    pub wo_number: String,
    pub wr_number: String,
    pub title: String,
    pub description: String,
    pub asset_number: String,
    pub asset_department: String,
    pub resource: String,
    pub urgency: Urgency,
    pub wo_type: WorkType,
    pub failure_code: Option<String>,
    pub failure_cause: Option<String>,
    pub resolution: Option<String>,
    pub actual_failure_date: Option<NaiveDate>,
    pub completion_by_date: Option<NaiveDate>,
    pub requester_id: Option<Uuid>,
}

/// Status plus the timestamp columns a status change may touch.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkOrderStamp {
    pub status: WorkOrderStatus,
    pub wo_start_date: Option<DateTime<Utc>>,
    pub wo_completion_date: Option<DateTime<Utc>>,
    pub actual_duration: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkOrderDetail {
    #[serde(flatten)]
    pub order: WorkOrder,
    pub actual_duration_hours: Option<f64>,
}

impl From<WorkOrder> for WorkOrderDetail {
    fn from(order: WorkOrder) -> Self {
        let actual_duration_hours = order.actual_duration_hours();
        Self { order, actual_duration_hours }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateWorkOrderStatusPayload {
    #[schema(example = "released")]
    pub status: String,
}

/// Editable details. Status is handled by the status endpoint only.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkOrderPayload {
    #[validate(length(max = 100))]
    pub asset_group: Option<String>,
    #[validate(length(max = 100))]
    pub asset_area: Option<String>,
    #[validate(length(max = 100))]
    pub parent_asset: Option<String>,
    #[validate(length(max = 100))]
    pub failure_code: Option<String>,
    pub failure_cause: Option<String>,
    pub resolution: Option<String>,
    pub cost: Option<Decimal>,
    pub actual_failure_date: Option<NaiveDate>,
    pub completion_by_date: Option<NaiveDate>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub engineer_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduledReleaseResult {
    pub released: Vec<String>,
}
