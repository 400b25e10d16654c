// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::auth::User;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    #[schema(example = "status_change")]
    pub action: String,
    #[schema(example = "WorkOrder")]
    pub model_name: String,
    pub object_id: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// What the lifecycle wants recorded. Written after commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub action: String,
    pub model_name: String,
    pub object_id: Option<String>,
    pub description: String,
}

impl NewAuditEntry {
    pub fn by(actor: &User, action: &str, model_name: &str, object_id: &str, description: String) -> Self {
        Self {
            user_id: Some(actor.id),
            username: Some(actor.username.clone()),
            action: action.to_string(),
            model_name: model_name.to_string(),
            object_id: Some(object_id.to_string()),
            description,
        }
    }

    /// Entries produced by scheduled jobs have no human actor.
    pub fn system(action: &str, model_name: &str, object_id: &str, description: String) -> Self {
        Self {
            user_id: None,
            username: Some("system".to_string()),
            action: action.to_string(),
            model_name: model_name.to_string(),
            object_id: Some(object_id.to_string()),
            description,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AuditQuery {
    /// Restrict to one model, e.g. `WorkRequest`
    pub model: Option<String>,
    /// Max rows (default 100, capped at 500)
    pub limit: Option<i64>,
}

impl AuditQuery {
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, 500)
    }
}
