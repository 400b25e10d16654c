// src/handlers/audit.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AuditReaders, RequireRole},
    models::audit::{AuditEntry, AuditQuery},
};

// GET /api/audit-trail
#[utoipa::path(
    get,
    path = "/api/audit-trail",
    tag = "Audit",
    params(AuditQuery),
    responses(
        (status = 200, description = "Newest first", body = Vec<AuditEntry>),
        (status = 403, description = "Admins and QAC only")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_audit_trail(
    State(app_state): State<AppState>,
    _reader: RequireRole<AuditReaders>,
    Query(query): Query<AuditQuery>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state
        .audit_repo
        .list(query.model.as_deref(), query.effective_limit())
        .await?;
    Ok(Json(entries))
}
