// src/handlers/reports.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminOnly, RequireRole},
    models::analytics::DailyReport,
};

// POST /api/reports/daily
#[utoipa::path(
    post,
    path = "/api/reports/daily",
    tag = "Reports",
    responses(
        (status = 200, description = "Yesterday's counters; the mail is sent best-effort", body = DailyReport),
        (status = 403, description = "Admins only")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_daily_report(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.analytics_service.send_daily_report().await?;
    Ok(Json(report))
}
