// src/handlers/work_requests.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, RequireRole},
    },
    models::work_request::{
        CreateWorkRequestPayload, UpdateWorkRequestStatusPayload, WorkRequest, WorkRequestDecision,
    },
};

// POST /api/work-request/create
#[utoipa::path(
    post,
    path = "/api/work-request/create",
    tag = "Work Requests",
    request_body = CreateWorkRequestPayload,
    responses(
        (status = 201, description = "Work request submitted as pending", body = WorkRequest),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Not authenticated")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_work_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateWorkRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let wr = app_state.work_request_service.create(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(wr)))
}

// GET /api/work-requests
#[utoipa::path(
    get,
    path = "/api/work-requests",
    tag = "Work Requests",
    responses((status = 200, description = "Newest first. Requesters only see their own.", body = Vec<WorkRequest>)),
    security(("api_jwt" = []))
)]
pub async fn list_work_requests(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.work_request_service.list(&user).await?;
    Ok(Json(rows))
}

// GET /api/work-requests/{id}
#[utoipa::path(
    get,
    path = "/api/work-requests/{id}",
    tag = "Work Requests",
    params(("id" = Uuid, Path, description = "Work request id")),
    responses(
        (status = 200, description = "One work request", body = WorkRequest),
        (status = 404, description = "Unknown or not visible to the caller")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_work_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let wr = app_state.work_request_service.get(&user, id).await?;
    Ok(Json(wr))
}

// PATCH /api/work-request/update-status/{id}
#[utoipa::path(
    patch,
    path = "/api/work-request/update-status/{id}",
    tag = "Work Requests",
    request_body = UpdateWorkRequestStatusPayload,
    params(("id" = Uuid, Path, description = "Work request id")),
    responses(
        (status = 200, description = "Decision recorded. Approval includes the new work order.", body = WorkRequestDecision),
        (status = 400, description = "Status is not approved or rejected"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Unknown work request"),
        (status = 409, description = "Request already decided or work order already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_work_request_status(
    State(app_state): State<AppState>,
    admin: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkRequestStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let decision = app_state
        .work_request_service
        .update_status(admin.user(), id, &payload.status)
        .await?;
    Ok(Json(decision))
}
