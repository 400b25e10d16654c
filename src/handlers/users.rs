// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, RequireRole},
    },
    models::auth::{RegisterUserPayload, UpdateUserStatusPayload, User, UserStats},
    services::user_service::DIVISIONS,
};

// POST /api/regist
#[utoipa::path(
    post,
    path = "/api/regist",
    tag = "Users",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Admins only"),
        (status = 409, description = "Username already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn register(
    State(app_state): State<AppState>,
    admin: RequireRole<AdminOnly>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.register(admin.user(), payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "All accounts with their profiles", body = Vec<User>),
        (status = 403, description = "Admins only")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.user_service.list().await?;
    Ok(Json(users))
}

// GET /api/users/stats
#[utoipa::path(
    get,
    path = "/api/users/stats",
    tag = "Users",
    responses((status = 200, description = "Account counters", body = UserStats)),
    security(("api_jwt" = []))
)]
pub async fn user_stats(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.user_service.stats().await?;
    Ok(Json(stats))
}

// PATCH /api/users/{id}/status
#[utoipa::path(
    patch,
    path = "/api/users/{id}/status",
    tag = "Users",
    request_body = UpdateUserStatusPayload,
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Status changed", body = User),
        (status = 400, description = "Status must be Active or Inactive"),
        (status = 404, description = "Unknown user")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user_status(
    State(app_state): State<AppState>,
    admin: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state
        .user_service
        .update_status(admin.user(), id, &payload.status)
        .await?;
    Ok(Json(user))
}

// GET /api/divisions
#[utoipa::path(
    get,
    path = "/api/divisions",
    tag = "Users",
    responses((status = 200, description = "Divisions a requester can belong to", body = Vec<String>))
)]
pub async fn list_divisions() -> Json<Vec<&'static str>> {
    Json(DIVISIONS.to_vec())
}
