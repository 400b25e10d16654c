// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{LoginPayload, TokenResponse, User},
};

// POST /api/token
#[utoipa::path(
    post,
    path = "/api/token",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Bearer token issued", body = TokenResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Wrong credentials or account not active")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(token))
}

// GET /api/me
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Users",
    responses(
        (status = 200, description = "Profile of the caller", body = User),
        (status = 401, description = "Not authenticated")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}
