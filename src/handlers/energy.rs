// src/handlers/energy.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{EnergyStaff, RequireRole},
    },
    models::energy::{CreateEnergyInputPayload, EnergyInput, EnergyInputQuery, TodayEnergy},
};

// POST /api/energy-inputs
#[utoipa::path(
    post,
    path = "/api/energy-inputs",
    tag = "Energy",
    request_body = CreateEnergyInputPayload,
    responses(
        (status = 201, description = "Reading stored", body = EnergyInput),
        (status = 400, description = "Invalid reading"),
        (status = 403, description = "Admins, utility and engineers only")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_energy_input(
    State(app_state): State<AppState>,
    staff: RequireRole<EnergyStaff>,
    Json(payload): Json<CreateEnergyInputPayload>,
) -> Result<impl IntoResponse, AppError> {
    let input = app_state.energy_service.submit(staff.user(), payload).await?;
    Ok((StatusCode::CREATED, Json(input)))
}

// GET /api/energy-inputs
#[utoipa::path(
    get,
    path = "/api/energy-inputs",
    tag = "Energy",
    params(EnergyInputQuery),
    responses((status = 200, description = "Caller's readings, newest first", body = Vec<EnergyInput>)),
    security(("api_jwt" = []))
)]
pub async fn list_energy_inputs(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<EnergyInputQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.energy_service.list_mine(&user, query.energy_type).await?;
    Ok(Json(rows))
}

// GET /api/energy-inputs/today
#[utoipa::path(
    get,
    path = "/api/energy-inputs/today",
    tag = "Energy",
    responses((status = 200, description = "Today's totals per type against the daily budget", body = Vec<TodayEnergy>)),
    security(("api_jwt" = []))
)]
pub async fn today_energy(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.energy_service.today(&user).await?;
    Ok(Json(summary))
}
