// src/handlers/analytics.rs
//
// Read-only dashboard feeds. `period` is validated into a `TimeWindow`
// before anything reaches SQL.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::{error::AppError, time_window::PeriodQuery},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::analytics::{
        CategoryReliability, DailyEnergy, DailyEnergyInputs, DailyReliability, EquipmentReliability,
        LegacyWorkOrderRow, LegacyWorkRequestRow, MonthlyEnergy, MonthlyTrend, WeeklyDowntime,
        WeeklyStatusRollup,
    },
};

// GET /api/active-work-orders
#[utoipa::path(
    get,
    path = "/api/active-work-orders",
    tag = "Analytics",
    responses((status = 200, description = "Released orders per week of month with week-over-week delta", body = Vec<WeeklyStatusRollup>)),
    security(("api_jwt" = []))
)]
pub async fn active_work_orders(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.analytics_service.active_work_orders().await?))
}

// GET /api/unreleased-work-orders
#[utoipa::path(
    get,
    path = "/api/unreleased-work-orders",
    tag = "Analytics",
    responses((status = 200, description = "Unreleased orders per week of month with week-over-week delta", body = Vec<WeeklyStatusRollup>)),
    security(("api_jwt" = []))
)]
pub async fn unreleased_work_orders(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.analytics_service.unreleased_work_orders().await?))
}

// GET /api/work-order-list
#[utoipa::path(
    get,
    path = "/api/work-order-list",
    tag = "Analytics",
    responses((status = 200, description = "Historical work orders", body = Vec<LegacyWorkOrderRow>)),
    security(("api_jwt" = []))
)]
pub async fn work_order_list(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.analytics_service.work_order_list().await?))
}

// GET /api/work-request
#[utoipa::path(
    get,
    path = "/api/work-request",
    tag = "Analytics",
    responses((status = 200, description = "Historical work requests", body = Vec<LegacyWorkRequestRow>)),
    security(("api_jwt" = []))
)]
pub async fn work_request_list(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.analytics_service.work_request_list().await?))
}

// GET /api/analytics
#[utoipa::path(
    get,
    path = "/api/analytics",
    tag = "Analytics",
    params(PeriodQuery),
    responses(
        (status = 200, description = "MTTR and MTBF per day", body = Vec<DailyReliability>),
        (status = 400, description = "Unsupported period")
    ),
    security(("api_jwt" = []))
)]
pub async fn daily_reliability(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = query.window()?;
    Ok(Json(app_state.analytics_service.daily_reliability(window).await?))
}

// GET /api/category-analytics
#[utoipa::path(
    get,
    path = "/api/category-analytics",
    tag = "Analytics",
    params(PeriodQuery),
    responses(
        (status = 200, description = "MTTR and MTBF per resource", body = Vec<CategoryReliability>),
        (status = 400, description = "Unsupported period")
    ),
    security(("api_jwt" = []))
)]
pub async fn category_reliability(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = query.window()?;
    Ok(Json(app_state.analytics_service.category_reliability(window).await?))
}

// GET /api/equipment-analytics
#[utoipa::path(
    get,
    path = "/api/equipment-analytics",
    tag = "Analytics",
    params(PeriodQuery),
    responses(
        (status = 200, description = "MTTR and MTBF per asset group", body = Vec<EquipmentReliability>),
        (status = 400, description = "Unsupported period")
    ),
    security(("api_jwt" = []))
)]
pub async fn equipment_reliability(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = query.window()?;
    Ok(Json(app_state.analytics_service.equipment_reliability(window).await?))
}

// GET /api/monthly-trend
#[utoipa::path(
    get,
    path = "/api/monthly-trend",
    tag = "Analytics",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Monthly counts, MTTR and month-over-month delta", body = Vec<MonthlyTrend>),
        (status = 400, description = "Unsupported period")
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly_trend(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = query.window()?;
    Ok(Json(app_state.analytics_service.monthly_trend(window).await?))
}

// GET /api/downtime
#[utoipa::path(
    get,
    path = "/api/downtime",
    tag = "Analytics",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Planned and unplanned hours per ISO week", body = Vec<WeeklyDowntime>),
        (status = 400, description = "Unsupported period")
    ),
    security(("api_jwt" = []))
)]
pub async fn downtime(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = query.window()?;
    Ok(Json(app_state.analytics_service.downtime(window).await?))
}

// GET /api/energy
#[utoipa::path(
    get,
    path = "/api/energy",
    tag = "Analytics",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Daily plant consumption", body = Vec<DailyEnergy>),
        (status = 400, description = "Unsupported period")
    ),
    security(("api_jwt" = []))
)]
pub async fn daily_energy(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = query.window()?;
    Ok(Json(app_state.analytics_service.daily_energy(window).await?))
}

// GET /api/energy_monthly
#[utoipa::path(
    get,
    path = "/api/energy_monthly",
    tag = "Analytics",
    responses((status = 200, description = "Monthly consumption with month-over-month deltas", body = Vec<MonthlyEnergy>)),
    security(("api_jwt" = []))
)]
pub async fn monthly_energy(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.analytics_service.monthly_energy().await?))
}

// GET /api/energydaily
#[utoipa::path(
    get,
    path = "/api/energydaily",
    tag = "Analytics",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Submitted readings summed per day and type", body = Vec<DailyEnergyInputs>),
        (status = 400, description = "Unsupported period")
    ),
    security(("api_jwt" = []))
)]
pub async fn energy_input_daily(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = query.window()?;
    Ok(Json(app_state.analytics_service.energy_input_daily(window).await?))
}
