// src/handlers/work_orders.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, MaintenanceStaff, RequireRole},
    },
    models::work_order::{
        ScheduledReleaseResult, UpdateWorkOrderPayload, UpdateWorkOrderStatusPayload, WorkOrderDetail,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct WorkOrderQuery {
    /// unreleased, planned, released, completed or cancelled
    pub status: Option<String>,
}

// GET /api/work-orders
#[utoipa::path(
    get,
    path = "/api/work-orders",
    tag = "Work Orders",
    params(WorkOrderQuery),
    responses(
        (status = 200, description = "Newest first", body = Vec<WorkOrderDetail>),
        (status = 400, description = "Unknown status filter")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_work_orders(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<WorkOrderQuery>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state
        .work_order_service
        .list(query.status.as_deref())
        .await?;
    let details: Vec<WorkOrderDetail> = orders.into_iter().map(WorkOrderDetail::from).collect();
    Ok(Json(details))
}

// GET /api/work-orders/{wo_number}
#[utoipa::path(
    get,
    path = "/api/work-orders/{wo_number}",
    tag = "Work Orders",
    params(("wo_number" = String, Path, description = "e.g. WO-7B21C0DE")),
    responses(
        (status = 200, description = "One work order", body = WorkOrderDetail),
        (status = 404, description = "Unknown work order")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_work_order(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(wo_number): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let wo = app_state.work_order_service.get(&wo_number).await?;
    Ok(Json(WorkOrderDetail::from(wo)))
}

// PATCH /api/work-order/update/{wo_number}
#[utoipa::path(
    patch,
    path = "/api/work-order/update/{wo_number}",
    tag = "Work Orders",
    request_body = UpdateWorkOrderPayload,
    params(("wo_number" = String, Path, description = "e.g. WO-7B21C0DE")),
    responses(
        (status = 200, description = "Details saved", body = WorkOrderDetail),
        (status = 403, description = "Admins and engineers only"),
        (status = 404, description = "Unknown work order")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_work_order(
    State(app_state): State<AppState>,
    staff: RequireRole<MaintenanceStaff>,
    Path(wo_number): Path<String>,
    Json(payload): Json<UpdateWorkOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let wo = app_state
        .work_order_service
        .update_details(staff.user(), &wo_number, payload)
        .await?;
    Ok(Json(WorkOrderDetail::from(wo)))
}

// PATCH /api/work-order/update-status/{wo_number}
#[utoipa::path(
    patch,
    path = "/api/work-order/update-status/{wo_number}",
    tag = "Work Orders",
    request_body = UpdateWorkOrderStatusPayload,
    params(("wo_number" = String, Path, description = "e.g. WO-7B21C0DE")),
    responses(
        (status = 200, description = "Status applied, or unchanged when already in it", body = WorkOrderDetail),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Unknown work order"),
        (status = 409, description = "Transition not allowed")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_work_order_status(
    State(app_state): State<AppState>,
    staff: RequireRole<MaintenanceStaff>,
    Path(wo_number): Path<String>,
    Json(payload): Json<UpdateWorkOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let wo = app_state
        .work_order_service
        .update_status(staff.user(), &wo_number, &payload.status)
        .await?;
    Ok(Json(WorkOrderDetail::from(wo)))
}

// POST /api/work-orders/release-scheduled
#[utoipa::path(
    post,
    path = "/api/work-orders/release-scheduled",
    tag = "Work Orders",
    responses(
        (status = 200, description = "Planned orders for today now released", body = ScheduledReleaseResult),
        (status = 403, description = "Admins only")
    ),
    security(("api_jwt" = []))
)]
pub async fn release_scheduled(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, AppError> {
    let result = app_state.work_order_service.release_scheduled().await?;
    Ok(Json(result))
}
