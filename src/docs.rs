// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::register,
        handlers::users::list_users,
        handlers::users::user_stats,
        handlers::users::update_user_status,
        handlers::users::list_divisions,

        // --- Work Requests ---
        handlers::work_requests::create_work_request,
        handlers::work_requests::list_work_requests,
        handlers::work_requests::get_work_request,
        handlers::work_requests::update_work_request_status,

        // --- Work Orders ---
        handlers::work_orders::list_work_orders,
        handlers::work_orders::get_work_order,
        handlers::work_orders::update_work_order,
        handlers::work_orders::update_work_order_status,
        handlers::work_orders::release_scheduled,

        // --- Reports ---
        handlers::reports::send_daily_report,

        // --- Energy ---
        handlers::energy::create_energy_input,
        handlers::energy::list_energy_inputs,
        handlers::energy::today_energy,

        // --- Documents ---
        handlers::documents::create_document,
        handlers::documents::list_documents,
        handlers::documents::delete_document,

        // --- Audit ---
        handlers::audit::list_audit_trail,

        // --- Analytics ---
        handlers::analytics::active_work_orders,
        handlers::analytics::unreleased_work_orders,
        handlers::analytics::work_order_list,
        handlers::analytics::work_request_list,
        handlers::analytics::daily_reliability,
        handlers::analytics::category_reliability,
        handlers::analytics::equipment_reliability,
        handlers::analytics::monthly_trend,
        handlers::analytics::downtime,
        handlers::analytics::daily_energy,
        handlers::analytics::monthly_energy,
        handlers::analytics::energy_input_daily,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::UserStatus,
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::TokenResponse,
            models::auth::RegisterUserPayload,
            models::auth::UpdateUserStatusPayload,
            models::auth::UserStats,

            // --- Work Requests ---
            models::work_request::Urgency,
            models::work_request::WorkType,
            models::work_request::WorkRequestStatus,
            models::work_request::WorkRequest,
            models::work_request::CreateWorkRequestPayload,
            models::work_request::UpdateWorkRequestStatusPayload,
            models::work_request::WorkRequestDecision,

            // --- Work Orders ---
            models::work_order::WorkOrderStatus,
            models::work_order::WorkOrder,
            models::work_order::WorkOrderDetail,
            models::work_order::UpdateWorkOrderPayload,
            models::work_order::UpdateWorkOrderStatusPayload,
            models::work_order::ScheduledReleaseResult,

            // --- Energy ---
            models::energy::EnergyType,
            models::energy::EnergyInput,
            models::energy::CreateEnergyInputPayload,
            models::energy::TodayEnergy,

            // --- Documents ---
            models::document::DocumentCategory,
            models::document::Department,
            models::document::DocumentStatus,
            models::document::Document,
            models::document::CreateDocumentPayload,

            // --- Audit ---
            models::audit::AuditEntry,

            // --- Analytics ---
            common::time_window::TimeWindow,
            models::analytics::WeeklyStatusRollup,
            models::analytics::LegacyWorkOrderRow,
            models::analytics::LegacyWorkRequestRow,
            models::analytics::DailyReliability,
            models::analytics::CategoryReliability,
            models::analytics::EquipmentReliability,
            models::analytics::MonthlyTrend,
            models::analytics::WeeklyDowntime,
            models::analytics::DailyEnergy,
            models::analytics::MonthlyEnergy,
            models::analytics::DailyEnergyInputs,
            models::analytics::DailyReport,
        )
    ),
    tags(
        (name = "Auth", description = "Token issuance"),
        (name = "Users", description = "Accounts and profiles"),
        (name = "Work Requests", description = "Submission and approval of maintenance requests"),
        (name = "Work Orders", description = "Execution of approved work"),
        (name = "Reports", description = "Externally triggered summaries"),
        (name = "Energy", description = "Meter readings"),
        (name = "Documents", description = "Controlled document metadata"),
        (name = "Audit", description = "Append-only activity log"),
        (name = "Analytics", description = "MTTR, MTBF, rollups and energy dashboards")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}
