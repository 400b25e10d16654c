// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::{
    config::{AppState, Config},
    docs::ApiDoc,
    middleware::auth::auth_guard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maintenance_backend=info,tower_http=info".into()),
        )
        .compact()
        .init();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let bootstrap_admin = config.bootstrap_admin.clone();

    let app_state = AppState::new(config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("Database migrations applied");

    if let Some((username, password)) = bootstrap_admin {
        app_state
            .auth_service
            .ensure_bootstrap_admin(&username, &password)
            .await?;
    }

    let app = build_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(app_state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/token", post(handlers::auth::login))
        .route("/api/divisions", get(handlers::users::list_divisions));

    let user_routes = Router::new()
        .route("/api/me", get(handlers::auth::get_me))
        .route("/api/regist", post(handlers::users::register))
        .route("/api/users", get(handlers::users::list_users))
        .route("/api/users/stats", get(handlers::users::user_stats))
        .route("/api/users/{id}/status", patch(handlers::users::update_user_status));

    let work_routes = Router::new()
        .route("/api/work-request/create", post(handlers::work_requests::create_work_request))
        .route("/api/work-requests", get(handlers::work_requests::list_work_requests))
        .route("/api/work-requests/{id}", get(handlers::work_requests::get_work_request))
        .route(
            "/api/work-request/update-status/{id}",
            patch(handlers::work_requests::update_work_request_status),
        )
        .route("/api/work-orders", get(handlers::work_orders::list_work_orders))
        .route("/api/work-orders/release-scheduled", post(handlers::work_orders::release_scheduled))
        .route("/api/work-orders/{wo_number}", get(handlers::work_orders::get_work_order))
        .route("/api/work-order/update/{wo_number}", patch(handlers::work_orders::update_work_order))
        .route(
            "/api/work-order/update-status/{wo_number}",
            patch(handlers::work_orders::update_work_order_status),
        )
        .route("/api/reports/daily", post(handlers::reports::send_daily_report));

    let record_routes = Router::new()
        .route(
            "/api/energy-inputs",
            post(handlers::energy::create_energy_input).get(handlers::energy::list_energy_inputs),
        )
        .route("/api/energy-inputs/today", get(handlers::energy::today_energy))
        .route(
            "/api/documents",
            post(handlers::documents::create_document).get(handlers::documents::list_documents),
        )
        .route("/api/documents/{id}", delete(handlers::documents::delete_document))
        .route("/api/audit-trail", get(handlers::audit::list_audit_trail));

    let analytics_routes = Router::new()
        .route("/api/active-work-orders", get(handlers::analytics::active_work_orders))
        .route("/api/unreleased-work-orders", get(handlers::analytics::unreleased_work_orders))
        .route("/api/work-order-list", get(handlers::analytics::work_order_list))
        .route("/api/work-request", get(handlers::analytics::work_request_list))
        .route("/api/analytics", get(handlers::analytics::daily_reliability))
        .route("/api/category-analytics", get(handlers::analytics::category_reliability))
        .route("/api/equipment-analytics", get(handlers::analytics::equipment_reliability))
        .route("/api/monthly-trend", get(handlers::analytics::monthly_trend))
        .route("/api/downtime", get(handlers::analytics::downtime))
        .route("/api/energy", get(handlers::analytics::daily_energy))
        .route("/api/energy_monthly", get(handlers::analytics::monthly_energy))
        .route("/api/energydaily", get(handlers::analytics::energy_input_daily));

    let protected_routes = Router::new()
        .merge(user_routes)
        .merge(work_routes)
        .merge(record_routes)
        .merge(analytics_routes)
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::config::testing::lazy_state;

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = build_router(lazy_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, _) = send(get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn divisions_are_public() {
        let (status, body) = send(get("/api/divisions")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().iter().any(|d| d == "QA"));
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        for uri in ["/api/me", "/api/work-requests", "/api/analytics?period=90", "/api/audit-trail"] {
            let (status, body) = send(get(uri)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn forged_token_is_rejected_before_any_query() {
        let request = Request::builder()
            .uri("/api/work-orders")
            .header(header::AUTHORIZATION, "Bearer not.a.jwt")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_validates_before_touching_the_database() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/token")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username":"","password":""}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["username"].is_array());
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = send(get("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/work-request/update-status/{id}"].is_object());
    }
}
