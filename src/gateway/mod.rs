//! HTTP gateway: router assembly and serving.

pub mod handlers;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Json, Router, middleware};

use crate::auth::jwt_auth_middleware;
use crate::config::GatewayConfig;
use state::AppState;
use types::ApiResponse;

async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}

/// Assemble the full route table.
pub fn build_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/login", post(handlers::auth::login));

    let private = Router::new()
        // Identity & vendor management
        .route("/api/v1/auth/me", get(handlers::auth::me))
        .route("/api/v1/auth/profile", put(handlers::auth::update_profile))
        .route(
            "/api/v1/auth/vendors",
            post(handlers::auth::create_vendor).get(handlers::auth::list_vendors),
        )
        .route(
            "/api/v1/auth/vendors/{id}/limit",
            put(handlers::auth::update_withdrawal_limit),
        )
        // Request lifecycle
        .route("/api/v1/requests", post(handlers::requests::create))
        .route(
            "/api/v1/requests/admin-withdrawal",
            post(handlers::requests::create_admin_withdrawal),
        )
        .route(
            "/api/v1/requests/available",
            get(handlers::requests::available),
        )
        .route("/api/v1/requests/mine", get(handlers::requests::mine))
        .route(
            "/api/v1/requests/mine/counts",
            get(handlers::requests::counts),
        )
        .route(
            "/api/v1/requests/admin/all",
            get(handlers::requests::admin_all),
        )
        .route(
            "/api/v1/requests/{id}",
            get(handlers::requests::details).delete(handlers::requests::cancel),
        )
        .route("/api/v1/requests/{id}/pick", post(handlers::requests::pick))
        .route(
            "/api/v1/requests/{id}/slip",
            post(handlers::requests::upload_slip),
        )
        .route(
            "/api/v1/requests/{id}/verify",
            post(handlers::requests::verify),
        )
        .route(
            "/api/v1/requests/{id}/fail",
            post(handlers::requests::report_failure),
        )
        .route(
            "/api/v1/requests/{id}/revert",
            post(handlers::requests::revert),
        )
        .route("/api/v1/requests/{id}/logs", get(handlers::requests::logs))
        .route(
            "/api/v1/requests/{id}/slips",
            get(handlers::requests::slips),
        )
        .route(
            "/api/v1/requests/{id}/slips/{slip_id}/evidence",
            get(handlers::requests::slip_evidence),
        )
        // Notifications
        .route("/api/v1/notifications", get(handlers::notifications::list))
        .route(
            "/api/v1/notifications/unread",
            get(handlers::notifications::unread),
        )
        .route(
            "/api/v1/notifications/unread-count",
            get(handlers::notifications::unread_count),
        )
        .route(
            "/api/v1/notifications/read-all",
            put(handlers::notifications::mark_all_read),
        )
        .route(
            "/api/v1/notifications/{id}/read",
            put(handlers::notifications::mark_read),
        )
        // Dashboard
        .route(
            "/api/v1/dashboard/vendor/stats",
            get(handlers::dashboard::vendor_stats),
        )
        .route(
            "/api/v1/dashboard/vendor/monthly",
            get(handlers::dashboard::vendor_monthly),
        )
        .route(
            "/api/v1/dashboard/admin/vendors",
            get(handlers::dashboard::admin_vendor_stats),
        )
        .route(
            "/api/v1/dashboard/admin/overview",
            get(handlers::dashboard::admin_overview),
        )
        .route(
            "/api/v1/dashboard/admin/monthly",
            get(handlers::dashboard::admin_monthly),
        )
        .route(
            "/api/v1/dashboard/export",
            get(handlers::dashboard::export_csv),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    public.merge(private).with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(state: Arc<AppState>, config: &GatewayConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Gateway listening on {}", addr);

    let router = build_router(state);
    axum::serve(listener, router).await?;

    Ok(())
}
