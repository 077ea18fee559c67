use axum::{middleware::from_fn, routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tropiqk_core::middleware::{
    request_id::{request_id_middleware, REQUEST_ID_HEADER},
    security_headers::security_headers_middleware,
};

use crate::handlers::{
    app::{health_check, index, unauthorized},
    auth::{login_page, register_page, verify_email_page},
    dashboard::{
        admin_dashboard, artist_dashboard, artist_onboarding, fans_dashboard, fans_onboarding,
    },
    metrics::metrics,
};
use crate::middleware::edge_guard_middleware;
use crate::services::metrics::track_http_metrics;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.settings.server.static_dir);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/unauthorized", get(unauthorized))
        .route("/auth/login", get(login_page))
        .route("/auth/register", get(register_page))
        .route("/auth/verify-email", get(verify_email_page))
        .route("/artist/dashboard", get(artist_dashboard))
        .route("/artist/onboarding", get(artist_onboarding))
        .route("/fans/dashboard", get(fans_dashboard))
        .route("/fans/onboarding", get(fans_onboarding))
        .route("/admin/dashboard", get(admin_dashboard))
        .nest_service("/static", static_dir)
        .layer(from_fn(edge_guard_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(track_http_metrics))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
