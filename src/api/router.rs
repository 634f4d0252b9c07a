//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Sessions
        .route("/start_session", post(handlers::start_session))
        .route("/record_events", post(handlers::record_events))
        .route("/session/:id", get(handlers::get_session))
        // Classification
        .route("/analyze", post(handlers::analyze))
        .route(
            "/test_analysis",
            get(handlers::test_analysis).post(handlers::test_analysis),
        )
        // History
        .route("/history", get(handlers::history))
        .route("/stats", get(handlers::stats))
        // Status
        .route("/status", get(handlers::status))
        .route("/test", get(handlers::api_test));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
