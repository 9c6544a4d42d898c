//! API Routes
//!
//! Configures the Axum router with all profile cache endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    admin_stats_handler, health_handler, profile_handler, reload_all_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET|POST /v1/profile/:player` - Cached profile, refreshed when stale
/// - `GET /_admin/stats` - Freshness statistics
/// - `GET|POST /admin/reloadAll` - Queue a refresh of every stale profile
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/v1/profile/:player",
            get(profile_handler).post(profile_handler),
        )
        .route("/_admin/stats", get(admin_stats_handler))
        .route(
            "/admin/reloadAll",
            get(reload_all_handler).post(reload_all_handler),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
