//! Router configuration for the JSON API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Scan lifecycle
        .route("/api/scan/start", post(handlers::scan_start))
        .route("/api/scan/stop", post(handlers::scan_stop))
        .route("/api/scan/status", get(handlers::scan_status))
        .route("/api/scan/state", get(handlers::scan_state))
        // Approved jobs
        .route("/api/jobs", get(handlers::list_jobs))
        .route("/api/jobs/:id", get(handlers::job_detail))
        .route("/api/jobs/:id/apply", post(handlers::apply_job))
        .route("/api/jobs/:id/delete", post(handlers::delete_job))
        // Bulk lifecycle actions
        .route("/api/jobs/archive-applied", post(handlers::archive_applied))
        .route("/api/jobs/clear-approved", post(handlers::clear_approved))
        .route(
            "/api/jobs/clear-discovered",
            post(handlers::clear_discovered),
        )
        // Reporting
        .route("/api/statistics", get(handlers::statistics))
        .route("/api/activity", get(handlers::activity))
        // Config and presets
        .route(
            "/api/config",
            get(handlers::get_config).post(handlers::save_config),
        )
        .route(
            "/api/presets",
            get(handlers::list_presets).post(handlers::save_preset),
        )
        .route(
            "/api/presets/delete-all",
            post(handlers::delete_all_presets),
        )
        .route(
            "/api/presets/create-defaults",
            post(handlers::create_default_presets),
        )
        .route("/api/presets/:name", get(handlers::get_preset))
        .route("/api/presets/:name/apply", post(handlers::apply_preset))
        .route("/api/presets/:name/delete", post(handlers::delete_preset))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
