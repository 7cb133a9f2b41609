pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::fitment::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::handle_welcome))
        .route("/health", get(health::health_handler))
        // Fitment API
        .route(
            "/generate_fitment_reports/",
            post(handlers::handle_generate_reports),
        )
        .route(
            "/api/v1/fitment/reports",
            post(handlers::handle_generate_reports),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
