pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::report::handlers;
use crate::state::AppState;
use crate::web;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Form page
        .route("/", get(web::handle_index))
        .route("/report", post(web::handle_submit))
        // Report API
        .route("/api/v1/reports", post(handlers::handle_generate_report))
        .with_state(state)
}
