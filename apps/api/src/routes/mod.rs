pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::rag::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Provider passthrough
        .route("/find-jobs/", post(handlers::handle_find_jobs))
        // Matching pipeline
        .route("/api/v1/jobs", delete(handlers::handle_clear))
        .route("/api/v1/jobs/ingest", post(handlers::handle_ingest))
        .route("/api/v1/jobs/match", post(handlers::handle_match))
        .route(
            "/api/v1/jobs/search-and-match",
            post(handlers::handle_search_and_match),
        )
        .with_state(state)
}
