//! Versioned pipeline endpoints

pub mod classify;
pub mod query;
pub mod screen;

use axum::{Router, routing::post};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::process_query))
        .route("/classify", post(classify::classify_document))
        .route("/screen", post(screen::screen_document))
}
