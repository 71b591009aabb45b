pub mod health;
pub mod page;

use axum::{
    routing::{get, post},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page::index_handler))
        .route("/health", get(health::health_handler))
        // Search sessions
        .route("/api/v1/searches", post(handlers::handle_start_search))
        .route(
            "/api/v1/searches/:id/status",
            get(handlers::handle_search_status),
        )
        .route(
            "/api/v1/searches/:id/result",
            get(handlers::handle_search_result),
        )
        .route(
            "/api/v1/searches/:id/wait",
            get(handlers::handle_search_wait),
        )
        .with_state(state)
}
