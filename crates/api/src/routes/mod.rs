//! API routes
//!
//! Dashboard and operations route handlers.

pub mod dashboard;
pub mod ops;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Operations routes (health, readiness)
        .merge(ops::routes())
        // Dashboard payload
        .nest("/api", dashboard::routes())
        .with_state(state)
}
