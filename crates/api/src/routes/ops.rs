//! Operations routes
//!
//! Liveness and readiness endpoints for monitoring.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::error::{ApiError, Result};
use crate::state::AppState;

// =============================================================================
// Response Types
// =============================================================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server status
    pub status: &'static str,
    /// Series source name
    pub source: &'static str,
    /// True when the source serves placeholder data
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

// =============================================================================
// Routes
// =============================================================================

/// Operations routes (health, readiness)
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
///
/// GET /health
///
/// Always returns 200 OK if the API is running.
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let source = state.engine.source();
    Json(HealthResponse {
        status: "ok",
        source: source.name(),
        synthetic: source.is_synthetic(),
    })
}

/// Readiness endpoint
///
/// GET /ready
///
/// Runs the source health check. Returns 503 if the source cannot answer.
async fn ready_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let source = state.engine.source();
    source
        .health_check()
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: "ok",
        source: source.name(),
        synthetic: source.is_synthetic(),
    }))
}
