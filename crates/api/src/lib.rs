//! Growth API
//!
//! HTTP API serving the growth dashboard payload.
//!
//! # Overview
//!
//! Built on Axum. Every request is answered by a [`DashboardEngine`] from
//! `growth-analytics`; this crate only parses parameters and maps errors.
//!
//! # Usage
//!
//! ```ignore
//! use growth_api::{build_router, AppState};
//! use growth_analytics::DashboardEngine;
//!
//! let engine = DashboardEngine::new(source, settings);
//! let state = AppState::new(engine).with_utc_offset(9);
//!
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! # Endpoints
//!
//! - `GET /api/dashboard` - Full dashboard payload
//! - `GET /health` - Liveness and source name
//! - `GET /ready` - Source reachability
//!
//! # Query Parameters
//!
//! `/api/dashboard` accepts:
//! - `startDate`, `endDate` - Inclusive `YYYY-MM-DD` bounds
//! - `range` - Relative range instead of explicit dates (e.g., "30d", "mtd")
//! - `period` - Bucketing period (daily, weekly, monthly)
//! - `reduction` - Bucket reduction (sum, average)
//!
//! [`DashboardEngine`]: growth_analytics::DashboardEngine

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

// Re-exports
pub use error::{ApiError, Result};
pub use routes::build_router;
pub use state::AppState;
pub use types::DashboardParams;
