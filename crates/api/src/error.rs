//! API error types
//!
//! Provides structured error responses for the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use growth_analytics::AnalyticsError;
use serde::Serialize;
use thiserror::Error;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request parameters
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Invalid date range
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    /// Unknown period or reduction
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Data source cannot be reached
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// Analytics error
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidDateRange(_) => StatusCode::BAD_REQUEST,
            Self::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Analytics(e) => match e {
                AnalyticsError::InvalidDateRange(_)
                | AnalyticsError::InvalidPeriod(_)
                | AnalyticsError::InvalidReduction(_) => StatusCode::BAD_REQUEST,
                AnalyticsError::UpstreamFetch(_)
                | AnalyticsError::EmptyResult { .. }
                | AnalyticsError::MalformedRow { .. } => StatusCode::BAD_GATEWAY,
                AnalyticsError::Source(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::InvalidDateRange(_) => "INVALID_DATE_RANGE",
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Analytics(e) => match e {
                AnalyticsError::InvalidDateRange(_) => "INVALID_DATE_RANGE",
                AnalyticsError::InvalidPeriod(_) | AnalyticsError::InvalidReduction(_) => {
                    "INVALID_PARAMETER"
                }
                AnalyticsError::UpstreamFetch(_) => "UPSTREAM_FETCH",
                AnalyticsError::EmptyResult { .. } => "EMPTY_RESULT",
                AnalyticsError::MalformedRow { .. } => "MALFORMED_ROW",
                AnalyticsError::Source(_) => "SOURCE_ERROR",
            },
        }
    }

    // Helper constructors

    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code (machine-readable)
    pub error: &'static str,
    /// Error message (human-readable)
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
        };

        tracing::warn!(
            error_code = body.error,
            error_message = %body.message,
            status = %status,
            "API error"
        );

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
