//! Analytics error types

use thiserror::Error;

/// Analytics errors
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Invalid date range
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    /// Unknown period type
    #[error("invalid period: {0} (expected daily, weekly or monthly)")]
    InvalidPeriod(String),

    /// Unknown reduction
    #[error("invalid reduction: {0} (expected sum or average)")]
    InvalidReduction(String),

    /// The warehouse request failed
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(#[from] growth_warehouse::WarehouseError),

    /// The warehouse answered with no rows at all
    #[error("no rows returned for {dataset}")]
    EmptyResult { dataset: String },

    /// A single row could not be turned into points
    #[error("malformed row {row} in {dataset}: {reason}")]
    MalformedRow {
        dataset: String,
        row: usize,
        reason: String,
    },

    /// Source not usable with the given settings
    #[error("source error: {0}")]
    Source(String),
}

impl AnalyticsError {
    /// Create a malformed row error
    pub fn malformed(dataset: impl Into<String>, row: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            dataset: dataset.into(),
            row,
            reason: reason.into(),
        }
    }
}

/// Result type for analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;
