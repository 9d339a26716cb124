//! Traffic source shares

use serde::{Deserialize, Serialize};

use crate::comparison::ComparisonEntry;

/// Visits attributed to one traffic source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficEntry {
    pub title: String,
    pub count: f64,
    /// Percent of all visits in the breakdown
    pub share: f64,
    pub comparisons: [ComparisonEntry; 3],
}

impl TrafficEntry {
    /// Create an entry; the share is filled in by [`breakdown`]
    pub fn new(title: impl Into<String>, count: f64, comparisons: [ComparisonEntry; 3]) -> Self {
        Self {
            title: title.into(),
            count,
            share: 0.0,
            comparisons,
        }
    }
}

/// Fill in each entry's share of the combined count
///
/// Shares are all 0 when the combined count is 0.
pub fn breakdown(entries: Vec<TrafficEntry>) -> Vec<TrafficEntry> {
    let total: f64 = entries.iter().map(|e| e.count).sum();

    entries
        .into_iter()
        .map(|mut entry| {
            entry.share = if total > 0.0 {
                entry.count / total * 100.0
            } else {
                0.0
            };
            entry
        })
        .collect()
}
