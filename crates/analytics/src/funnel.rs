//! Funnel reduction
//!
//! Stage values are taken as given; a later stage larger than an earlier one
//! is reported, not rejected.

use serde::{Deserialize, Serialize};

use crate::comparison::ComparisonEntry;

/// One funnel stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStage {
    pub title: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparisons: Option<[ComparisonEntry; 3]>,
}

impl FunnelStage {
    /// Create a stage without comparisons
    pub fn new(title: impl Into<String>, value: f64) -> Self {
        Self {
            title: title.into(),
            value,
            comparisons: None,
        }
    }

    /// Attach comparisons
    pub fn with_comparisons(mut self, comparisons: [ComparisonEntry; 3]) -> Self {
        self.comparisons = Some(comparisons);
        self
    }
}

/// Conversion between two adjacent stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStep {
    pub from: String,
    pub to: String,
    /// Percent of `from` that reached `to`
    pub rate: f64,
}

/// A reduced funnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelReport {
    pub stages: Vec<FunnelStage>,
    pub steps: Vec<FunnelStep>,
    /// Last stage over first stage, or the configured override
    pub overall_rate: f64,
}

/// Ordered stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Funnel {
    stages: Vec<FunnelStage>,
    overall_override: Option<f64>,
}

impl Funnel {
    /// Create a funnel from ordered stages
    pub fn new(stages: Vec<FunnelStage>) -> Self {
        Self {
            stages,
            overall_override: None,
        }
    }

    /// Report `rate` as the overall conversion instead of computing it
    pub fn with_overall_override(mut self, rate: Option<f64>) -> Self {
        self.overall_override = rate;
        self
    }

    /// Compute step and overall rates
    pub fn reduce(self) -> FunnelReport {
        let steps = self
            .stages
            .windows(2)
            .map(|pair| FunnelStep {
                from: pair[0].title.clone(),
                to: pair[1].title.clone(),
                rate: step_rate(pair[0].value, pair[1].value),
            })
            .collect();

        let overall_rate = self.overall_override.unwrap_or_else(|| {
            match (self.stages.first(), self.stages.last()) {
                (Some(first), Some(last)) if self.stages.len() >= 2 => {
                    step_rate(first.value, last.value)
                }
                _ => 100.0,
            }
        });

        FunnelReport {
            stages: self.stages,
            steps,
            overall_rate,
        }
    }
}

/// Percent of `from` reaching `to`; 100 when `from` is zero
pub fn step_rate(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        100.0
    } else {
        to / from * 100.0
    }
}
