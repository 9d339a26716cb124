//! Dashboard configuration

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use growth_analytics::{DEFAULT_MAX_WINDOW_DAYS, DashboardSettings, PeriodType, Reduction};

/// Dashboard configuration
///
/// # Example
///
/// ```toml
/// [dashboard]
/// history_start = "2024-01-01"
/// utc_offset_hours = 9
/// default_period = "weekly"
/// default_reduction = "sum"
/// shop_funnel_override = 10.5
///
/// [dashboard.floors]
/// "Churn rate" = 1.0
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Earliest date fetched for comparisons, and the default start date
    /// Default: 2024-01-01
    pub history_start: NaiveDate,

    /// Offset used for "today" and for timestamp to date conversion
    /// Default: 9
    pub utc_offset_hours: i32,

    /// Period used when a request names none
    /// Default: weekly
    pub default_period: String,

    /// Reduction used when a request names none
    /// Default: sum
    pub default_reduction: String,

    /// Overall conversion reported for the site funnel
    pub site_funnel_override: Option<f64>,

    /// Overall conversion reported for the shop funnel
    pub shop_funnel_override: Option<f64>,

    /// Minimum value per series title
    pub floors: BTreeMap<String, f64>,

    /// Longest fetch window, history included, a request may need
    /// Default: 3660
    pub max_window_days: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            history_start: DashboardSettings::default().history_start,
            utc_offset_hours: 9,
            default_period: "weekly".to_string(),
            default_reduction: "sum".to_string(),
            site_funnel_override: None,
            shop_funnel_override: None,
            floors: BTreeMap::new(),
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
        }
    }
}

impl DashboardConfig {
    /// Parsed default period, falling back to weekly
    pub fn period(&self) -> PeriodType {
        PeriodType::parse(&self.default_period).unwrap_or_default()
    }

    /// Parsed default reduction, falling back to sum
    pub fn reduction(&self) -> Reduction {
        Reduction::parse(&self.default_reduction).unwrap_or_default()
    }

    /// Settings for the dashboard engine
    pub fn settings(&self) -> DashboardSettings {
        DashboardSettings {
            history_start: self.history_start,
            site_funnel_override: self.site_funnel_override,
            shop_funnel_override: self.shop_funnel_override,
            floors: self.floors.clone(),
            max_window_days: self.max_window_days,
        }
    }
}
