//! Application state
//!
//! Shared state for API handlers: the dashboard engine and request defaults.

use std::sync::Arc;

use chrono::NaiveDate;
use growth_analytics::{DashboardEngine, PeriodType, Reduction, today_at_offset};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Dashboard engine over the configured series source
    pub engine: Arc<DashboardEngine>,
    /// Offset used to resolve "today"
    pub utc_offset_hours: i32,
    /// Period used when a request names none
    pub default_period: PeriodType,
    /// Reduction used when a request names none
    pub default_reduction: Reduction,
}

impl AppState {
    /// Create application state with weekly/sum defaults at UTC+9
    pub fn new(engine: DashboardEngine) -> Self {
        Self::from_arc(Arc::new(engine))
    }

    /// Create application state around a shared engine
    pub fn from_arc(engine: Arc<DashboardEngine>) -> Self {
        Self {
            engine,
            utc_offset_hours: 9,
            default_period: PeriodType::default(),
            default_reduction: Reduction::default(),
        }
    }

    /// Set the offset used to resolve "today"
    pub fn with_utc_offset(mut self, hours: i32) -> Self {
        self.utc_offset_hours = hours;
        self
    }

    /// Set the default period
    pub fn with_default_period(mut self, period: PeriodType) -> Self {
        self.default_period = period;
        self
    }

    /// Set the default reduction
    pub fn with_default_reduction(mut self, reduction: Reduction) -> Self {
        self.default_reduction = reduction;
        self
    }

    /// Current date at the configured offset
    pub fn today(&self) -> NaiveDate {
        today_at_offset(self.utc_offset_hours)
    }

    /// Earliest date a request defaults to
    pub fn history_start(&self) -> NaiveDate {
        self.engine.settings().history_start
    }
}
