//! Growth Analytics
//!
//! Reshapes warehouse time series into the growth dashboard payload.
//!
//! # Overview
//!
//! - **Range filter**: inclusive date ranges and range parsing (`30d`, `mtd`, ...)
//! - **Period aggregator**: daily, weekly (Sunday start) and monthly buckets
//! - **Comparisons**: day, week and month over previous period
//! - **Charts**: row-per-date datasets with axis and tooltip labels
//! - **Funnels**: step and overall conversion rates
//! - **Dashboard**: fetches datasets from a [`SeriesSource`] and assembles every section
//!
//! # Usage
//!
//! ```ignore
//! use growth_analytics::{DashboardEngine, DashboardRequest, DateRange, PeriodType};
//!
//! let engine = DashboardEngine::new(source, DashboardSettings::default());
//! let request = DashboardRequest::new(DateRange::parse("30d", today)?)
//!     .with_period(PeriodType::Weekly);
//!
//! let dashboard = engine.build(&request).await?;
//! ```

pub mod chart;
pub mod comparison;
pub mod dashboard;
pub mod error;
pub mod funnel;
pub mod period;
pub mod range;
pub mod source;
pub mod timeseries;
pub mod traffic;

#[cfg(test)]
mod chart_test;
#[cfg(test)]
mod comparison_test;
#[cfg(test)]
mod dashboard_test;
#[cfg(test)]
mod source_test;
#[cfg(test)]
mod timeseries_test;

// Re-exports for convenience
pub use chart::{ChartDataset, ChartRow};
pub use comparison::{ComparisonEntry, ComparisonLabel, Direction, compare};
pub use dashboard::{
    DEFAULT_MAX_WINDOW_DAYS, Dashboard, DashboardEngine, DashboardRequest, DashboardSettings,
    FunnelSection, GraphSection,
};
pub use error::{AnalyticsError, Result};
pub use funnel::{Funnel, FunnelReport, FunnelStage, FunnelStep, step_rate};
pub use period::{PeriodBucket, PeriodType, Reduction, aggregate, bucket_all};
pub use range::{DateRange, filter_all, filter_range, parse_date, today_at_offset};
pub use source::{
    Dataset, SeriesSet, SeriesSource, WarehouseSource, WarehouseSourceConfig, parse_series_set,
    titles,
};
pub use timeseries::{TimePoint, TimeSeries};
pub use traffic::{TrafficEntry, breakdown};

#[cfg(any(test, feature = "synthetic"))]
pub use source::SyntheticSource;
