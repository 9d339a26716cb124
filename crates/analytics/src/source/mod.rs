//! Series sources
//!
//! A [`SeriesSource`] answers one [`Dataset`] for one date range with every
//! stage series of that dataset at once.

mod warehouse;

#[cfg(any(test, feature = "synthetic"))]
mod synthetic;

pub use warehouse::{WarehouseSource, WarehouseSourceConfig};

#[cfg(any(test, feature = "synthetic"))]
pub use synthetic::SyntheticSource;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{AnalyticsError, Result};
use crate::range::{DateRange, parse_date};
use crate::timeseries::{TimePoint, TimeSeries};
use growth_warehouse::QueryResult;

/// Series titles shared by sources and dashboard sections
pub mod titles {
    pub const SITE_VISITS: &str = "Site visits";
    pub const MEMBER_PAGE: &str = "Member page";
    pub const REGISTRATIONS: &str = "Registrations";
    pub const PAID_CONVERSIONS: &str = "Paid conversions";
    pub const FIRST_ORDERS: &str = "First orders";

    pub const LINE_REGISTRATIONS: &str = "LINE registrations";
    pub const SHOP_ACCESS: &str = "Shop access";
    pub const ADD_TO_CART: &str = "Add to cart";
    pub const ORDERS: &str = "Orders";
    pub const SECOND_ORDERS: &str = "Second orders";
    pub const THIRD_ORDERS: &str = "Third orders";

    pub const ADS: &str = "Ads";
    pub const SEO: &str = "SEO";
    pub const SNS: &str = "SNS";
    pub const DIRECT: &str = "Direct";
    pub const OTHER: &str = "Other";
}

/// A group of series fetched together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// Public site visits through to first orders
    SiteFunnel,
    /// LINE registrations through to repeat orders
    ShopFunnel,
    /// Site visits split by acquisition channel
    TrafficSources,
}

impl Dataset {
    /// Every dataset
    pub const ALL: [Dataset; 3] = [Self::SiteFunnel, Self::ShopFunnel, Self::TrafficSources];

    /// Name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::SiteFunnel => "site_funnel",
            Self::ShopFunnel => "shop_funnel",
            Self::TrafficSources => "traffic_sources",
        }
    }

    /// Result columns and the series title each one feeds, in stage order
    pub fn columns(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::SiteFunnel => &[
                ("unique_users_3", titles::SITE_VISITS),
                ("unique_users_2", titles::MEMBER_PAGE),
                ("sub", titles::REGISTRATIONS),
                ("conv", titles::PAID_CONVERSIONS),
                ("fst", titles::FIRST_ORDERS),
            ],
            Self::ShopFunnel => &[
                ("newUsersNum", titles::LINE_REGISTRATIONS),
                ("productUniqueUsers", titles::SHOP_ACCESS),
                ("cartUniqueUsers", titles::ADD_TO_CART),
                ("orderUniqueUsers", titles::ORDERS),
                ("repeat2Plus", titles::SECOND_ORDERS),
                ("repeat3Plus", titles::THIRD_ORDERS),
            ],
            Self::TrafficSources => &[
                ("ads", titles::ADS),
                ("seo", titles::SEO),
                ("sns", titles::SNS),
                ("direct", titles::DIRECT),
                ("other", titles::OTHER),
            ],
        }
    }

    /// Series titles in stage order
    pub fn titles(&self) -> Vec<&'static str> {
        self.columns().iter().map(|(_, title)| *title).collect()
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Every series of one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSet {
    pub dataset: Dataset,
    pub series: Vec<TimeSeries>,
}

impl SeriesSet {
    /// Create a set
    pub fn new(dataset: Dataset, series: Vec<TimeSeries>) -> Self {
        Self { dataset, series }
    }

    /// Series by title
    pub fn get(&self, title: &str) -> Option<&TimeSeries> {
        self.series.iter().find(|s| s.title == title)
    }

    /// Series by title, empty when the set lacks it
    pub fn series_or_empty(&self, title: &str) -> TimeSeries {
        self.get(title)
            .cloned()
            .unwrap_or_else(|| TimeSeries::empty(title))
    }

    /// Apply a transform to every series
    pub fn map(self, f: impl Fn(&TimeSeries) -> TimeSeries) -> Self {
        Self {
            dataset: self.dataset,
            series: self.series.iter().map(f).collect(),
        }
    }
}

/// Anything that can produce dataset series for a date range
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Fetch every series of `dataset` covering `range`
    async fn fetch(&self, dataset: Dataset, range: &DateRange) -> Result<SeriesSet>;

    /// Check the source is reachable
    async fn health_check(&self) -> Result<()>;

    /// Source name for logging/identification
    fn name(&self) -> &'static str;

    /// True when the source produces placeholder data
    fn is_synthetic(&self) -> bool {
        false
    }
}

/// Turn a date-keyed query result into one series per dataset column
///
/// A row with an unusable date is skipped entirely; an unusable value drops
/// only that point. Both are logged. A result with no rows is an error.
pub fn parse_series_set(dataset: Dataset, result: &QueryResult) -> Result<SeriesSet> {
    if result.is_empty() {
        return Err(AnalyticsError::EmptyResult {
            dataset: dataset.name().to_string(),
        });
    }

    let date_idx = result
        .column_index("date")
        .ok_or_else(|| AnalyticsError::Source(format!("{}: result has no date column", dataset)))?;

    let value_cols = dataset
        .columns()
        .iter()
        .map(|(column, title)| {
            result
                .column_index(column)
                .map(|idx| (idx, *title))
                .ok_or_else(|| {
                    AnalyticsError::Source(format!("{}: result has no {} column", dataset, column))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut points: Vec<Vec<TimePoint>> = vec![Vec::with_capacity(result.row_count); value_cols.len()];

    for (row_idx, row) in result.rows.iter().enumerate() {
        let date = match row.get(date_idx).map(cell_date) {
            Some(Ok(date)) => date,
            Some(Err(reason)) => {
                skip(AnalyticsError::malformed(dataset.name(), row_idx, reason));
                continue;
            }
            None => {
                skip(AnalyticsError::malformed(dataset.name(), row_idx, "missing date"));
                continue;
            }
        };

        for (series_idx, (col_idx, title)) in value_cols.iter().enumerate() {
            match row.get(*col_idx).map(cell_value) {
                Some(Ok(value)) => points[series_idx].push(TimePoint::new(date, value)),
                Some(Err(reason)) => skip(AnalyticsError::malformed(
                    dataset.name(),
                    row_idx,
                    format!("{}: {}", title, reason),
                )),
                None => skip(AnalyticsError::malformed(
                    dataset.name(),
                    row_idx,
                    format!("{}: missing value", title),
                )),
            }
        }
    }

    let series = value_cols
        .iter()
        .zip(points)
        .map(|((_, title), points)| TimeSeries::new(*title, points))
        .collect();

    Ok(SeriesSet::new(dataset, series))
}

fn skip(err: AnalyticsError) {
    tracing::warn!(error = %err, "skipping malformed row");
}

fn cell_date(value: &Value) -> std::result::Result<NaiveDate, String> {
    match value {
        Value::String(s) => parse_date(s).map_err(|e| e.to_string()),
        // Some clients wrap dates as {"value": "YYYY-MM-DD"}
        Value::Object(map) => match map.get("value") {
            Some(Value::String(s)) => parse_date(s).map_err(|e| e.to_string()),
            _ => Err("date object without value".to_string()),
        },
        other => Err(format!("not a date: {}", other)),
    }
}

fn cell_value(value: &Value) -> std::result::Result<f64, String> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(format!("not a number: {}", value)),
    }
}
