//! Period bucketing
//!
//! Groups daily points into daily, weekly (Sunday-start) or monthly buckets and
//! reduces each bucket with a per-call [`Reduction`].

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::timeseries::{TimePoint, TimeSeries};

/// Bucketing granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    /// One bucket per day
    Daily,
    /// Weeks starting on Sunday
    #[default]
    Weekly,
    /// Calendar months
    Monthly,
}

impl PeriodType {
    /// Parse period type from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "1d" | "日次" => Ok(Self::Daily),
            "weekly" | "week" | "1w" | "週次" => Ok(Self::Weekly),
            "monthly" | "month" | "月次" => Ok(Self::Monthly),
            _ => Err(AnalyticsError::InvalidPeriod(s.to_string())),
        }
    }

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Date marking the start of the bucket containing `date`
    pub fn bucket_key(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => date,
            Self::Weekly => {
                date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
            }
            // Day 1 exists in every month
            Self::Monthly => date.with_day(1).unwrap_or(date),
        }
    }

    /// Axis label for a bucket date
    pub fn display_label(&self, date: NaiveDate) -> String {
        match self {
            Self::Daily => format!("{}/{}", date.month(), date.day()),
            Self::Weekly => format!("{}/{}週", date.month(), date.day()),
            Self::Monthly => format!("{}/{}", date.year(), date.month()),
        }
    }

    /// Tooltip label for a bucket date
    pub fn tooltip_label(&self, date: NaiveDate) -> String {
        match self {
            Self::Daily => format!("{}年{}月{}日", date.year(), date.month(), date.day()),
            Self::Weekly => format!("{}年{}月{}日週", date.year(), date.month(), date.day()),
            Self::Monthly => format!("{}年{}月", date.year(), date.month()),
        }
    }
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the values inside one bucket collapse to a single number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    /// Sum of the values
    #[default]
    Sum,
    /// Mean of the values, rounded to the nearest integer
    Average,
}

impl Reduction {
    /// Parse reduction from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sum" | "total" => Ok(Self::Sum),
            "average" | "avg" | "mean" => Ok(Self::Average),
            _ => Err(AnalyticsError::InvalidReduction(s.to_string())),
        }
    }

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Average => "average",
        }
    }

    /// Reduce a non-empty slice of values
    pub fn reduce(&self, values: &[f64]) -> f64 {
        let sum: f64 = values.iter().sum();
        match self {
            Self::Sum => sum,
            Self::Average if values.is_empty() => 0.0,
            Self::Average => (sum / values.len() as f64).round(),
        }
    }
}

/// Aggregated values of several series for one bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBucket {
    /// Bucket start date
    pub period_key: NaiveDate,
    /// Series name to aggregated value; series without points in this bucket are absent
    pub values: BTreeMap<String, f64>,
}

/// Group one series into buckets, ascending by bucket key
fn group(series: &TimeSeries, period: PeriodType) -> BTreeMap<NaiveDate, Vec<f64>> {
    let mut groups: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for point in &series.points {
        groups
            .entry(period.bucket_key(point.date))
            .or_default()
            .push(point.value);
    }
    groups
}

/// Bucket a series by period
///
/// The result is a new series whose dates are bucket keys. Daily is the
/// identity: points are only ordered, never reduced.
pub fn aggregate(series: &TimeSeries, period: PeriodType, reduction: Reduction) -> TimeSeries {
    if period == PeriodType::Daily {
        return series.sorted();
    }

    let points = group(series, period)
        .into_iter()
        .map(|(key, values)| TimePoint::new(key, reduction.reduce(&values)))
        .collect();
    TimeSeries::new(series.title.clone(), points)
}

/// Bucket several series in lockstep
///
/// Every bucket key that at least one series reaches appears once, ascending.
pub fn bucket_all(
    series: &[TimeSeries],
    period: PeriodType,
    reduction: Reduction,
) -> Vec<PeriodBucket> {
    let mut buckets: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();

    for s in series {
        for point in aggregate(s, period, reduction).points {
            buckets
                .entry(point.date)
                .or_default()
                .insert(s.title.clone(), point.value);
        }
    }

    buckets
        .into_iter()
        .map(|(period_key, values)| PeriodBucket { period_key, values })
        .collect()
}
