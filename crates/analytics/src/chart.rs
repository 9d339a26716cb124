//! Chart datasets
//!
//! Turns a set of series into the row-per-date table a chart renderer consumes.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::period::{PeriodBucket, PeriodType};
use crate::timeseries::TimeSeries;

/// One row of a chart dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRow {
    /// Row date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Axis label
    pub display_date: String,
    /// Tooltip label
    pub tooltip_label: String,
    /// One column per series
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl ChartRow {
    /// Value of a series column, 0 when absent
    pub fn value(&self, series: &str) -> f64 {
        self.values.get(series).copied().unwrap_or(0.0)
    }
}

/// A row-per-date table with one column per series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    /// Series names, in input order
    pub series: Vec<String>,
    /// Rows ascending by date
    pub rows: Vec<ChartRow>,
}

impl ChartDataset {
    /// Build a dataset from series
    ///
    /// Rows cover the union of every series' dates. A series with no point on
    /// a row's date contributes 0.
    pub fn build(series: &[TimeSeries], period: PeriodType) -> Self {
        let dates: BTreeSet<NaiveDate> = series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.date))
            .collect();

        let lookups: Vec<(&str, BTreeMap<NaiveDate, f64>)> = series
            .iter()
            .map(|s| {
                let by_date = s.points.iter().map(|p| (p.date, p.value)).collect();
                (s.title.as_str(), by_date)
            })
            .collect();

        let rows = dates
            .into_iter()
            .map(|date| {
                let values = lookups
                    .iter()
                    .map(|(name, by_date)| {
                        (name.to_string(), by_date.get(&date).copied().unwrap_or(0.0))
                    })
                    .collect();
                row(date, period, values)
            })
            .collect();

        Self {
            series: series.iter().map(|s| s.title.clone()).collect(),
            rows,
        }
    }

    /// Build a dataset from aggregated buckets
    ///
    /// `names` fixes the column set; names missing from a bucket read as 0.
    pub fn from_buckets(buckets: &[PeriodBucket], names: &[String], period: PeriodType) -> Self {
        let mut sorted: Vec<&PeriodBucket> = buckets.iter().collect();
        sorted.sort_by_key(|b| b.period_key);

        let rows = sorted
            .into_iter()
            .map(|bucket| {
                let values = names
                    .iter()
                    .map(|name| {
                        (name.clone(), bucket.values.get(name).copied().unwrap_or(0.0))
                    })
                    .collect();
                row(bucket.period_key, period, values)
            })
            .collect();

        Self {
            series: names.to_vec(),
            rows,
        }
    }

    /// Copy restricted to the named series
    ///
    /// Unknown names are ignored; every row is kept.
    pub fn select(&self, names: &[&str]) -> Self {
        let series: Vec<String> = self
            .series
            .iter()
            .filter(|s| names.contains(&s.as_str()))
            .cloned()
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|r| ChartRow {
                values: r
                    .values
                    .iter()
                    .filter(|(k, _)| series.contains(k))
                    .map(|(k, v)| (k.clone(), *v))
                    .collect(),
                ..r.clone()
            })
            .collect();

        Self { series, rows }
    }

    /// Check if the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn row(date: NaiveDate, period: PeriodType, values: BTreeMap<String, f64>) -> ChartRow {
    ChartRow {
        date,
        display_date: period.display_label(date),
        tooltip_label: period.tooltip_label(date),
        values,
    }
}
