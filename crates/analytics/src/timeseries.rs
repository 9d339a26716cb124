//! Time series data types
//!
//! A [`TimeSeries`] is the unit exchanged between the fetch layer and every
//! transform. Transforms never mutate a series in place; each returns a new one.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::range::DateRange;

/// A single dated value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// Calendar date (serialized as `YYYY-MM-DD`)
    pub date: NaiveDate,
    /// The value for that date
    pub value: f64,
}

impl TimePoint {
    /// Create a new point
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A named sequence of dated values
///
/// Dates are unique within a series but producers need not sort them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Series name, used as the column name in chart datasets
    pub title: String,
    /// Data points
    #[serde(rename = "data")]
    pub points: Vec<TimePoint>,
}

impl TimeSeries {
    /// Create a series from points
    pub fn new(title: impl Into<String>, points: Vec<TimePoint>) -> Self {
        Self {
            title: title.into(),
            points,
        }
    }

    /// Create an empty series
    pub fn empty(title: impl Into<String>) -> Self {
        Self::new(title, Vec::new())
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Sum of all values
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Value recorded for a date, if any
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.points.iter().find(|p| p.date == date).map(|p| p.value)
    }

    /// Copy of this series ordered by date
    pub fn sorted(&self) -> Self {
        let mut points = self.points.clone();
        points.sort_by_key(|p| p.date);
        Self::new(self.title.clone(), points)
    }

    /// Copy of this series with every value raised to at least `floor`
    ///
    /// Used for rate-like metrics where the warehouse can report values below
    /// a meaningful minimum.
    pub fn clamp_floor(&self, floor: f64) -> Self {
        let points = self
            .points
            .iter()
            .map(|p| TimePoint::new(p.date, p.value.max(floor)))
            .collect();
        Self::new(self.title.clone(), points)
    }

    /// One point per day of `range`, ascending, zero where the series has no value
    ///
    /// Points outside the range are dropped. An empty range yields an empty series.
    pub fn densify(&self, range: &DateRange) -> Self {
        let by_date: HashMap<NaiveDate, f64> =
            self.points.iter().map(|p| (p.date, p.value)).collect();

        let points = range
            .iter_days()
            .map(|date| TimePoint::new(date, by_date.get(&date).copied().unwrap_or(0.0)))
            .collect();
        Self::new(self.title.clone(), points)
    }
}
