//! Period-over-period comparisons
//!
//! Every comparison reads a gapless, ascending daily series where the last
//! point is the most recent day. Use [`TimeSeries::densify`] to get one.

use serde::{Deserialize, Serialize};

use crate::timeseries::TimeSeries;

/// Which window pair a comparison covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonLabel {
    #[serde(rename = "day-over-day")]
    DayOverDay,
    #[serde(rename = "week-over-week")]
    WeekOverWeek,
    #[serde(rename = "month-over-month")]
    MonthOverMonth,
}

impl ComparisonLabel {
    /// All labels in reporting order
    pub const ALL: [ComparisonLabel; 3] = [Self::DayOverDay, Self::WeekOverWeek, Self::MonthOverMonth];

    /// Window length in days
    pub fn window_days(&self) -> usize {
        match self {
            Self::DayOverDay => 1,
            Self::WeekOverWeek => 7,
            Self::MonthOverMonth => 30,
        }
    }
}

/// Sign of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

/// One comparison result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub label: ComparisonLabel,
    /// Magnitude of the change in percent, one decimal place
    pub percent: f64,
    pub direction: Direction,
}

impl ComparisonEntry {
    /// A zero change
    pub fn flat(label: ComparisonLabel) -> Self {
        Self {
            label,
            percent: 0.0,
            direction: Direction::Flat,
        }
    }

    /// Entry for a change from `previous` to `current`
    ///
    /// A zero `previous` has no meaningful ratio and reports flat.
    pub fn from_totals(label: ComparisonLabel, current: f64, previous: f64) -> Self {
        if previous == 0.0 {
            return Self::flat(label);
        }

        let signed = round_one_decimal((current - previous) / previous * 100.0);
        let direction = if signed > 0.0 {
            Direction::Up
        } else if signed < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        };

        Self {
            label,
            // abs() also turns -0.0 into 0.0
            percent: signed.abs(),
            direction,
        }
    }
}

/// Day, week and month comparisons for a daily series, in that order
pub fn compare(series: &TimeSeries) -> [ComparisonEntry; 3] {
    let values: Vec<f64> = series.points.iter().map(|p| p.value).collect();
    ComparisonLabel::ALL.map(|label| compare_window(&values, label))
}

fn compare_window(values: &[f64], label: ComparisonLabel) -> ComparisonEntry {
    let days = label.window_days();
    let current = window_total(values, 0, days);
    let previous = window_total(values, days, days);
    ComparisonEntry::from_totals(label, current, previous)
}

/// Sum of `len` values ending `skip` values before the last one
///
/// Returns 0 when the series is too short to fill the whole window.
fn window_total(values: &[f64], skip: usize, len: usize) -> f64 {
    let Some(end) = values.len().checked_sub(skip) else {
        return 0.0;
    };
    let Some(start) = end.checked_sub(len) else {
        return 0.0;
    };
    values[start..end].iter().sum()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
