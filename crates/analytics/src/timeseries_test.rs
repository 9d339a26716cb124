//! Tests for time series types

use chrono::NaiveDate;

use crate::range::DateRange;
use crate::timeseries::{TimePoint, TimeSeries};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn test_series_basics() {
    let series = TimeSeries::new(
        "Site visits",
        vec![
            TimePoint::new(d(2024, 1, 2), 20.0),
            TimePoint::new(d(2024, 1, 1), 10.0),
        ],
    );

    assert_eq!(series.len(), 2);
    assert!(!series.is_empty());
    assert_eq!(series.total(), 30.0);
    assert_eq!(series.value_on(d(2024, 1, 1)), Some(10.0));
    assert_eq!(series.value_on(d(2024, 1, 3)), None);

    let sorted = series.sorted();
    assert_eq!(sorted.points[0].date, d(2024, 1, 1));
    // Original untouched
    assert_eq!(series.points[0].date, d(2024, 1, 2));
}

#[test]
fn test_densify_fills_gaps() {
    let series = TimeSeries::new(
        "x",
        vec![
            TimePoint::new(d(2024, 1, 3), 3.0),
            TimePoint::new(d(2024, 1, 1), 1.0),
            // Outside the range
            TimePoint::new(d(2024, 2, 1), 99.0),
        ],
    );

    let dense = series.densify(&DateRange::new(d(2024, 1, 1), d(2024, 1, 4)));
    let values: Vec<f64> = dense.points.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1.0, 0.0, 3.0, 0.0]);
    assert_eq!(dense.points[3].date, d(2024, 1, 4));
}

#[test]
fn test_densify_empty_range() {
    let series = TimeSeries::new("x", vec![TimePoint::new(d(2024, 1, 1), 1.0)]);
    let dense = series.densify(&DateRange::new(d(2024, 1, 2), d(2024, 1, 1)));
    assert!(dense.is_empty());
}

#[test]
fn test_clamp_floor() {
    let series = TimeSeries::new(
        "Churn rate",
        vec![
            TimePoint::new(d(2024, 1, 1), 0.0),
            TimePoint::new(d(2024, 1, 2), 3.0),
        ],
    );
    let clamped = series.clamp_floor(1.0);
    assert_eq!(clamped.points[0].value, 1.0);
    assert_eq!(clamped.points[1].value, 3.0);
}

#[test]
fn test_serialization_shape() {
    let series = TimeSeries::new("A", vec![TimePoint::new(d(2024, 1, 1), 5.0)]);
    let json = serde_json::to_value(&series).unwrap();

    assert_eq!(json["title"], "A");
    assert_eq!(json["data"][0]["date"], "2024-01-01");
    assert_eq!(json["data"][0]["value"], 5.0);

    let back: TimeSeries = serde_json::from_value(json).unwrap();
    assert_eq!(back, series);
}
