//! Tests for period-over-period comparisons

use chrono::{Duration, NaiveDate};

use crate::comparison::{ComparisonEntry, ComparisonLabel, Direction, compare};
use crate::timeseries::{TimePoint, TimeSeries};

/// Consecutive daily series ending 2024-06-30
fn daily(values: &[f64]) -> TimeSeries {
    let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let start = end - Duration::days(values.len() as i64 - 1);
    let points = values
        .iter()
        .enumerate()
        .map(|(i, v)| TimePoint::new(start + Duration::days(i as i64), *v))
        .collect();
    TimeSeries::new("x", points)
}

#[test]
fn test_day_over_day_up() {
    let [day, _, _] = compare(&daily(&[100.0, 110.0]));
    assert_eq!(day.label, ComparisonLabel::DayOverDay);
    assert_eq!(day.percent, 10.0);
    assert_eq!(day.direction, Direction::Up);
}

#[test]
fn test_day_over_day_down() {
    let [day, _, _] = compare(&daily(&[100.0, 90.0]));
    assert_eq!(day.percent, 10.0);
    assert_eq!(day.direction, Direction::Down);
}

#[test]
fn test_short_series_is_flat() {
    for entry in compare(&daily(&[5.0])) {
        assert_eq!(entry.percent, 0.0);
        assert_eq!(entry.direction, Direction::Flat);
    }

    for entry in compare(&TimeSeries::empty("x")) {
        assert_eq!(entry.direction, Direction::Flat);
    }
}

#[test]
fn test_zero_previous_is_flat() {
    let [day, _, _] = compare(&daily(&[0.0, 50.0]));
    assert_eq!(day.percent, 0.0);
    assert_eq!(day.direction, Direction::Flat);
}

#[test]
fn test_order_is_day_week_month() {
    let labels: Vec<ComparisonLabel> = compare(&daily(&[1.0; 60])).iter().map(|e| e.label).collect();
    assert_eq!(
        labels,
        vec![
            ComparisonLabel::DayOverDay,
            ComparisonLabel::WeekOverWeek,
            ComparisonLabel::MonthOverMonth,
        ]
    );
}

#[test]
fn test_week_over_week_windows() {
    // Offsets 8-14 are 10 each, offsets 1-7 are 12 each
    let mut values = vec![10.0; 7];
    values.extend(vec![12.0; 7]);
    let [_, week, month] = compare(&daily(&values));

    assert_eq!(week.percent, 20.0);
    assert_eq!(week.direction, Direction::Up);
    // Fewer than 60 days of history
    assert_eq!(month.direction, Direction::Flat);
}

#[test]
fn test_week_needs_full_previous_window() {
    let [_, week, _] = compare(&daily(&[10.0; 13]));
    assert_eq!(week.percent, 0.0);
    assert_eq!(week.direction, Direction::Flat);
}

#[test]
fn test_month_over_month_down() {
    let mut values = vec![20.0; 30];
    values.extend(vec![15.0; 30]);
    let [_, _, month] = compare(&daily(&values));
    assert_eq!(month.percent, 25.0);
    assert_eq!(month.direction, Direction::Down);
}

#[test]
fn test_only_trailing_windows_count() {
    // Older history before the previous window is ignored
    let mut values = vec![1000.0; 10];
    values.extend([100.0, 110.0]);
    let [day, _, _] = compare(&daily(&values));
    assert_eq!(day.percent, 10.0);
}

#[test]
fn test_percent_rounds_to_one_decimal() {
    let entry = ComparisonEntry::from_totals(ComparisonLabel::DayOverDay, 4.0, 3.0);
    assert_eq!(entry.percent, 33.3);

    let entry = ComparisonEntry::from_totals(ComparisonLabel::DayOverDay, 2.0, 3.0);
    assert_eq!(entry.percent, 33.3);
    assert_eq!(entry.direction, Direction::Down);
}

#[test]
fn test_tiny_change_rounds_to_flat() {
    let entry = ComparisonEntry::from_totals(ComparisonLabel::WeekOverWeek, 100_001.0, 100_000.0);
    assert_eq!(entry.percent, 0.0);
    assert_eq!(entry.direction, Direction::Flat);
}

#[test]
fn test_comparison_serialization() {
    let entry = ComparisonEntry::from_totals(ComparisonLabel::MonthOverMonth, 110.0, 100.0);
    let json = serde_json::to_value(entry).unwrap();
    assert_eq!(json["label"], "month-over-month");
    assert_eq!(json["percent"], 10.0);
    assert_eq!(json["direction"], "up");
}

#[test]
fn test_label_wire_names() {
    let labels = [
        ComparisonLabel::DayOverDay,
        ComparisonLabel::WeekOverWeek,
        ComparisonLabel::MonthOverMonth,
    ];
    let json = serde_json::to_value(labels).unwrap();
    assert_eq!(
        json,
        serde_json::json!(["day-over-day", "week-over-week", "month-over-month"])
    );
}
