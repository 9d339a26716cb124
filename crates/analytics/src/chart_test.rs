//! Tests for chart datasets

use chrono::NaiveDate;

use crate::chart::ChartDataset;
use crate::period::{PeriodType, Reduction, bucket_all};
use crate::timeseries::{TimePoint, TimeSeries};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn series(title: &str, points: &[(NaiveDate, f64)]) -> TimeSeries {
    TimeSeries::new(
        title,
        points.iter().map(|(date, v)| TimePoint::new(*date, *v)).collect(),
    )
}

#[test]
fn test_union_of_dates_zero_filled() {
    let a = series("A", &[(d(2024, 1, 1), 1.0), (d(2024, 1, 3), 3.0)]);
    let b = series("B", &[(d(2024, 1, 2), 20.0), (d(2024, 1, 4), 40.0)]);

    let chart = ChartDataset::build(&[a, b], PeriodType::Daily);
    assert_eq!(chart.rows.len(), 4);
    assert_eq!(chart.series, vec!["A".to_string(), "B".to_string()]);

    let dates: Vec<NaiveDate> = chart.rows.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)]);

    assert_eq!(chart.rows[0].value("A"), 1.0);
    assert_eq!(chart.rows[0].value("B"), 0.0);
    assert_eq!(chart.rows[1].value("A"), 0.0);
    assert_eq!(chart.rows[1].value("B"), 20.0);
    // Every row carries every series column
    assert!(chart.rows.iter().all(|r| r.values.len() == 2));
}

#[test]
fn test_labels_follow_period() {
    let a = series("A", &[(d(2024, 6, 9), 1.0)]);
    let chart = ChartDataset::build(&[a], PeriodType::Weekly);
    assert_eq!(chart.rows[0].display_date, "6/9週");
    assert_eq!(chart.rows[0].tooltip_label, "2024年6月9日週");
}

#[test]
fn test_empty_inputs() {
    let chart = ChartDataset::build(&[], PeriodType::Daily);
    assert!(chart.is_empty());

    let chart = ChartDataset::build(&[TimeSeries::empty("A")], PeriodType::Daily);
    assert!(chart.is_empty());
    assert_eq!(chart.series, vec!["A".to_string()]);
}

#[test]
fn test_from_buckets_matches_build() {
    let a = series("A", &[(d(2024, 6, 10), 1.0), (d(2024, 6, 17), 2.0)]);
    let b = series("B", &[(d(2024, 6, 18), 5.0)]);
    let names = vec!["A".to_string(), "B".to_string()];

    let buckets = bucket_all(&[a.clone(), b.clone()], PeriodType::Weekly, Reduction::Sum);
    let from_buckets = ChartDataset::from_buckets(&buckets, &names, PeriodType::Weekly);

    let aggregated: Vec<TimeSeries> = [a, b]
        .iter()
        .map(|s| crate::period::aggregate(s, PeriodType::Weekly, Reduction::Sum))
        .collect();
    let built = ChartDataset::build(&aggregated, PeriodType::Weekly);

    assert_eq!(from_buckets, built);
    assert_eq!(from_buckets.rows[0].value("B"), 0.0);
}

#[test]
fn test_select_series() {
    let a = series("A", &[(d(2024, 1, 1), 1.0)]);
    let b = series("B", &[(d(2024, 1, 2), 2.0)]);
    let chart = ChartDataset::build(&[a, b], PeriodType::Daily);

    let only_b = chart.select(&["B", "missing"]);
    assert_eq!(only_b.series, vec!["B".to_string()]);
    assert_eq!(only_b.rows.len(), 2);
    assert!(only_b.rows.iter().all(|r| !r.values.contains_key("A")));
}

#[test]
fn test_row_serialization() {
    let a = series("Site visits", &[(d(2024, 1, 5), 7.0)]);
    let chart = ChartDataset::build(&[a], PeriodType::Daily);
    let json = serde_json::to_value(&chart.rows[0]).unwrap();

    assert_eq!(json["date"], "2024-01-05");
    assert_eq!(json["displayDate"], "1/5");
    assert_eq!(json["tooltipLabel"], "2024年1月5日");
    assert_eq!(json["Site visits"], 7.0);
}
