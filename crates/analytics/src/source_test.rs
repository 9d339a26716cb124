//! Tests for query result parsing

use serde_json::json;

use crate::error::AnalyticsError;
use crate::source::{Dataset, parse_series_set, titles};
use growth_warehouse::{Column, DataType, QueryResult};

fn site_columns() -> Vec<Column> {
    std::iter::once(Column::new("date", DataType::Date, false))
        .chain(
            Dataset::SiteFunnel
                .columns()
                .iter()
                .map(|(name, _)| Column::new(*name, DataType::Int64, false)),
        )
        .collect()
}

#[test]
fn test_parse_site_funnel() {
    let result = QueryResult::new(
        site_columns(),
        vec![
            vec![json!("2024-06-01"), json!(100), json!(60), json!(18), json!(3), json!(2)],
            vec![json!("2024-06-02"), json!(200), json!(120), json!(36), json!(5), json!(4)],
        ],
        3,
    );

    let set = parse_series_set(Dataset::SiteFunnel, &result).unwrap();
    assert_eq!(set.dataset, Dataset::SiteFunnel);

    let names: Vec<&str> = set.series.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(names, Dataset::SiteFunnel.titles());

    assert_eq!(set.get(titles::SITE_VISITS).unwrap().total(), 300.0);
    assert_eq!(set.get(titles::FIRST_ORDERS).unwrap().total(), 6.0);
}

#[test]
fn test_numeric_strings_and_wrapped_dates() {
    let result = QueryResult::new(
        site_columns(),
        vec![vec![
            json!({"value": "2024-06-01"}),
            json!("100"),
            json!(60.0),
            json!("18"),
            json!(3),
            json!(2),
        ]],
        1,
    );

    let set = parse_series_set(Dataset::SiteFunnel, &result).unwrap();
    assert_eq!(set.get(titles::SITE_VISITS).unwrap().total(), 100.0);
    assert_eq!(set.get(titles::REGISTRATIONS).unwrap().total(), 18.0);
}

#[test]
fn test_malformed_rows_are_skipped() {
    let result = QueryResult::new(
        site_columns(),
        vec![
            vec![json!("not a date"), json!(1), json!(1), json!(1), json!(1), json!(1)],
            vec![json!("2024-06-02"), json!("abc"), json!(2), json!(2), json!(2), json!(2)],
            vec![json!("2024-06-03"), json!(3), json!(3), json!(3), json!(3)],
            vec![json!("2024-06-04"), json!(4), json!(4), json!(4), json!(4), json!(4)],
        ],
        1,
    );

    let set = parse_series_set(Dataset::SiteFunnel, &result).unwrap();

    // Row 0 dropped entirely; row 1 only loses its site visits point; row 2 loses its last column
    let visits = set.get(titles::SITE_VISITS).unwrap();
    assert_eq!(visits.len(), 2);
    assert_eq!(visits.total(), 7.0);

    let member = set.get(titles::MEMBER_PAGE).unwrap();
    assert_eq!(member.len(), 3);

    let first_orders = set.get(titles::FIRST_ORDERS).unwrap();
    assert_eq!(first_orders.len(), 2);
}

#[test]
fn test_empty_result() {
    let result = QueryResult::new(site_columns(), Vec::new(), 1);
    let err = parse_series_set(Dataset::SiteFunnel, &result).unwrap_err();
    assert!(matches!(err, AnalyticsError::EmptyResult { ref dataset } if dataset == "site_funnel"));
}

#[test]
fn test_missing_column() {
    let result = QueryResult::new(
        vec![
            Column::new("date", DataType::Date, false),
            Column::new("ads", DataType::Int64, false),
        ],
        vec![vec![json!("2024-06-01"), json!(1)]],
        1,
    );
    let err = parse_series_set(Dataset::TrafficSources, &result).unwrap_err();
    assert!(err.to_string().contains("seo"));
}

#[test]
fn test_series_or_empty() {
    let result = QueryResult::new(
        site_columns(),
        vec![vec![json!("2024-06-01"), json!(1), json!(1), json!(1), json!(1), json!(1)]],
        1,
    );
    let set = parse_series_set(Dataset::SiteFunnel, &result).unwrap();
    let missing = set.series_or_empty(titles::ADS);
    assert!(missing.is_empty());
    assert_eq!(missing.title, titles::ADS);
}
