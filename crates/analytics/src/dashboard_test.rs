//! Tests for dashboard assembly

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::comparison::Direction;
use crate::dashboard::{
    DashboardEngine, DashboardRequest, DashboardSettings, FUNNEL_TREND_SECTION,
    SHOP_FUNNEL_SECTION, SITE_FUNNEL_SECTION, SITE_VISITS_SECTION,
};
use crate::error::{AnalyticsError, Result};
use crate::period::{PeriodType, Reduction};
use crate::range::DateRange;
use crate::source::{Dataset, SeriesSet, SeriesSource, SyntheticSource, titles};
use crate::timeseries::{TimePoint, TimeSeries};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Source returning fixed points and recording every requested window
struct FixedSource {
    points: BTreeMap<&'static str, Vec<(NaiveDate, f64)>>,
    requests: Mutex<Vec<(Dataset, DateRange)>>,
    fail: bool,
}

impl FixedSource {
    fn new() -> Self {
        Self {
            points: BTreeMap::new(),
            requests: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn with(mut self, title: &'static str, points: &[(NaiveDate, f64)]) -> Self {
        self.points.insert(title, points.to_vec());
        self
    }
}

#[async_trait]
impl SeriesSource for FixedSource {
    async fn fetch(&self, dataset: Dataset, range: &DateRange) -> Result<SeriesSet> {
        self.requests.lock().unwrap().push((dataset, *range));
        if self.fail {
            return Err(AnalyticsError::EmptyResult {
                dataset: dataset.name().to_string(),
            });
        }

        let series = dataset
            .titles()
            .into_iter()
            .map(|title| {
                let points = self
                    .points
                    .get(title)
                    .map(|pts| {
                        pts.iter()
                            .filter(|(date, _)| range.contains(*date))
                            .map(|(date, v)| TimePoint::new(*date, *v))
                            .collect()
                    })
                    .unwrap_or_default();
                TimeSeries::new(title, points)
            })
            .collect();
        Ok(SeriesSet::new(dataset, series))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn settings() -> DashboardSettings {
    DashboardSettings {
        history_start: d(2024, 1, 1),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fetches_each_dataset_over_history() {
    let source = Arc::new(FixedSource::new());
    let engine = DashboardEngine::new(source.clone(), settings());

    let request = DashboardRequest::new(DateRange::new(d(2024, 6, 1), d(2024, 6, 30)));
    engine.build(&request).await.unwrap();

    let requests = source.requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    for dataset in Dataset::ALL {
        assert!(requests.iter().any(|(ds, _)| *ds == dataset));
    }
    assert!(
        requests
            .iter()
            .all(|(_, r)| *r == DateRange::new(d(2024, 1, 1), d(2024, 6, 30)))
    );
}

#[tokio::test]
async fn test_sections_layout() {
    let source = Arc::new(FixedSource::new());
    let engine = DashboardEngine::new(source, settings());
    let request = DashboardRequest::new(DateRange::new(d(2024, 6, 1), d(2024, 6, 30)));

    let dashboard = engine.build(&request).await.unwrap();

    let graphs: Vec<&str> = dashboard.graph_sections.iter().map(|g| g.title.as_str()).collect();
    assert_eq!(graphs, vec![SITE_VISITS_SECTION, FUNNEL_TREND_SECTION]);
    assert_eq!(dashboard.graph_sections[0].comparisons.len(), 3);
    assert!(dashboard.graph_sections[1].comparisons.is_empty());
    assert_eq!(dashboard.graph_sections[1].chart.series.len(), 4);

    let funnels: Vec<&str> = dashboard.funnel_sections.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(funnels, vec![SITE_FUNNEL_SECTION, SHOP_FUNNEL_SECTION]);
    assert_eq!(dashboard.funnel_sections[0].report.stages.len(), 5);
    assert_eq!(dashboard.funnel_sections[1].report.stages.len(), 6);

    assert_eq!(dashboard.traffic_breakdown.len(), 5);
    assert!(dashboard.traffic_breakdown.iter().all(|t| t.share == 0.0));
    assert!(!dashboard.synthetic);
}

#[tokio::test]
async fn test_weekly_chart_is_bucketed_and_zero_filled() {
    // Wed 6/12 and Thu 6/13 in the week of 6/9; nothing in the week of 6/16
    let source = Arc::new(FixedSource::new().with(
        titles::SITE_VISITS,
        &[(d(2024, 6, 12), 10.0), (d(2024, 6, 13), 20.0), (d(2024, 6, 24), 5.0)],
    ));
    let engine = DashboardEngine::new(source, settings());
    let request = DashboardRequest::new(DateRange::new(d(2024, 6, 9), d(2024, 6, 29)))
        .with_period(PeriodType::Weekly)
        .with_reduction(Reduction::Sum);

    let dashboard = engine.build(&request).await.unwrap();
    let chart = &dashboard.graph_sections[0].chart;

    let keys: Vec<NaiveDate> = chart.rows.iter().map(|r| r.date).collect();
    assert_eq!(keys, vec![d(2024, 6, 9), d(2024, 6, 16), d(2024, 6, 23)]);

    assert_eq!(chart.rows[0].value(titles::SITE_VISITS), 30.0);
    assert_eq!(chart.rows[1].value(titles::SITE_VISITS), 0.0);
    assert_eq!(chart.rows[2].value(titles::SITE_VISITS), 5.0);
    assert_eq!(chart.rows[0].display_date, "6/9週");
}

#[tokio::test]
async fn test_weekly_average_counts_zero_days() {
    let source = Arc::new(
        FixedSource::new().with(titles::SITE_VISITS, &[(d(2024, 6, 12), 70.0)]),
    );
    let engine = DashboardEngine::new(source, settings());
    let request = DashboardRequest::new(DateRange::new(d(2024, 6, 9), d(2024, 6, 15)))
        .with_reduction(Reduction::Average);

    let dashboard = engine.build(&request).await.unwrap();
    let chart = &dashboard.graph_sections[0].chart;
    assert_eq!(chart.rows.len(), 1);
    assert_eq!(chart.rows[0].value(titles::SITE_VISITS), 10.0);
}

#[tokio::test]
async fn test_comparisons_use_history_before_range() {
    // Displayed range is one day; the day before it lies outside the range
    let source = Arc::new(FixedSource::new().with(
        titles::SITE_VISITS,
        &[(d(2024, 6, 29), 100.0), (d(2024, 6, 30), 110.0)],
    ));
    let engine = DashboardEngine::new(source, settings());
    let request = DashboardRequest::new(DateRange::new(d(2024, 6, 30), d(2024, 6, 30)));

    let dashboard = engine.build(&request).await.unwrap();
    let day = dashboard.graph_sections[0].comparisons[0];
    assert_eq!(day.percent, 10.0);
    assert_eq!(day.direction, Direction::Up);
}

#[tokio::test]
async fn test_funnel_totals_and_override() {
    let source = Arc::new(
        FixedSource::new()
            .with(titles::SITE_VISITS, &[(d(2024, 6, 1), 1000.0), (d(2024, 5, 1), 9999.0)])
            .with(titles::MEMBER_PAGE, &[(d(2024, 6, 1), 600.0)])
            .with(titles::FIRST_ORDERS, &[(d(2024, 6, 2), 10.0)])
            .with(titles::LINE_REGISTRATIONS, &[(d(2024, 6, 1), 0.0)]),
    );
    let engine = DashboardEngine::new(
        source,
        DashboardSettings {
            shop_funnel_override: Some(10.5),
            ..settings()
        },
    );
    let request = DashboardRequest::new(DateRange::new(d(2024, 6, 1), d(2024, 6, 30)));

    let dashboard = engine.build(&request).await.unwrap();

    let site = &dashboard.funnel_sections[0].report;
    assert_eq!(site.stages[0].value, 1000.0);
    assert_eq!(site.steps[0].rate, 60.0);
    assert_eq!(site.overall_rate, 1.0);
    assert!(site.stages[0].comparisons.is_some());

    let shop = &dashboard.funnel_sections[1].report;
    assert_eq!(shop.overall_rate, 10.5);
}

#[tokio::test]
async fn test_traffic_shares() {
    let source = Arc::new(
        FixedSource::new()
            .with(titles::ADS, &[(d(2024, 6, 1), 30.0)])
            .with(titles::SEO, &[(d(2024, 6, 2), 10.0)]),
    );
    let engine = DashboardEngine::new(source, settings());
    let request = DashboardRequest::new(DateRange::new(d(2024, 6, 1), d(2024, 6, 30)));

    let dashboard = engine.build(&request).await.unwrap();
    let traffic = &dashboard.traffic_breakdown;

    let titles_out: Vec<&str> = traffic.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles_out, Dataset::TrafficSources.titles());
    assert_eq!(traffic[0].count, 30.0);
    assert_eq!(traffic[0].share, 75.0);
    assert_eq!(traffic[1].share, 25.0);
    assert_eq!(traffic[2].share, 0.0);
}

#[tokio::test]
async fn test_floors_apply_before_aggregation() {
    let source = Arc::new(FixedSource::new());
    let mut floors = BTreeMap::new();
    floors.insert(titles::SITE_VISITS.to_string(), 1.0);
    let engine = DashboardEngine::new(
        source,
        DashboardSettings {
            floors,
            ..settings()
        },
    );
    let request = DashboardRequest::new(DateRange::new(d(2024, 6, 9), d(2024, 6, 15)));

    let dashboard = engine.build(&request).await.unwrap();
    let chart = &dashboard.graph_sections[0].chart;
    assert_eq!(chart.rows[0].value(titles::SITE_VISITS), 7.0);
}

#[tokio::test]
async fn test_reversed_range_is_empty_not_error() {
    let source = Arc::new(FixedSource::new());
    let engine = DashboardEngine::new(source, settings());
    let request = DashboardRequest::new(DateRange::new(d(2024, 6, 30), d(2024, 6, 1)));

    let dashboard = engine.build(&request).await.unwrap();
    assert!(dashboard.graph_sections[0].chart.is_empty());
    assert_eq!(dashboard.funnel_sections[0].report.stages[0].value, 0.0);
}

#[tokio::test]
async fn test_oversized_window_rejected_before_fetch() {
    let source = Arc::new(FixedSource::new());
    let engine = DashboardEngine::new(source.clone(), settings());
    let request = DashboardRequest::new(DateRange::new(d(1, 1, 1), d(9999, 12, 31)));

    let err = engine.build(&request).await.unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidDateRange(_)));
    assert!(source.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_window_limit_counts_history() {
    let engine = DashboardEngine::new(
        Arc::new(FixedSource::new()),
        DashboardSettings {
            max_window_days: 200,
            ..settings()
        },
    );

    // 30 displayed days, but the window reaches back to 2024-01-01
    let request = DashboardRequest::new(DateRange::new(d(2024, 9, 1), d(2024, 9, 30)));
    assert!(engine.build(&request).await.is_err());

    let request = DashboardRequest::new(DateRange::new(d(2024, 6, 1), d(2024, 6, 30)));
    assert!(engine.build(&request).await.is_ok());
}

#[tokio::test]
async fn test_fetch_error_propagates() {
    let mut fixed = FixedSource::new();
    fixed.fail = true;
    let engine = DashboardEngine::new(Arc::new(fixed), settings());
    let request = DashboardRequest::new(DateRange::new(d(2024, 6, 1), d(2024, 6, 30)));

    let err = engine.build(&request).await.unwrap_err();
    assert!(matches!(err, AnalyticsError::EmptyResult { .. }));
}

#[tokio::test]
async fn test_synthetic_payload_is_flagged() {
    let engine = DashboardEngine::new(Arc::new(SyntheticSource::new(42)), settings());
    let request = DashboardRequest::new(DateRange::new(d(2024, 6, 1), d(2024, 6, 30)));

    let dashboard = engine.build(&request).await.unwrap();
    assert!(dashboard.synthetic);

    let json = serde_json::to_value(&dashboard).unwrap();
    assert_eq!(json["synthetic"], true);
    assert!(json["graphSections"].is_array());
    assert!(json["trafficBreakdown"].is_array());
    assert!(json["funnelSections"][0]["overallRate"].is_number());
    assert_eq!(json["period"], "weekly");
}
