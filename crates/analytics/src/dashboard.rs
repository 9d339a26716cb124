//! Dashboard assembly
//!
//! Fetches every dataset once over the comparison history, then derives the
//! chart, traffic and funnel sections from those series.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;

use crate::chart::ChartDataset;
use crate::comparison::{ComparisonEntry, compare};
use crate::error::{AnalyticsError, Result};
use crate::funnel::{Funnel, FunnelReport, FunnelStage};
use crate::period::{PeriodType, Reduction, bucket_all};
use crate::range::{DateRange, filter_all, filter_range};
use crate::source::{Dataset, SeriesSet, SeriesSource, titles};
use crate::timeseries::TimeSeries;
use crate::traffic::{TrafficEntry, breakdown};

/// Section titles
pub const SITE_VISITS_SECTION: &str = "Site visits";
pub const FUNNEL_TREND_SECTION: &str = "Funnel trend";
pub const SITE_FUNNEL_SECTION: &str = "Site funnel";
pub const SHOP_FUNNEL_SECTION: &str = "Shop funnel";

/// Stages charted in the funnel trend section
const FUNNEL_TREND_SERIES: [&str; 4] = [
    titles::MEMBER_PAGE,
    titles::REGISTRATIONS,
    titles::PAID_CONVERSIONS,
    titles::FIRST_ORDERS,
];

/// Longest fetch window served, about ten years
pub const DEFAULT_MAX_WINDOW_DAYS: i64 = 3660;

/// Settings that shape every dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    /// Earliest date comparisons may look back to
    pub history_start: NaiveDate,
    /// Overall conversion reported for the site funnel instead of the computed one
    pub site_funnel_override: Option<f64>,
    /// Overall conversion reported for the shop funnel instead of the computed one
    pub shop_funnel_override: Option<f64>,
    /// Minimum value per series title
    pub floors: BTreeMap<String, f64>,
    /// Fetch windows longer than this are rejected
    pub max_window_days: i64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            history_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            site_funnel_override: None,
            shop_funnel_override: None,
            floors: BTreeMap::new(),
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
        }
    }
}

/// One dashboard request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardRequest {
    /// Displayed date range
    pub range: DateRange,
    pub period: PeriodType,
    pub reduction: Reduction,
}

impl DashboardRequest {
    /// Request with default period and reduction
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            period: PeriodType::default(),
            reduction: Reduction::default(),
        }
    }

    /// Set the bucketing period
    pub fn with_period(mut self, period: PeriodType) -> Self {
        self.period = period;
        self
    }

    /// Set the bucket reduction
    pub fn with_reduction(mut self, reduction: Reduction) -> Self {
        self.reduction = reduction;
        self
    }
}

/// A chart section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSection {
    pub title: String,
    /// Layout width, 6 or 12 columns
    pub cols: u8,
    pub chart: ChartDataset,
    /// Empty when the section shows no comparisons
    pub comparisons: Vec<ComparisonEntry>,
}

/// A funnel section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelSection {
    pub title: String,
    pub cols: u8,
    #[serde(flatten)]
    pub report: FunnelReport,
}

/// The complete dashboard payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub range: DateRange,
    pub period: PeriodType,
    pub reduction: Reduction,
    pub graph_sections: Vec<GraphSection>,
    pub traffic_breakdown: Vec<TrafficEntry>,
    pub funnel_sections: Vec<FunnelSection>,
    /// True when the data is placeholder data
    pub synthetic: bool,
}

/// Builds dashboards from a series source
pub struct DashboardEngine {
    source: Arc<dyn SeriesSource>,
    settings: DashboardSettings,
}

impl DashboardEngine {
    /// Create a new engine
    pub fn new(source: Arc<dyn SeriesSource>, settings: DashboardSettings) -> Self {
        Self { source, settings }
    }

    /// Get the underlying source
    pub fn source(&self) -> &dyn SeriesSource {
        self.source.as_ref()
    }

    /// Get the settings
    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Range fetched for a request: the displayed range extended back to the history start
    pub fn fetch_window(&self, request: &DashboardRequest) -> DateRange {
        request.range.extended_back_to(self.settings.history_start)
    }

    /// Build the dashboard for a request
    pub async fn build(&self, request: &DashboardRequest) -> Result<Dashboard> {
        let started = Instant::now();
        let window = self.fetch_window(request);
        if window.days() > self.settings.max_window_days {
            return Err(AnalyticsError::InvalidDateRange(format!(
                "{} to {} spans {} days, limit is {}",
                window.start,
                window.end,
                window.days(),
                self.settings.max_window_days
            )));
        }

        let (site, shop, traffic) = if window.is_empty() {
            (
                empty_set(Dataset::SiteFunnel),
                empty_set(Dataset::ShopFunnel),
                empty_set(Dataset::TrafficSources),
            )
        } else {
            tokio::try_join!(
                self.source.fetch(Dataset::SiteFunnel, &window),
                self.source.fetch(Dataset::ShopFunnel, &window),
                self.source.fetch(Dataset::TrafficSources, &window),
            )?
        };

        let site = self.prepare(site, &window);
        let shop = self.prepare(shop, &window);
        let traffic = self.prepare(traffic, &window);

        let dashboard = Dashboard {
            range: request.range,
            period: request.period,
            reduction: request.reduction,
            graph_sections: vec![
                self.site_visits_section(&site, request),
                self.funnel_trend_section(&site, request),
            ],
            traffic_breakdown: traffic_section(&traffic, &request.range),
            funnel_sections: vec![
                funnel_section(
                    SITE_FUNNEL_SECTION,
                    &site,
                    &request.range,
                    self.settings.site_funnel_override,
                ),
                funnel_section(
                    SHOP_FUNNEL_SECTION,
                    &shop,
                    &request.range,
                    self.settings.shop_funnel_override,
                ),
            ],
            synthetic: self.source.is_synthetic(),
        };

        tracing::debug!(
            source = self.source.name(),
            start = %request.range.start,
            end = %request.range.end,
            period = %request.period,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dashboard built"
        );

        Ok(dashboard)
    }

    /// Densify over the fetch window, then apply configured floors
    fn prepare(&self, set: SeriesSet, window: &DateRange) -> SeriesSet {
        set.map(|s| {
            let dense = s.densify(window);
            match self.settings.floors.get(&s.title) {
                Some(floor) => dense.clamp_floor(*floor),
                None => dense,
            }
        })
    }

    fn site_visits_section(&self, site: &SeriesSet, request: &DashboardRequest) -> GraphSection {
        let visits = site.series_or_empty(titles::SITE_VISITS);
        GraphSection {
            title: SITE_VISITS_SECTION.to_string(),
            cols: 12,
            chart: chart(std::slice::from_ref(&visits), request),
            comparisons: compare(&visits).to_vec(),
        }
    }

    fn funnel_trend_section(&self, site: &SeriesSet, request: &DashboardRequest) -> GraphSection {
        let series: Vec<TimeSeries> = FUNNEL_TREND_SERIES
            .iter()
            .map(|title| site.series_or_empty(title))
            .collect();
        GraphSection {
            title: FUNNEL_TREND_SECTION.to_string(),
            cols: 12,
            chart: chart(&series, request),
            comparisons: Vec::new(),
        }
    }
}

fn empty_set(dataset: Dataset) -> SeriesSet {
    let series = dataset.titles().into_iter().map(TimeSeries::empty).collect();
    SeriesSet::new(dataset, series)
}

/// Filter to the displayed range, bucket, and lay out as a chart
fn chart(series: &[TimeSeries], request: &DashboardRequest) -> ChartDataset {
    let visible = filter_all(series, &request.range);
    let buckets = bucket_all(&visible, request.period, request.reduction);
    let names: Vec<String> = series.iter().map(|s| s.title.clone()).collect();
    ChartDataset::from_buckets(&buckets, &names, request.period)
}

fn traffic_section(traffic: &SeriesSet, range: &DateRange) -> Vec<TrafficEntry> {
    let entries = Dataset::TrafficSources
        .titles()
        .into_iter()
        .map(|title| {
            let series = traffic.series_or_empty(title);
            TrafficEntry::new(title, filter_range(&series, range).total(), compare(&series))
        })
        .collect();
    breakdown(entries)
}

fn funnel_section(
    title: &str,
    set: &SeriesSet,
    range: &DateRange,
    overall_override: Option<f64>,
) -> FunnelSection {
    let stages = set
        .dataset
        .titles()
        .into_iter()
        .map(|stage| {
            let series = set.series_or_empty(stage);
            FunnelStage::new(stage, filter_range(&series, range).total())
                .with_comparisons(compare(&series))
        })
        .collect();

    FunnelSection {
        title: title.to_string(),
        cols: 6,
        report: Funnel::new(stages)
            .with_overall_override(overall_override)
            .reduce(),
    }
}
