//! Seeded placeholder data for local development
//!
//! Values depend only on the seed, the dataset and the date, so overlapping
//! ranges agree with each other.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Dataset, SeriesSet, SeriesSource, titles};
use crate::error::Result;
use crate::range::DateRange;
use crate::timeseries::{TimePoint, TimeSeries};

/// Traffic channel shares of site visits
const TRAFFIC_SHARES: [(&str, f64); 5] = [
    (titles::ADS, 0.35),
    (titles::SEO, 0.25),
    (titles::SNS, 0.15),
    (titles::DIRECT, 0.20),
    (titles::OTHER, 0.05),
];

/// Stage-to-stage ratios of the site funnel after site visits
const SITE_RATIOS: [f64; 4] = [0.6, 0.3, 0.15, 0.8];

/// Stage-to-stage ratios of the shop funnel after LINE registrations
const SHOP_RATIOS: [f64; 5] = [3.0, 0.4, 0.5, 0.3, 0.5];

/// Series source producing deterministic fake data
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    seed: u64,
    epoch: NaiveDate,
}

impl SyntheticSource {
    /// Create a source with a fixed seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            epoch: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        }
    }

    fn rng_for(&self, dataset: Dataset, date: NaiveDate) -> StdRng {
        let salt = match dataset {
            Dataset::SiteFunnel => 1,
            Dataset::ShopFunnel => 2,
            Dataset::TrafficSources => 3,
        };
        let day = date.num_days_from_ce() as u64;
        StdRng::seed_from_u64(self.seed ^ (salt << 32) ^ day)
    }

    /// Base value with trend, noise, a weekend dip and monthly seasonality
    fn daily_value(&self, rng: &mut StdRng, date: NaiveDate, base: f64, volatility: f64, trend: f64) -> f64 {
        let elapsed = (date - self.epoch).num_days() as f64;
        let mut value = base + trend * elapsed + rng.random_range(-1.0..1.0) * volatility;

        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            value *= 0.7;
        }

        let seasonal = (f64::from(date.month0()) / 12.0 * std::f64::consts::TAU).sin();
        value *= 1.0 + seasonal * 0.2;

        value.round().max(0.0)
    }

    fn site_visits(&self, dataset: Dataset, date: NaiveDate) -> f64 {
        let mut rng = self.rng_for(dataset, date);
        self.daily_value(&mut rng, date, 10_000.0, 1_000.0, 1.0)
    }

    fn chain(first: f64, ratios: &[f64]) -> Vec<f64> {
        let mut values = vec![first];
        for ratio in ratios {
            let prev = values.last().copied().unwrap_or(0.0);
            values.push((prev * ratio).round());
        }
        values
    }

    fn day_values(&self, dataset: Dataset, date: NaiveDate) -> Vec<f64> {
        match dataset {
            Dataset::SiteFunnel => Self::chain(self.site_visits(dataset, date), &SITE_RATIOS),
            Dataset::ShopFunnel => {
                let mut rng = self.rng_for(dataset, date);
                let registrations = self.daily_value(&mut rng, date, 120.0, 30.0, 0.1);
                Self::chain(registrations, &SHOP_RATIOS)
            }
            Dataset::TrafficSources => {
                // Same visits as the site funnel on the same day
                let visits = self.site_visits(Dataset::SiteFunnel, date);
                TRAFFIC_SHARES
                    .iter()
                    .map(|(_, share)| (visits * share).round())
                    .collect()
            }
        }
    }
}

#[async_trait]
impl SeriesSource for SyntheticSource {
    async fn fetch(&self, dataset: Dataset, range: &DateRange) -> Result<SeriesSet> {
        let titles = dataset.titles();
        let mut points: Vec<Vec<TimePoint>> = vec![Vec::new(); titles.len()];

        for date in range.iter_days() {
            for (idx, value) in self.day_values(dataset, date).into_iter().enumerate() {
                if let Some(series) = points.get_mut(idx) {
                    series.push(TimePoint::new(date, value));
                }
            }
        }

        let series = titles
            .into_iter()
            .zip(points)
            .map(|(title, points)| TimeSeries::new(title, points))
            .collect();

        Ok(SeriesSet::new(dataset, series))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn is_synthetic(&self) -> bool {
        true
    }
}
