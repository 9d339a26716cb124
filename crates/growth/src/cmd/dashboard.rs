//! Dashboard command - Build one dashboard and print it
//!
//! # Usage
//!
//! ```bash
//! # Weekly sums from the history start to today
//! growth dashboard
//!
//! # Relative range, daily buckets
//! growth dashboard --range 30d --period daily
//!
//! # Explicit dates, monthly averages
//! growth dashboard --start 2024-01-01 --end 2024-06-30 --period monthly --reduction average
//! ```

use anyhow::{Context, Result};
use clap::Args;
use growth_analytics::{
    DashboardRequest, DateRange, PeriodType, Reduction, parse_date, today_at_offset,
};
use growth_config::Config;

use crate::bootstrap;

/// Dashboard command arguments
#[derive(Args, Debug, Default)]
pub struct DashboardArgs {
    /// Relative range (e.g., 7d, 30d, mtd, ytd, 2024-01-01,2024-01-31)
    #[arg(short, long, conflicts_with_all = ["start", "end"])]
    pub range: Option<String>,

    /// Inclusive start date (YYYY-MM-DD). Default: dashboard history start
    #[arg(long)]
    pub start: Option<String>,

    /// Inclusive end date (YYYY-MM-DD). Default: today
    #[arg(long)]
    pub end: Option<String>,

    /// Bucketing period (daily, weekly, monthly). Default: from config
    #[arg(short, long)]
    pub period: Option<String>,

    /// Bucket reduction (sum, average). Default: from config
    #[arg(long)]
    pub reduction: Option<String>,

    /// Print compact JSON instead of pretty JSON
    #[arg(long)]
    pub compact: bool,
}

/// Run the dashboard command
pub async fn run(config: &Config, args: DashboardArgs) -> Result<()> {
    let engine = bootstrap::build_engine(config)?;
    let today = today_at_offset(config.dashboard.utc_offset_hours);
    let request = build_request(config, &args, today)?;

    let dashboard = engine
        .build(&request)
        .await
        .context("failed to build dashboard")?;

    let json = if args.compact {
        serde_json::to_string(&dashboard)?
    } else {
        serde_json::to_string_pretty(&dashboard)?
    };
    println!("{}", json);

    Ok(())
}

fn build_request(
    config: &Config,
    args: &DashboardArgs,
    today: chrono::NaiveDate,
) -> Result<DashboardRequest> {
    let range = match &args.range {
        Some(range) => DateRange::parse(range, today)?,
        None => {
            let start = match &args.start {
                Some(s) => parse_date(s)?,
                None => config.dashboard.history_start,
            };
            let end = match &args.end {
                Some(s) => parse_date(s)?,
                None => today,
            };
            DateRange::new(start, end)
        }
    };

    let period = match &args.period {
        Some(p) => PeriodType::parse(p)?,
        None => config.dashboard.period(),
    };
    let reduction = match &args.reduction {
        Some(r) => Reduction::parse(r)?,
        None => config.dashboard.reduction(),
    };

    Ok(DashboardRequest::new(range)
        .with_period(period)
        .with_reduction(reduction))
}
