//! Shared startup: configuration loading and engine construction

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use growth_analytics::{DashboardEngine, SeriesSource, WarehouseSource};
use growth_api::AppState;
use growth_config::{Config, WarehouseBackendKind};
use growth_warehouse::{WarehouseBackend, WarehouseEngine};
use tracing::{info, warn};

/// Config file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "configs/growth.toml";

/// Load configuration from `path`, or from the default location
///
/// An explicit path must exist. Without one, the default path is required
/// too: there is no built-in warehouse to fall back to.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    Config::from_file(path).with_context(|| format!("failed to load config {}", path.display()))
}

/// Build the series source named by `[warehouse] backend`
pub fn build_source(config: &Config) -> Result<Arc<dyn SeriesSource>> {
    match config.warehouse.backend {
        WarehouseBackendKind::Bigquery => {
            let engine = WarehouseEngine::from_config(&config.warehouse.connection())
                .context("failed to create warehouse client")?;

            info!(
                backend = engine.backend_name(),
                project = config.warehouse.project_id.as_deref().unwrap_or_default(),
                "warehouse backend initialized"
            );

            let backend: Arc<dyn WarehouseBackend> = Arc::new(engine);
            let source = WarehouseSource::new(
                backend,
                config.warehouse.source(config.dashboard.utc_offset_hours),
            )
            .context("invalid warehouse table settings")?;

            Ok(Arc::new(source))
        }
        WarehouseBackendKind::Synthetic => synthetic_source(config),
    }
}

#[cfg(feature = "synthetic")]
fn synthetic_source(config: &Config) -> Result<Arc<dyn SeriesSource>> {
    warn!(
        seed = config.warehouse.synthetic_seed,
        "serving SYNTHETIC placeholder data; dashboards do not reflect real numbers"
    );
    Ok(Arc::new(growth_analytics::SyntheticSource::new(
        config.warehouse.synthetic_seed,
    )))
}

#[cfg(not(feature = "synthetic"))]
fn synthetic_source(_config: &Config) -> Result<Arc<dyn SeriesSource>> {
    warn!("synthetic backend requested but the binary was built without it");
    anyhow::bail!("backend = \"synthetic\" requires the `synthetic` feature")
}

/// Build the dashboard engine for a configuration
pub fn build_engine(config: &Config) -> Result<DashboardEngine> {
    let source = build_source(config)?;
    Ok(DashboardEngine::new(source, config.dashboard.settings()))
}

/// Build the API state for a configuration
pub fn build_state(config: &Config) -> Result<AppState> {
    let engine = build_engine(config)?;
    Ok(AppState::new(engine)
        .with_utc_offset(config.dashboard.utc_offset_hours)
        .with_default_period(config.dashboard.period())
        .with_default_reduction(config.dashboard.reduction()))
}
