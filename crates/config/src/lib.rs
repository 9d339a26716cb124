//! Growth Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Every section is optional; only the warehouse needs real values.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use growth_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[warehouse]\nbackend = \"synthetic\"").unwrap();
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [warehouse]
//! project_id = "my-project"
//! key_file = "./key/prod.json"
//!
//! [api_server]
//! port = 3000
//!
//! [dashboard]
//! history_start = "2024-01-01"
//! shop_funnel_override = 10.5
//! ```

mod api_server;
mod dashboard;
mod error;
mod logging;
mod validation;
mod warehouse;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use api_server::ApiServerConfig;
pub use dashboard::DashboardConfig;
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use warehouse::{WarehouseBackendKind, WarehouseSection};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Data warehouse (or synthetic data) settings
    pub warehouse: WarehouseSection,

    /// HTTP server settings
    pub api_server: ApiServerConfig,

    /// Dashboard defaults and funnel settings
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// True when dashboards will be built from placeholder data
    pub fn is_synthetic(&self) -> bool {
        self.warehouse.backend == WarehouseBackendKind::Synthetic
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
