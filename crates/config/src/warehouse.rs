//! Warehouse configuration
//!
//! Where dashboard data comes from: the BigQuery warehouse, or seeded
//! placeholder data for local development.

use std::path::PathBuf;

use serde::Deserialize;

use growth_analytics::WarehouseSourceConfig;
use growth_warehouse::WarehouseConfig;

/// Data backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseBackendKind {
    /// BigQuery (production)
    #[default]
    Bigquery,
    /// Seeded placeholder data, never real numbers
    Synthetic,
}

/// Warehouse configuration
///
/// # Example
///
/// ```toml
/// [warehouse]
/// backend = "bigquery"
/// project_id = "my-project"
/// key_file = "./key/prod.json"
/// location = "asia-northeast1"
/// site_dataset = "analytics_123"
/// member_dataset = "analytics_456"
///
/// # Or placeholder data for local development
/// [warehouse]
/// backend = "synthetic"
/// synthetic_seed = 42
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarehouseSection {
    /// Backend type
    /// Default: bigquery
    pub backend: WarehouseBackendKind,

    /// Project that owns the datasets and runs jobs
    pub project_id: Option<String>,

    /// Service account key file
    pub key_file: Option<PathBuf>,

    /// Use ambient credentials instead of a key file
    /// Default: false
    pub use_adc: bool,

    /// Dataset location (e.g., "asia-northeast1")
    pub location: Option<String>,

    /// Job timeout in milliseconds
    /// Default: 60000
    pub timeout_ms: Option<u64>,

    /// REST endpoint override
    pub endpoint: Option<String>,

    /// GA4 export dataset of the public site
    pub site_dataset: String,

    /// GA4 export dataset of the member site
    pub member_dataset: String,

    /// `dataset.table` holding user registration, conversion and first order dates
    pub users_table: String,

    /// `dataset.table` of shop user actions
    pub action_log_table: String,

    /// `dataset.table` of LINE friend changes
    pub line_users_table: String,

    /// `page_location` LIKE pattern for member page views
    pub member_page_pattern: String,

    /// Seed for synthetic data
    /// Default: 42
    pub synthetic_seed: u64,
}

impl Default for WarehouseSection {
    fn default() -> Self {
        let tables = WarehouseSourceConfig::new("");
        Self {
            backend: WarehouseBackendKind::default(),
            project_id: None,
            key_file: None,
            use_adc: false,
            location: None,
            timeout_ms: None,
            endpoint: None,
            site_dataset: tables.site_dataset,
            member_dataset: tables.member_dataset,
            users_table: tables.users_table,
            action_log_table: tables.action_log_table,
            line_users_table: tables.line_users_table,
            member_page_pattern: tables.member_page_pattern,
            synthetic_seed: 42,
        }
    }
}

impl WarehouseSection {
    /// Connection settings for the warehouse client
    pub fn connection(&self) -> WarehouseConfig {
        WarehouseConfig {
            project_id: self.project_id.clone(),
            key_file: self.key_file.clone(),
            use_adc: self.use_adc,
            location: self.location.clone(),
            timeout_ms: self.timeout_ms,
            endpoint: self.endpoint.clone(),
        }
    }

    /// Table settings for the warehouse series source
    pub fn source(&self, utc_offset_hours: i32) -> WarehouseSourceConfig {
        WarehouseSourceConfig {
            project_id: self.project_id.clone().unwrap_or_default(),
            site_dataset: self.site_dataset.clone(),
            member_dataset: self.member_dataset.clone(),
            users_table: self.users_table.clone(),
            action_log_table: self.action_log_table.clone(),
            line_users_table: self.line_users_table.clone(),
            member_page_pattern: self.member_page_pattern.clone(),
            utc_offset_hours,
        }
    }
}
