//! Growth Warehouse - query execution against the analytics warehouse
//!
//! Provides a backend-neutral interface for running parameterized SQL:
//! - **BigQuery**: REST `jobs.query` with service account or ambient credentials
//!
//! # Usage
//!
//! ```ignore
//! use growth_warehouse::{Query, WarehouseConfig, WarehouseEngine};
//!
//! let config = WarehouseConfig::with_key_file("my-project", "./key/prod.json");
//! let engine = WarehouseEngine::from_config(&config)?;
//!
//! let result = engine
//!     .query(&Query::new("SELECT @d AS d").bind_date("d", today))
//!     .await?;
//! println!("Rows: {}", result.row_count);
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod result;

// Re-exports
pub use backend::bigquery::{
    BigQueryBackend, BigQueryBackendConfig, MetadataTokenProvider, ServiceAccountKey,
    ServiceAccountTokenProvider, TokenProvider,
};
pub use backend::{ParamValue, Query, QueryParam, WarehouseBackend, validate_sql};
pub use config::{Credentials, ResolvedWarehouseConfig, WarehouseConfig};
pub use error::{Result, WarehouseError};
pub use result::{Column, DataType, QueryResult};

use std::sync::Arc;

/// Warehouse engine that routes queries to the configured backend
pub struct WarehouseEngine {
    backend: Arc<dyn WarehouseBackend>,
}

impl WarehouseEngine {
    /// Create a new engine with a specific backend
    pub fn new(backend: impl WarehouseBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Create an engine from resolved config
    pub fn from_resolved_config(config: &ResolvedWarehouseConfig) -> Result<Self> {
        let client = reqwest::Client::new();

        let tokens: Arc<dyn TokenProvider> = match &config.credentials {
            Credentials::KeyFile(path) => {
                let key = ServiceAccountKey::from_file(path)?;
                Arc::new(ServiceAccountTokenProvider::new(key, client.clone()))
            }
            Credentials::Ambient => Arc::new(MetadataTokenProvider::new(client.clone())),
        };

        let mut bq_config =
            BigQueryBackendConfig::new(&config.project_id).with_timeout_ms(config.timeout_ms);
        if let Some(location) = &config.location {
            bq_config = bq_config.with_location(location);
        }
        if let Some(endpoint) = &config.endpoint {
            bq_config = bq_config.with_endpoint(endpoint);
        }

        tracing::info!(
            project_id = %config.project_id,
            credentials = tokens.name(),
            "warehouse backend configured"
        );

        Ok(Self::new(BigQueryBackend::new(&bq_config, client, tokens)))
    }

    /// Create an engine from raw config
    pub fn from_config(config: &WarehouseConfig) -> Result<Self> {
        let resolved = ResolvedWarehouseConfig::from_config(config)?;
        Self::from_resolved_config(&resolved)
    }

    /// Execute a query
    pub async fn query(&self, query: &Query) -> Result<QueryResult> {
        self.backend.execute(query).await
    }

    /// Check if the backend is healthy
    pub async fn health_check(&self) -> Result<()> {
        self.backend.health_check().await
    }

    /// Get the backend name
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

// Lets the engine stand in wherever a backend is expected
#[async_trait::async_trait]
impl WarehouseBackend for WarehouseEngine {
    async fn execute(&self, query: &Query) -> Result<QueryResult> {
        self.backend.execute(query).await
    }

    async fn health_check(&self) -> Result<()> {
        self.backend.health_check().await
    }

    fn name(&self) -> &'static str {
        self.backend.name()
    }
}
