//! Warehouse connection configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WarehouseError};

/// Warehouse connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Project that runs the query jobs
    pub project_id: Option<String>,

    /// Path to a service account key file
    pub key_file: Option<PathBuf>,

    /// Use ambient credentials instead of a key file
    #[serde(default)]
    pub use_adc: bool,

    /// Dataset location
    pub location: Option<String>,

    /// Job completion timeout in milliseconds
    pub timeout_ms: Option<u64>,

    /// REST endpoint override (emulators, proxies)
    pub endpoint: Option<String>,
}

impl WarehouseConfig {
    /// Config using a key file
    pub fn with_key_file(project_id: impl Into<String>, key_file: impl Into<PathBuf>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            key_file: Some(key_file.into()),
            ..Default::default()
        }
    }

    /// Config using ambient credentials
    pub fn with_adc(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            use_adc: true,
            ..Default::default()
        }
    }
}

/// How the backend authenticates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Service account key file
    KeyFile(PathBuf),
    /// Ambient credentials (metadata server)
    Ambient,
}

/// Warehouse configuration with every required field present
#[derive(Debug, Clone)]
pub struct ResolvedWarehouseConfig {
    pub project_id: String,
    pub credentials: Credentials,
    pub location: Option<String>,
    pub timeout_ms: u64,
    pub endpoint: Option<String>,
}

impl ResolvedWarehouseConfig {
    /// Resolve and check a raw config
    pub fn from_config(config: &WarehouseConfig) -> Result<Self> {
        let project_id = config
            .project_id
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| WarehouseError::Config("project_id is required".to_string()))?;

        let credentials = if config.use_adc {
            Credentials::Ambient
        } else {
            let path = config.key_file.clone().ok_or_else(|| {
                WarehouseError::Config(
                    "no warehouse credentials configured. Options:\n  \
                     1. key_file = \"./key/prod.json\"  (service account key)\n  \
                     2. use_adc = true  (ambient credentials)"
                        .to_string(),
                )
            })?;
            Credentials::KeyFile(path)
        };

        Ok(Self {
            project_id,
            credentials,
            location: config.location.clone(),
            timeout_ms: config.timeout_ms.unwrap_or(60_000),
            endpoint: config.endpoint.clone(),
        })
    }
}
