//! Warehouse error types

/// Errors that can occur during warehouse query execution
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// Backend not configured
    #[error("backend not configured: {0}")]
    BackendNotConfigured(String),

    /// Connection failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// Query execution failed
    #[error("query execution failed: {0}")]
    Execution(String),

    /// Invalid SQL (only SELECT/WITH allowed)
    #[error("invalid SQL: {0}")]
    InvalidSql(String),

    /// Credential loading or token exchange failed
    #[error("credentials error: {0}")]
    Credentials(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for WarehouseError {
    fn from(err: serde_json::Error) -> Self {
        WarehouseError::Serialization(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for WarehouseError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        WarehouseError::Credentials(format!("failed to sign token request: {}", err))
    }
}

/// Result type for warehouse operations
pub type Result<T> = std::result::Result<T, WarehouseError>;
