//! Warehouse backend trait and implementations

pub mod bigquery;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, WarehouseError};
use crate::result::QueryResult;

/// Warehouse backend trait
///
/// Implemented by the BigQuery backend and by in-memory backends in tests.
#[async_trait]
pub trait WarehouseBackend: Send + Sync {
    /// Execute a parameterized SQL query
    async fn execute(&self, query: &Query) -> Result<QueryResult>;

    /// Check if backend is available
    async fn health_check(&self) -> Result<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// A SQL statement with named parameters (`@name` placeholders)
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl Query {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind a named parameter
    pub fn bind(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.params.push(QueryParam {
            name: name.into(),
            value,
        });
        self
    }

    /// Bind a DATE parameter
    pub fn bind_date(self, name: impl Into<String>, date: NaiveDate) -> Self {
        self.bind(name, ParamValue::Date(date))
    }

    /// Look up a bound parameter
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

/// A named query parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParam {
    pub name: String,
    pub value: ParamValue,
}

/// Typed parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Date(NaiveDate),
    String(String),
    Int64(i64),
}

impl ParamValue {
    /// Warehouse type name for this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Date(_) => "DATE",
            Self::String(_) => "STRING",
            Self::Int64(_) => "INT64",
        }
    }

    /// Wire representation of the value
    pub fn to_wire(&self) -> String {
        match self {
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::String(s) => s.clone(),
            Self::Int64(i) => i.to_string(),
        }
    }
}

/// Validate SQL query - only allow SELECT and WITH (CTE) queries
///
/// This is a guardrail against accidentally generating a destructive query,
/// not a security boundary.
pub fn validate_sql(sql: &str) -> Result<()> {
    let trimmed = sql.trim();
    let upper = trimmed.to_uppercase();

    if !upper.starts_with("SELECT") && !upper.starts_with("WITH") {
        return Err(WarehouseError::InvalidSql(
            "only SELECT and WITH queries are allowed".to_string(),
        ));
    }

    // SELECT ... INTO creates tables in some dialects
    if upper.contains(" INTO ") && !upper.contains("INSERT INTO") {
        return Err(WarehouseError::InvalidSql(
            "SELECT INTO is not allowed".to_string(),
        ));
    }

    // Allow trailing semicolon
    if trimmed.contains(';') && !trimmed.ends_with(';') {
        return Err(WarehouseError::InvalidSql(
            "multiple statements not allowed".to_string(),
        ));
    }

    Ok(())
}
