//! BigQuery backend for querying growth data
//!
//! Executes standard SQL through the REST `jobs.query` endpoint and follows
//! `getQueryResults` pages until the result is complete.

pub mod auth;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::{Query, WarehouseBackend, validate_sql};
use crate::error::{Result, WarehouseError};
use crate::result::{Column, DataType, QueryResult};

pub use auth::{MetadataTokenProvider, ServiceAccountKey, ServiceAccountTokenProvider, TokenProvider};

// =============================================================================
// Configuration
// =============================================================================

/// BigQuery backend configuration
#[derive(Debug, Clone)]
pub struct BigQueryBackendConfig {
    /// REST endpoint (e.g., "https://bigquery.googleapis.com/bigquery/v2")
    pub endpoint: String,

    /// Project that runs (and is billed for) the query jobs
    pub project_id: String,

    /// Dataset location (e.g., "asia-northeast1")
    pub location: Option<String>,

    /// Server-side wait for job completion in milliseconds
    pub timeout_ms: u64,
}

impl Default for BigQueryBackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://bigquery.googleapis.com/bigquery/v2".into(),
            project_id: String::new(),
            location: None,
            timeout_ms: 60_000,
        }
    }
}

impl BigQueryBackendConfig {
    /// Create a new config for a project
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    /// Set the dataset location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Override the REST endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the job completion timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    parameter_mode: &'static str,
    query_parameters: Vec<WireParameter>,
    timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireParameter {
    name: String,
    parameter_type: WireParameterType,
    parameter_value: WireParameterValue,
}

#[derive(Debug, Serialize)]
struct WireParameterType {
    #[serde(rename = "type")]
    type_name: &'static str,
}

#[derive(Debug, Serialize)]
struct WireParameterValue {
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    schema: Option<Schema>,
    #[serde(default)]
    rows: Vec<WireRow>,
    #[serde(default)]
    job_complete: bool,
    #[serde(default)]
    page_token: Option<String>,
    #[serde(default)]
    job_reference: Option<JobReference>,
}

#[derive(Debug, Default, Deserialize)]
struct Schema {
    #[serde(default)]
    fields: Vec<SchemaField>,
}

#[derive(Debug, Deserialize)]
struct SchemaField {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireRow {
    #[serde(default)]
    f: Vec<WireCell>,
}

#[derive(Debug, Deserialize)]
struct WireCell {
    #[serde(default)]
    v: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    #[serde(default)]
    location: Option<String>,
}

// =============================================================================
// Backend Implementation
// =============================================================================

/// BigQuery backend using the REST interface
#[derive(Clone)]
pub struct BigQueryBackend {
    client: reqwest::Client,
    config: BigQueryBackendConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for BigQueryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigQueryBackend")
            .field("project_id", &self.config.project_id)
            .field("location", &self.config.location)
            .field("credentials", &self.tokens.name())
            .finish()
    }
}

impl BigQueryBackend {
    /// Create a new BigQuery backend
    pub fn new(
        config: &BigQueryBackendConfig,
        client: reqwest::Client,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            config: config.clone(),
            tokens,
        }
    }

    fn queries_url(&self) -> String {
        format!(
            "{}/projects/{}/queries",
            self.config.endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.config.project_id)
        )
    }

    fn results_url(&self, job: &JobReference, page_token: &str) -> String {
        let mut url = format!(
            "{}/{}?pageToken={}&timeoutMs={}",
            self.queries_url(),
            urlencoding::encode(&job.job_id),
            urlencoding::encode(page_token),
            self.config.timeout_ms
        );
        let location = job.location.as_deref().or(self.config.location.as_deref());
        if let Some(location) = location {
            url.push_str("&location=");
            url.push_str(&urlencoding::encode(location));
        }
        url
    }

    fn build_request<'a>(&'a self, query: &'a Query) -> QueryRequest<'a> {
        QueryRequest {
            query: &query.sql,
            use_legacy_sql: false,
            parameter_mode: "NAMED",
            query_parameters: query
                .params
                .iter()
                .map(|p| WireParameter {
                    name: p.name.clone(),
                    parameter_type: WireParameterType {
                        type_name: p.value.type_name(),
                    },
                    parameter_value: WireParameterValue {
                        value: p.value.to_wire(),
                    },
                })
                .collect(),
            timeout_ms: self.config.timeout_ms,
            location: self.config.location.as_deref(),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<QueryResponse> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await.map_err(|e| {
            WarehouseError::Connection(format!("BigQuery connection failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WarehouseError::Execution(format!(
                "BigQuery error ({}): {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WarehouseError::Execution(format!("failed to read response: {}", e)))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WarehouseBackend for BigQueryBackend {
    async fn execute(&self, query: &Query) -> Result<QueryResult> {
        validate_sql(&query.sql)?;
        let start = Instant::now();

        let request = self.client.post(self.queries_url()).json(&self.build_request(query));
        let mut page = self.send(request).await?;
        if !page.job_complete {
            return Err(WarehouseError::Execution(format!(
                "query did not complete within {} ms",
                self.config.timeout_ms
            )));
        }

        let columns = page
            .schema
            .take()
            .map(|s| schema_columns(&s))
            .unwrap_or_default();
        let mut rows = convert_rows(&columns, std::mem::take(&mut page.rows));

        // Large results are split across pages
        while let (Some(token), Some(job)) = (page.page_token.take(), page.job_reference.as_ref())
        {
            let request = self.client.get(self.results_url(job, &token));
            let mut next = self.send(request).await?;
            rows.extend(convert_rows(&columns, std::mem::take(&mut next.rows)));
            next.job_reference = page.job_reference.take();
            page = next;
        }

        let elapsed = start.elapsed().as_millis() as u64;
        tracing::debug!(rows = rows.len(), elapsed_ms = elapsed, "BigQuery query complete");
        Ok(QueryResult::new(columns, rows, elapsed))
    }

    async fn health_check(&self) -> Result<()> {
        self.execute(&Query::new("SELECT 1")).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "bigquery"
    }
}

fn schema_columns(schema: &Schema) -> Vec<Column> {
    schema
        .fields
        .iter()
        .map(|f| {
            let nullable = f.mode.as_deref().is_none_or(|m| m != "REQUIRED");
            Column::new(&f.name, DataType::from_bigquery(&f.type_name), nullable)
        })
        .collect()
}

fn convert_rows(columns: &[Column], rows: Vec<WireRow>) -> Vec<Vec<Value>> {
    rows.into_iter()
        .map(|row| {
            row.f
                .into_iter()
                .enumerate()
                .map(|(i, cell)| {
                    let data_type = columns.get(i).map_or(DataType::Unknown, |c| c.data_type);
                    convert_cell(cell.v, data_type)
                })
                .collect()
        })
        .collect()
}

/// BigQuery returns every scalar as a string; restore the schema type
fn convert_cell(value: Value, data_type: DataType) -> Value {
    let Value::String(s) = value else {
        return value;
    };

    match data_type {
        DataType::Int64 => s.parse::<i64>().map(Value::from).unwrap_or(Value::String(s)),
        DataType::Float64 => s
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::String(s)),
        DataType::Boolean => match s.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(s),
        },
        _ => Value::String(s),
    }
}
