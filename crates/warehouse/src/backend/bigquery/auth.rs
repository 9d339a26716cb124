//! BigQuery credentials
//!
//! Two ways to obtain an OAuth access token:
//! - a service account key file (signed JWT grant)
//! - ambient credentials from the GCE metadata server

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{Result, WarehouseError};

const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery.readonly";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens for warehouse requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Get a valid access token, refreshing if needed
    async fn access_token(&self) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Fields of a service account key file that the JWT grant needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Load a key from a JSON key file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WarehouseError::Credentials(format!(
                "failed to read key file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&contents)
    }

    /// Parse a key from its JSON contents
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| WarehouseError::Credentials(format!("invalid key file: {}", e)))
    }
}

#[derive(Debug, Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn from_response(response: TokenResponse) -> Self {
        Self {
            token: response.access_token,
            expires_at: Instant::now() + Duration::from_secs(response.expires_in),
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }
}

/// Exchanges a signed JWT for an access token
pub struct ServiceAccountTokenProvider {
    key: ServiceAccountKey,
    client: reqwest::Client,
    cache: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for ServiceAccountTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountTokenProvider")
            .field("client_email", &self.key.client_email)
            .finish()
    }
}

impl ServiceAccountTokenProvider {
    pub fn new(key: ServiceAccountKey, client: reqwest::Client) -> Self {
        Self {
            key,
            client,
            cache: Mutex::new(None),
        }
    }

    /// Build the signed assertion for the token endpoint
    pub(crate) fn assertion(&self, now: i64) -> Result<String> {
        let claims = GrantClaims {
            iss: &self.key.client_email,
            scope: BIGQUERY_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &signing_key)?)
    }

    async fn fetch(&self) -> Result<CachedToken> {
        let assertion = self.assertion(chrono::Utc::now().timestamp())?;
        let body = format!(
            "grant_type={}&assertion={}",
            urlencoding::encode(JWT_GRANT_TYPE),
            urlencoding::encode(&assertion)
        );

        let response = self
            .client
            .post(&self.key.token_uri)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await
            .map_err(|e| WarehouseError::Credentials(format!("token request failed: {}", e)))?;

        read_token_response(response).await
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref()
            && cached.is_fresh()
        {
            return Ok(cached.token.clone());
        }

        let fresh = self.fetch().await?;
        tracing::debug!(client_email = %self.key.client_email, "refreshed warehouse token");
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }

    fn name(&self) -> &'static str {
        "service_account"
    }
}

/// Ambient credentials from the compute metadata server
pub struct MetadataTokenProvider {
    client: reqwest::Client,
    url: String,
    cache: Mutex<Option<CachedToken>>,
}

impl MetadataTokenProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(client, METADATA_TOKEN_URL)
    }

    /// Use a custom metadata endpoint
    pub fn with_url(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            cache: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TokenProvider for MetadataTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref()
            && cached.is_fresh()
        {
            return Ok(cached.token.clone());
        }

        let response = self
            .client
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| {
                WarehouseError::Credentials(format!("metadata server unreachable: {}", e))
            })?;

        let fresh = read_token_response(response).await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }

    fn name(&self) -> &'static str {
        "metadata"
    }
}

async fn read_token_response(response: reqwest::Response) -> Result<CachedToken> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(WarehouseError::Credentials(format!(
            "token endpoint returned {}: {}",
            status, body
        )));
    }

    let parsed: TokenResponse = response
        .json()
        .await
        .map_err(|e| WarehouseError::Credentials(format!("invalid token response: {}", e)))?;

    Ok(CachedToken::from_response(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_json_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"svc@proj.iam.gserviceaccount.com","private_key":"pem"}"#,
        )
        .unwrap();
        assert_eq!(key.client_email, "svc@proj.iam.gserviceaccount.com");
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert!(key.project_id.is_none());
    }

    #[test]
    fn test_key_from_json_invalid() {
        let err = ServiceAccountKey::from_json("{}").unwrap_err();
        assert!(matches!(err, WarehouseError::Credentials(_)));
    }

    #[test]
    fn test_key_from_missing_file() {
        let err = ServiceAccountKey::from_file("/nonexistent/key.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/key.json"));
    }

    #[test]
    fn test_key_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.json");
        std::fs::write(
            &path,
            r#"{"client_email":"a@b","private_key":"pem","token_uri":"http://localhost/token","project_id":"p"}"#,
        )
        .unwrap();

        let key = ServiceAccountKey::from_file(&path).unwrap();
        assert_eq!(key.token_uri, "http://localhost/token");
        assert_eq!(key.project_id.as_deref(), Some("p"));
    }

    #[test]
    fn test_assertion_rejects_bad_pem() {
        let key = ServiceAccountKey::from_json(r#"{"client_email":"a@b","private_key":"nope"}"#)
            .unwrap();
        let provider = ServiceAccountTokenProvider::new(key, reqwest::Client::new());
        assert!(matches!(
            provider.assertion(0),
            Err(WarehouseError::Credentials(_))
        ));
    }

    #[test]
    fn test_cached_token_freshness() {
        let fresh = CachedToken::from_response(TokenResponse {
            access_token: "t".into(),
            expires_in: 3600,
        });
        assert!(fresh.is_fresh());

        let stale = CachedToken::from_response(TokenResponse {
            access_token: "t".into(),
            expires_in: 30,
        });
        assert!(!stale.is_fresh());
    }
}
