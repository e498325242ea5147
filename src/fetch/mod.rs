//! Raw results history retrieval.
//!
//! A [`HistorySource`] turns a username into the undecoded payload pool.
//! `Err` means the history could not be loaded at all; an empty or
//! unrecognisable payload is still `Ok` and simply extracts to nothing.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;

use crate::payload::Pool;

/// Default site hosting user results.
pub const DEFAULT_BASE_URL: &str = "https://sendou.ink";

/// Errors that can occur while loading a history.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Content too large: {size} bytes (max {max_size})")]
    ContentTooLarge { size: usize, max_size: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything that can produce a user's raw results payload.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Source identifier for logging.
    fn name(&self) -> &'static str;

    /// Load the raw payload for `username`.
    async fn fetch_history(&self, username: &str) -> Result<Pool, FetchError>;
}

/// Decode a response body into a pool.
///
/// Undecodable JSON is an error; well-formed JSON of the wrong shape is an
/// empty pool.
pub fn decode_payload(body: &[u8]) -> Result<Pool, FetchError> {
    let value: Value = serde_json::from_slice(body)?;
    Ok(Pool::from_value(value))
}

/// Configuration for the HTTP source.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Site root, e.g. `https://sendou.ink`
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Maximum body size to accept
    pub max_content_size: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("tourney-overlap/{}", env!("CARGO_PKG_VERSION")),
            max_content_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Loads histories from the site's results data endpoint.
pub struct HttpHistorySource {
    client: Client,
    base_url: Url,
    max_content_size: usize,
}

impl HttpHistorySource {
    /// Create a new source with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(config.base_url));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("tourney-overlap")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            max_content_size: config.max_content_size,
        })
    }

    /// `{base}/u/{username}/results.data?all=true`, username as one segment.
    pub fn results_data_url(&self, username: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["u", username, "results.data"]);
        url.query_pairs_mut().clear().append_pair("all", "true");
        Ok(url)
    }
}

#[async_trait]
impl HistorySource for HttpHistorySource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_history(&self, username: &str) -> Result<Pool, FetchError> {
        let url = self.results_data_url(username)?;
        info!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        debug!("Response status for {}: {}", username, status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(FetchError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("Results endpoint returned {} for {}", status, username);
            if status == StatusCode::NOT_FOUND {
                warn!("User {} might not exist or has no results page", username);
            }
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let content = response.bytes().await?;

        if content.len() > self.max_content_size {
            return Err(FetchError::ContentTooLarge {
                size: content.len(),
                max_size: self.max_content_size,
            });
        }

        let pool = decode_payload(&content)?;
        debug!("Received {} values for {}", pool.len(), username);
        Ok(pool)
    }
}

/// Loads histories saved to disk as `{dir}/{username}.json`.
#[derive(Debug, Clone)]
pub struct FileHistorySource {
    dir: PathBuf,
}

impl FileHistorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{}.json", username))
    }
}

#[async_trait]
impl HistorySource for FileHistorySource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch_history(&self, username: &str) -> Result<Pool, FetchError> {
        let path = self.path_for(username);
        debug!("Reading saved payload {}", path.display());

        let content = fs::read(&path).await?;
        decode_payload(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(base: &str) -> FetcherConfig {
        FetcherConfig {
            base_url: base.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: "test-agent".to_string(),
            max_content_size: 1024 * 1024,
        }
    }

    #[test]
    fn test_results_data_url() {
        let source = HttpHistorySource::new(test_config("https://sendou.ink")).unwrap();
        let url = source.results_data_url("Sendou").unwrap();

        assert_eq!(url.as_str(), "https://sendou.ink/u/Sendou/results.data?all=true");
    }

    #[test]
    fn test_results_data_url_encodes_username() {
        let source = HttpHistorySource::new(test_config("https://sendou.ink/")).unwrap();
        let url = source.results_data_url("a b/c").unwrap();

        assert_eq!(
            url.as_str(),
            "https://sendou.ink/u/a%20b%2Fc/results.data?all=true"
        );
    }

    #[test]
    fn test_results_data_url_keeps_base_path() {
        let source = HttpHistorySource::new(test_config("http://localhost:3000/mirror")).unwrap();
        let url = source.results_data_url("x").unwrap();

        assert_eq!(url.as_str(), "http://localhost:3000/mirror/u/x/results.data?all=true");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpHistorySource::new(test_config("not a url"));
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));

        let result = HttpHistorySource::new(test_config("mailto:someone@example.com"));
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_decode_payload() {
        assert_eq!(decode_payload(b"[1, \"a\"]").unwrap().len(), 2);
        assert!(decode_payload(b"{\"not\": \"array\"}").unwrap().is_empty());
        assert!(matches!(decode_payload(b"<html>"), Err(FetchError::Json(_))));
    }

    #[test]
    fn test_fetcher_config_default() {
        let config = FetcherConfig::default();

        assert_eq!(config.base_url, "https://sendou.ink");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("tourney-overlap/"));
    }

    #[tokio::test]
    async fn test_file_source_reads_saved_payload() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("alice.json"), "[\"value\", [2], {}]").unwrap();

        let source = FileHistorySource::new(temp_dir.path());
        let pool = source.fetch_history("alice").await.unwrap();

        assert_eq!(pool.len(), 3);
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileHistorySource::new(temp_dir.path());

        let result = source.fetch_history("nobody").await;
        assert!(matches!(result, Err(FetchError::Io(_))));
    }
}
