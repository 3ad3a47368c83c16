//! Position feed HTTP client.
//!
//! Fetches the full vehicle snapshot from the backend's `get_all_data`
//! endpoint and converts it to domain types.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::debug;

use super::convert::{ConvertedSnapshot, convert_snapshot};
use super::error::FeedError;
use super::types::RawSnapshot;

/// Path of the snapshot endpoint, relative to the base URL.
const SNAPSHOT_PATH: &str = "/get_all_data";

/// Default category prefix of vehicle keys.
const DEFAULT_CATEGORY: &str = "bus";

/// Default request timeout. Kept below the default poll interval.
const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Anything that can produce a vehicle snapshot.
///
/// The poller is generic over this so it can run against the live feed,
/// the mock feed, or a scripted source in tests.
pub trait PositionSource: Send + Sync + 'static {
    /// Fetch and convert the current snapshot.
    fn fetch_snapshot(&self) -> impl Future<Output = Result<ConvertedSnapshot, FeedError>> + Send;
}

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL of the backend (e.g. "http://localhost:8000")
    pub base_url: String,
    /// Key categories to keep (the part before ':')
    pub categories: Vec<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedConfig {
    /// Create a new config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            categories: vec![DEFAULT_CATEGORY.to_string()],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Replace the tracked categories.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Full URL of the snapshot endpoint.
    pub fn snapshot_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SNAPSHOT_PATH)
    }
}

/// Client for the vehicle position feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    url: String,
    categories: Vec<String>,
}

impl FeedClient {
    /// Create a new feed client with the given configuration.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.snapshot_url(),
            categories: config.categories,
        })
    }

    /// Get the raw snapshot body, without category filtering.
    pub async fn get_raw(&self) -> Result<RawSnapshot, FeedError> {
        let response = self.http.get(&self.url).send().await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| FeedError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }

    /// Get the current snapshot, converted to domain vehicles.
    pub async fn get_snapshot(&self) -> Result<ConvertedSnapshot, FeedError> {
        let raw = self.get_raw().await?;
        let converted = convert_snapshot(&raw, &self.categories);

        debug!(
            keys = raw.len(),
            vehicles = converted.vehicles.len(),
            skipped = converted.skipped,
            "Fetched snapshot"
        );

        Ok(converted)
    }
}

impl PositionSource for FeedClient {
    async fn fetch_snapshot(&self) -> Result<ConvertedSnapshot, FeedError> {
        self.get_snapshot().await
    }
}
