//! HTTP client for the remote weather provider (WeatherAPI).

use reqwest::Client;
use std::time::Duration;

use crate::error::ProviderError;
use crate::types::Snapshot;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Remote observation source: current conditions for a free-text location
/// query, authenticated with an API key.
///
/// The base URL comes from configuration (tests point it at a mock server).
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, ProviderError> {
        Self::with_timeout(api_key, base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current conditions for a location query.
    ///
    /// Fails with a tagged [`ProviderError`] on transport errors, non-success
    /// status codes, or payloads that don't match the expected schema.
    pub async fn fetch_by_query(&self, query: &str) -> Result<Snapshot, ProviderError> {
        let url = format!("{}/current.json", self.base_url);

        tracing::debug!(query, "Requesting current weather");

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, query, "Weather provider returned error status");
            return Err(ProviderError::Status(status));
        }

        let body = response.bytes().await?;
        let snapshot: Snapshot = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(query, "Weather payload failed to parse: {}", e);
            ProviderError::Parse(e.to_string())
        })?;

        tracing::debug!(
            location = %snapshot.location.name,
            temp_c = snapshot.current.temp_c,
            "Received current weather"
        );
        Ok(snapshot)
    }
}
