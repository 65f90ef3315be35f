// # Region-Bound HTTP Client
//
// A `reqwest` client paired with the endpoint of one region. The endpoint is
// derived from a template containing a `{region}` placeholder, e.g.
// `https://health.{region}.amazonaws.com`.
//
// Clients are built by `RegionalHttpClientFactory`, which the
// `RegionBoundClientCache` calls once per region binding.

use async_trait::async_trait;
use regionwatch_core::traits::ClientFactory;
use regionwatch_core::{ActiveRegion, Error, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Placeholder substituted with the region code
pub const REGION_PLACEHOLDER: &str = "{region}";

/// Default endpoint template
pub const DEFAULT_ENDPOINT_TEMPLATE: &str = "https://health.{region}.amazonaws.com";

/// Default HTTP timeout for service requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client bound to the endpoint of one region
#[derive(Debug, Clone)]
pub struct RegionalHttpClient {
    region: ActiveRegion,
    endpoint: String,
    client: reqwest::Client,
}

impl RegionalHttpClient {
    /// Region this client is bound to
    pub fn region(&self) -> &ActiveRegion {
        &self.region
    }

    /// Base URL of the regional endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET `path` with `query` and decode the JSON response
    ///
    /// # Returns
    ///
    /// - `Ok(T)`: Decoded response body
    /// - `Err(Error::Http)`: Transport failure
    /// - `Err(Error::Service)`: Non-success status or undecodable body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.endpoint, path);
        debug!(region = %self.region, url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::service(format!(
                "{} returned {}: {}",
                url,
                status,
                body.trim()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::service(format!("Invalid response from {}: {}", url, e)))
    }
}

/// Builds [`RegionalHttpClient`]s from an endpoint template
#[derive(Debug, Clone)]
pub struct RegionalHttpClientFactory {
    endpoint_template: String,
    timeout: Duration,
}

impl RegionalHttpClientFactory {
    /// Create a factory
    ///
    /// # Parameters
    ///
    /// - `endpoint_template`: Base URL containing `{region}`
    /// - `timeout`: Per-request timeout
    pub fn new(endpoint_template: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint_template = endpoint_template.into();

        if !endpoint_template.contains(REGION_PLACEHOLDER) {
            return Err(Error::config(format!(
                "Endpoint template must contain {}: {}",
                REGION_PLACEHOLDER, endpoint_template
            )));
        }
        if !endpoint_template.starts_with("https://") && !endpoint_template.starts_with("http://")
        {
            return Err(Error::config(format!(
                "Endpoint template must use HTTP or HTTPS scheme: {}",
                endpoint_template
            )));
        }

        Ok(Self {
            endpoint_template,
            timeout,
        })
    }

    /// Endpoint URL for `region`
    pub fn endpoint_for(&self, region: &ActiveRegion) -> String {
        self.endpoint_template
            .replace(REGION_PLACEHOLDER, region.as_str())
            .trim_end_matches('/')
            .to_string()
    }
}

impl Default for RegionalHttpClientFactory {
    fn default() -> Self {
        Self {
            endpoint_template: DEFAULT_ENDPOINT_TEMPLATE.to_string(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

#[async_trait]
impl ClientFactory for RegionalHttpClientFactory {
    type Client = RegionalHttpClient;

    async fn connect(&self, region: &ActiveRegion) -> Result<RegionalHttpClient> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::client_construction(region, e.to_string()))?;

        Ok(RegionalHttpClient {
            region: region.clone(),
            endpoint: self.endpoint_for(region),
            client,
        })
    }
}
