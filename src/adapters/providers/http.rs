//! Provider HTTP Client - Bounded Single-Shot GET Requests
//!
//! Wraps reqwest with the fixed request timeout and user-agent shared
//! by every price provider. No retries, no pagination, no auth: a
//! provider gets one attempt per collection run.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Configuration for the provider HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
  /// Per-request timeout.
  pub timeout: Duration,
  /// User-agent header sent with every request.
  pub user_agent: String,
}

impl Default for HttpFetcherConfig {
  fn default() -> Self {
    Self {
      timeout: Duration::from_secs(15),
      user_agent: "Mozilla/5.0 GPUTracker/1.0".to_string(),
    }
  }
}

/// Shared HTTP client for provider fetches.
///
/// Cheap to clone: the underlying connection pool is reference-counted.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  /// Underlying HTTP client.
  http: Client,
}

impl HttpFetcher {
  /// Create a new fetcher.
  pub fn new(config: HttpFetcherConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .user_agent(config.user_agent)
      .pool_max_idle_per_host(2)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self { http })
  }

  /// GET a URL and return the body as text. Non-2xx is an error.
  pub async fn get_text(&self, url: &str) -> Result<String> {
    debug!(url, "GET");
    let response = self
      .http
      .get(url)
      .send()
      .await
      .with_context(|| format!("Request to {url} failed"))?
      .error_for_status()
      .with_context(|| format!("Request to {url} returned an error status"))?;

    response
      .text()
      .await
      .with_context(|| format!("Failed to read body from {url}"))
  }

  /// GET a URL and decode the JSON body. Non-2xx is an error.
  pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
    let body = self.get_text(url).await?;
    serde_json::from_str(&body).with_context(|| format!("Unexpected JSON shape from {url}"))
  }
}
