//! Configuration Module - TOML-based Tracker Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! The GPU catalog, provider endpoints and HTTP settings are all
//! externalized here - nothing is hardcoded in the domain layer.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

use crate::adapters::providers::{getdeploying, runpod, vastai, HttpFetcherConfig};
use crate::domain::backfill::{DEFAULT_BACKFILL_SEED, DEFAULT_BACKFILL_WEEKS};
use crate::domain::catalog::{Catalog, GpuProfile};

/// Top-level tracker configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any operation runs.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Tracker identity, logging and storage.
  #[serde(default)]
  pub tracker: TrackerConfig,
  /// Provider HTTP settings.
  #[serde(default)]
  pub http: HttpConfig,
  /// Per-provider endpoints.
  #[serde(default)]
  pub providers: ProvidersConfig,
  /// The GPU catalog, in tracking order.
  pub gpus: Vec<GpuProfile>,
}

impl AppConfig {
  /// Build the immutable catalog passed to every component.
  pub fn catalog(&self) -> Catalog {
    Catalog::new(self.gpus.clone())
  }
}

/// Tracker identity and storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
  /// Human-readable tracker name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Log output format.
  #[serde(default)]
  pub log_format: LogFormat,
  /// Path of the persisted price series document.
  #[serde(default = "default_data_file")]
  pub data_file: String,
  /// Number of synthetic weeks generated by `--init`.
  #[serde(default = "default_backfill_weeks")]
  pub backfill_weeks: usize,
  /// Seed for the synthetic backfill.
  #[serde(default = "default_backfill_seed")]
  pub backfill_seed: u64,
}

impl Default for TrackerConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      log_format: LogFormat::default(),
      data_file: default_data_file(),
      backfill_weeks: default_backfill_weeks(),
      backfill_seed: default_backfill_seed(),
    }
  }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
  /// Structured JSON lines.
  #[default]
  Json,
  /// Human-readable output.
  Pretty,
}

/// Provider HTTP settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// User-agent header.
  #[serde(default = "default_user_agent")]
  pub user_agent: String,
}

impl Default for HttpConfig {
  fn default() -> Self {
    Self {
      timeout_seconds: default_timeout(),
      user_agent: default_user_agent(),
    }
  }
}

impl HttpConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_seconds)
  }

  pub fn fetcher_config(&self) -> HttpFetcherConfig {
    HttpFetcherConfig {
      timeout: self.timeout(),
      user_agent: self.user_agent.clone(),
    }
  }
}

/// Endpoint configuration for one provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
  /// Whether this provider is queried.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Fixed request URL; empty means the provider's built-in endpoint.
  #[serde(default)]
  pub url: String,
}

/// All provider endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
  #[serde(default = "default_getdeploying")]
  pub getdeploying: ProviderConfig,
  #[serde(default = "default_runpod")]
  pub runpod: ProviderConfig,
  #[serde(default = "default_vastai")]
  pub vastai: ProviderConfig,
}

impl ProvidersConfig {
  /// Fill every omitted `url` with the provider's built-in endpoint.
  pub fn fill_default_urls(&mut self) {
    for (provider, default_url) in [
      (&mut self.getdeploying, getdeploying::DEFAULT_URL),
      (&mut self.runpod, runpod::DEFAULT_URL),
      (&mut self.vastai, vastai::DEFAULT_URL),
    ] {
      if provider.url.trim().is_empty() {
        provider.url = default_url.to_string();
      }
    }
  }
}

impl Default for ProvidersConfig {
  fn default() -> Self {
    Self {
      getdeploying: default_getdeploying(),
      runpod: default_runpod(),
      vastai: default_vastai(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "gpu-price-tracker".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_data_file() -> String {
  "gpu_pricing_data.json".to_string()
}

fn default_backfill_weeks() -> usize {
  DEFAULT_BACKFILL_WEEKS
}

fn default_backfill_seed() -> u64 {
  DEFAULT_BACKFILL_SEED
}

fn default_true() -> bool {
  true
}

fn default_timeout() -> u64 {
  15
}

fn default_user_agent() -> String {
  "Mozilla/5.0 GPUTracker/1.0".to_string()
}

fn default_getdeploying() -> ProviderConfig {
  ProviderConfig {
    enabled: true,
    url: getdeploying::DEFAULT_URL.to_string(),
  }
}

fn default_runpod() -> ProviderConfig {
  ProviderConfig {
    enabled: true,
    url: runpod::DEFAULT_URL.to_string(),
  }
}

fn default_vastai() -> ProviderConfig {
  ProviderConfig {
    enabled: true,
    url: vastai::DEFAULT_URL.to_string(),
  }
}
