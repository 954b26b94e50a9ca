//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;
use crate::domain::backfill::MAX_BACKFILL_WEEKS;

/// Load and validate configuration from a TOML file.
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)
    .with_context(|| format!("Invalid configuration in {}", path.display()))?;

  info!(
    gpus = config.gpus.len(),
    data_file = %config.tracker.data_file,
    timeout_s = config.http.timeout_seconds,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let mut config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;
  config.providers.fill_default_urls();

  validate_config(&config)?;

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A non-empty catalog with unique GPU names
/// - Strictly positive prices and floors, non-negative volatility
/// - A usable backfill window and request timeout
/// - http(s) URLs for every provider
fn validate_config(config: &AppConfig) -> Result<()> {
  // Catalog validation
  anyhow::ensure!(
    !config.gpus.is_empty(),
    "At least one GPU must be configured under [[gpus]]"
  );

  let mut seen = HashSet::new();
  for (i, gpu) in config.gpus.iter().enumerate() {
    anyhow::ensure!(
      !gpu.name.trim().is_empty(),
      "GPU {} has an empty name",
      i
    );
    anyhow::ensure!(
      seen.insert(gpu.name.as_str()),
      "GPU {} ({}) is listed more than once",
      i,
      gpu.name
    );
    anyhow::ensure!(
      gpu.start_price > 0.0 && gpu.start_price.is_finite(),
      "GPU {} ({}) start_price must be positive, got {}",
      i,
      gpu.name,
      gpu.start_price
    );
    anyhow::ensure!(
      gpu.current_price > 0.0 && gpu.current_price.is_finite(),
      "GPU {} ({}) current_price must be positive, got {}",
      i,
      gpu.name,
      gpu.current_price
    );
    anyhow::ensure!(
      gpu.floor > 0.0 && gpu.floor.is_finite(),
      "GPU {} ({}) floor must be positive, got {}",
      i,
      gpu.name,
      gpu.floor
    );
    anyhow::ensure!(
      gpu.volatility >= 0.0 && gpu.volatility.is_finite(),
      "GPU {} ({}) volatility must be >= 0, got {}",
      i,
      gpu.name,
      gpu.volatility
    );
  }

  // Tracker validation
  anyhow::ensure!(
    (1..=MAX_BACKFILL_WEEKS).contains(&config.tracker.backfill_weeks),
    "backfill_weeks must be between 1 and {}, got {}",
    MAX_BACKFILL_WEEKS,
    config.tracker.backfill_weeks
  );
  anyhow::ensure!(
    !config.tracker.data_file.trim().is_empty(),
    "data_file must not be empty"
  );

  // HTTP validation
  anyhow::ensure!(
    config.http.timeout_seconds >= 1,
    "timeout_seconds must be at least 1, got {}",
    config.http.timeout_seconds
  );

  // Provider validation
  for (name, provider) in [
    ("getdeploying", &config.providers.getdeploying),
    ("runpod", &config.providers.runpod),
    ("vastai", &config.providers.vastai),
  ] {
    anyhow::ensure!(
      provider.url.starts_with("http://") || provider.url.starts_with("https://"),
      "Provider {} url must be http(s), got {:?}",
      name,
      provider.url
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::providers::{runpod, vastai};
  use crate::config::LogFormat;

  const MINIMAL: &str = r#"
[[gpus]]
name = "T4"
start_price = 0.45
current_price = 0.29
volatility = 0.02
floor = 0.10
"#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_minimal_config_gets_defaults() {
    let config = parse_config(MINIMAL).unwrap();
    assert_eq!(config.tracker.backfill_weeks, 20);
    assert_eq!(config.tracker.backfill_seed, 42);
    assert_eq!(config.tracker.data_file, "gpu_pricing_data.json");
    assert_eq!(config.tracker.log_format, LogFormat::Json);
    assert_eq!(config.http.timeout_seconds, 15);
    assert!(config.providers.runpod.enabled);
    assert_eq!(config.catalog().names(), vec!["T4".to_string()]);
  }

  #[test]
  fn test_rejects_empty_catalog() {
    assert!(parse_config("gpus = []\n").is_err());
  }

  #[test]
  fn test_rejects_duplicate_gpu() {
    let doubled = format!("{MINIMAL}{MINIMAL}");
    let err = parse_config(&doubled).unwrap_err();
    assert!(format!("{err:#}").contains("more than once"));
  }

  #[test]
  fn test_rejects_non_positive_floor() {
    let bad = MINIMAL.replace("floor = 0.10", "floor = 0.0");
    assert!(parse_config(&bad).is_err());
  }

  #[test]
  fn test_provider_section_without_url_gets_default_endpoint() {
    let text = format!("{MINIMAL}\n[providers.vastai]\nenabled = true\n");
    let config = parse_config(&text).unwrap();
    assert!(config.providers.vastai.enabled);
    assert_eq!(config.providers.vastai.url, vastai::DEFAULT_URL);

    let text = format!("{MINIMAL}\n[providers.runpod]\nenabled = false\n");
    let config = parse_config(&text).unwrap();
    assert!(!config.providers.runpod.enabled);
    assert_eq!(config.providers.runpod.url, runpod::DEFAULT_URL);
  }

  #[test]
  fn test_explicit_provider_url_is_kept() {
    let local = "[providers.getdeploying]\nurl = \"http://127.0.0.1:8080/gpus\"\n";
    let text = format!("{MINIMAL}\n{local}");
    let config = parse_config(&text).unwrap();
    assert_eq!(config.providers.getdeploying.url, "http://127.0.0.1:8080/gpus");

    let text = format!("{MINIMAL}\n[providers.getdeploying]\nurl = \"ftp://x\"\n");
    assert!(parse_config(&text).is_err());
  }

  #[test]
  fn test_shipped_config_is_valid() {
    let config = parse_config(include_str!("../../config.toml")).unwrap();
    assert_eq!(config.gpus.len(), 20);
    assert!(config.catalog().get("H100 SXM").is_some());
  }
}
