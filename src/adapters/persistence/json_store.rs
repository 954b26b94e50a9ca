//! JSON Series Store - Atomic Price Series Persistence
//!
//! Saves the whole price series to a single JSON document using atomic
//! writes (write to tmp file, then rename). The file is always either
//! the old or the new series, never a partial write. Each entry's
//! prices are written in tracked (catalog) order.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{info, instrument};

use crate::domain::series::Series;
use crate::error::{Result, StoreError};
use crate::ports::repository::SeriesRepository;

/// Atomic JSON document store for the price series.
pub struct JsonSeriesStore {
    /// Path to the series document.
    path: PathBuf,
    /// Temporary path for atomic writes.
    tmp_path: PathBuf,
}

impl JsonSeriesStore {
    /// Create a store for the given document path.
    ///
    /// Nothing is touched on disk until the first save.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        Self {
            path,
            tmp_path: PathBuf::from(tmp),
        }
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl SeriesRepository for JsonSeriesStore {
    /// Load the series; a missing file is the empty series.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Series> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No price series found, starting empty");
                return Ok(Series::empty());
            }
            Err(e) => return Err(self.io_error(&self.path, e)),
        };

        let series: Series = serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        if let Some(index) = series.first_incomplete_entry() {
            return Err(StoreError::Inconsistent {
                path: self.path.clone(),
                reason: format!(
                    "entry {index} ({}) does not price exactly the tracked GPUs",
                    series.entries[index].date
                ),
            });
        }

        info!(
            entries = series.len(),
            gpus = series.tracked_gpus().len(),
            "Price series loaded"
        );

        Ok(series)
    }

    /// Save atomically (tmp → rename).
    #[instrument(skip(self, series), fields(path = %self.path.display()))]
    async fn save(&self, series: &Series) -> Result<()> {
        let json = serde_json::to_string_pretty(&ordered_document(series)?)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| self.io_error(dir, e))?;
        }

        // Write to tmp file
        fs::write(&self.tmp_path, &json)
            .await
            .map_err(|e| self.io_error(&self.tmp_path, e))?;

        // Atomic rename
        fs::rename(&self.tmp_path, &self.path)
            .await
            .map_err(|e| self.io_error(&self.path, e))?;

        info!(entries = series.len(), "Price series saved");

        Ok(())
    }
}

/// Serialize the series with every entry's prices in tracked order.
fn ordered_document(series: &Series) -> serde_json::Result<Value> {
    let mut doc = serde_json::to_value(series)?;

    let entries = doc.get_mut("entries").and_then(Value::as_array_mut);
    for entry in entries.into_iter().flatten() {
        let Some(prices) = entry.get_mut("prices").and_then(Value::as_object_mut) else {
            continue;
        };
        let mut ordered = Map::new();
        for gpu in series.tracked_gpus() {
            if let Some(price) = prices.remove(gpu) {
                ordered.insert(gpu.clone(), price);
            }
        }
        ordered.append(prices);
        *prices = ordered;
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::Snapshot;
    use chrono::NaiveDate;

    fn sample() -> Series {
        let d = NaiveDate::from_ymd_opt(2026, 10, 11).unwrap();
        Series::new(
            vec!["T4".to_string(), "L4".to_string()],
            vec![Snapshot::new(d, [("T4".to_string(), 0.29), ("L4".to_string(), 0.39)].into())],
        )
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_series() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSeriesStore::new(dir.path().join("gpu_pricing_data.json"));
        let series = store.load().await.unwrap();
        assert!(series.is_empty());
        assert!(series.tracked_gpus().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSeriesStore::new(dir.path().join("nested/gpu_pricing_data.json"));
        let series = sample();

        store.save(&series).await.unwrap();
        assert!(!dir.path().join("nested/gpu_pricing_data.json.tmp").exists());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, series);
    }

    #[tokio::test]
    async fn test_prices_written_in_tracked_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpu_pricing_data.json");
        JsonSeriesStore::new(&path).save(&sample()).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let prices = &raw[raw.find("\"prices\"").unwrap()..];
        assert!(prices.find("\"T4\"").unwrap() < prices.find("\"L4\"").unwrap());
    }

    #[tokio::test]
    async fn test_malformed_document_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpu_pricing_data.json");
        std::fs::write(&path, "{ \"metadata\": ").unwrap();

        let err = JsonSeriesStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_entry_missing_gpu_is_inconsistent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpu_pricing_data.json");
        std::fs::write(
            &path,
            r#"{"metadata":{"tracked_gpus":["T4","L4"]},
                "entries":[{"date":"2026-10-11","week":"W41","prices":{"T4":0.29}}]}"#,
        )
        .unwrap();

        let err = JsonSeriesStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Inconsistent { .. }));
    }
}
