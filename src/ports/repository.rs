//! Repository Port - Series Persistence Interface
//!
//! Defines the trait for persisting the whole price series as a
//! single document. Writes replace the document atomically: a reader
//! sees either the previous or the new series, never a partial one.

use async_trait::async_trait;

use crate::domain::series::Series;
use crate::error::Result;

/// Trait for series persistence providers.
#[async_trait]
pub trait SeriesRepository: Send + Sync {
  /// Load the persisted series.
  ///
  /// Returns `Series::empty()` when nothing has been persisted yet;
  /// an unreadable or malformed document is an error.
  async fn load(&self) -> Result<Series>;

  /// Replace the persisted series with `series`, atomically.
  async fn save(&self, series: &Series) -> Result<()>;
}
