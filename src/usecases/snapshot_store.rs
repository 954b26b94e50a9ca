//! Snapshot Store - Series Lifecycle over a Repository
//!
//! Owns the series state machine:
//! `Uninitialized → Initialized (initialize) → Extended* (append)`.
//! - `initialize` writes the synthetic backfill, refusing to overwrite
//! - `append` reconciles one new snapshot against the latest entry
//! - `load` is read-only and treats "no file" as the empty series
//!
//! Every write replaces the whole document through the repository, so
//! a failed run leaves the previous series untouched.

use std::sync::Arc;

use chrono::NaiveDate;
use rand::Rng;
use tracing::{info, instrument};

use crate::domain::backfill;
use crate::domain::catalog::Catalog;
use crate::domain::reconciler::{Reconciler, Reconciliation};
use crate::domain::series::{ScrapedQuote, Series, Snapshot};
use crate::error::{Result, StoreError};
use crate::ports::repository::SeriesRepository;

/// Result of a successful append.
#[derive(Debug, Clone)]
pub struct AppendOutcome {
  /// The snapshot that was persisted.
  pub snapshot: Snapshot,
  /// Per-GPU provenance of the snapshot's prices.
  pub reconciliation: Reconciliation,
  /// Entry count after the append.
  pub total_entries: usize,
}

/// Series lifecycle manager.
pub struct SnapshotStore<R: SeriesRepository> {
  /// Persistence port.
  repository: Arc<R>,
  /// Immutable GPU catalog.
  catalog: Catalog,
}

impl<R: SeriesRepository> SnapshotStore<R> {
  /// Create a new store over a repository and catalog.
  pub fn new(repository: Arc<R>, catalog: Catalog) -> Self {
    Self {
      repository,
      catalog,
    }
  }

  pub fn catalog(&self) -> &Catalog {
    &self.catalog
  }

  /// Load the full series (empty when nothing is persisted yet).
  pub async fn load(&self) -> Result<Series> {
    self.repository.load().await
  }

  /// Write `weeks` synthetic snapshots ending one week before `today`.
  ///
  /// Refuses with `AlreadyInitialized` if the series has entries; the
  /// persisted document is left untouched in that case.
  #[instrument(skip(self, rng))]
  pub async fn initialize<G: Rng>(
    &self,
    weeks: usize,
    today: NaiveDate,
    rng: &mut G,
  ) -> Result<Series> {
    if weeks == 0 || weeks > backfill::MAX_BACKFILL_WEEKS {
      return Err(StoreError::InvalidArgument(format!(
        "backfill weeks must be between 1 and {}, got {weeks}",
        backfill::MAX_BACKFILL_WEEKS
      )));
    }

    let existing = self.repository.load().await?;
    if !existing.is_empty() {
      return Err(StoreError::AlreadyInitialized {
        entries: existing.len(),
      });
    }

    let entries = backfill::generate(&self.catalog, weeks, today, rng);
    let series = Series::new(self.catalog.names(), entries);
    self.repository.save(&series).await?;

    info!(
      entries = series.len(),
      gpus = self.catalog.len(),
      "Created synthetic weekly history"
    );

    Ok(series)
  }

  /// Load the series and check it can be extended with this catalog.
  pub async fn load_initialized(&self) -> Result<Series> {
    let series = self.repository.load().await?;
    if series.is_empty() {
      return Err(StoreError::NotInitialized);
    }

    let configured = self.catalog.names();
    if series.tracked_gpus() != configured.as_slice() {
      return Err(StoreError::CatalogMismatch {
        persisted: series.tracked_gpus().to_vec(),
        configured,
      });
    }

    Ok(series)
  }

  /// Reconcile `quotes` into a snapshot dated `today` and persist it.
  pub async fn append<G: Rng>(
    &self,
    quotes: &[ScrapedQuote],
    today: NaiveDate,
    rng: &mut G,
  ) -> Result<AppendOutcome> {
    let series = self.load_initialized().await?;
    self.append_to(series, quotes, today, rng).await
  }

  /// Append to a series previously returned by [`Self::load_initialized`].
  #[instrument(skip(self, series, quotes, rng), fields(entries = series.len()))]
  pub async fn append_to<G: Rng>(
    &self,
    mut series: Series,
    quotes: &[ScrapedQuote],
    today: NaiveDate,
    rng: &mut G,
  ) -> Result<AppendOutcome> {
    let previous = series.latest().ok_or(StoreError::NotInitialized)?;
    if today < previous.date {
      return Err(StoreError::InvalidArgument(format!(
        "snapshot date {today} is earlier than the latest entry ({})",
        previous.date
      )));
    }

    let reconciliation = Reconciler::new(&self.catalog).reconcile(Some(previous), quotes, rng);
    let snapshot = Snapshot::new(today, reconciliation.price_map());

    series.entries.push(snapshot.clone());
    self.repository.save(&series).await?;

    info!(
      week = %snapshot.week,
      live = reconciliation.live_count(),
      estimated = reconciliation.estimated_count(),
      total = series.len(),
      "Snapshot appended"
    );

    Ok(AppendOutcome {
      snapshot,
      reconciliation,
      total_entries: series.len(),
    })
  }
}
