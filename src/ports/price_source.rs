//! Price Source Port - Provider Quote Interface
//!
//! Defines the uniform capability every price provider exposes:
//! fetch the current on-demand quotes for the tracked catalog.
//! The reconciler only ever sees `ScrapedQuote`s, never a provider's
//! response shape.

use async_trait::async_trait;

use crate::domain::catalog::Catalog;
use crate::domain::series::{ProviderId, ScrapedQuote};

/// Outcome of one provider fetch.
///
/// A failed or timed-out fetch is represented by `failed = true` and
/// no quotes; it is never an error for the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceReport {
  /// Accepted quotes, at most one per canonical GPU.
  pub quotes: Vec<ScrapedQuote>,
  /// Number of candidates discarded by validation (non-positive / below floor).
  pub rejected: usize,
  /// Whether the fetch or parse failed as a whole.
  pub failed: bool,
}

impl SourceReport {
  /// Report for a provider that produced nothing.
  pub fn failed() -> Self {
    Self {
      quotes: Vec::new(),
      rejected: 0,
      failed: true,
    }
  }
}

/// Trait for GPU price providers.
///
/// Implementors issue a single bounded request, parse the provider's
/// response, map provider naming onto the catalog and validate each
/// candidate against its GPU's floor. Implementations must absorb their
/// own network and parse failures.
#[async_trait]
pub trait PriceSource: Send + Sync {
  /// Provider identity used as quote provenance.
  fn provider(&self) -> ProviderId;

  /// Fetch, parse and validate quotes for the given catalog.
  async fn fetch(&self, catalog: &Catalog) -> SourceReport;
}
