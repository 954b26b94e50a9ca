//! Domain layer - Core price-tracking logic and models.
//!
//! Pure logic for the GPU price tracker: catalog, snapshot series,
//! reconciliation, synthetic backfill and read-only views.
//! No I/O here (hexagonal architecture inner ring); randomness is
//! always injected by the caller.

pub mod backfill;
pub mod catalog;
pub mod materializer;
pub mod money;
pub mod reconciler;
pub mod series;
pub mod trend;

// Re-export core types for convenience
pub use catalog::{Alias, AliasTable, Catalog, GpuName, GpuProfile};
pub use materializer::{SeriesRow, materialize};
pub use reconciler::{PriceOrigin, Reconciler, Reconciliation};
pub use series::{ProviderId, ScrapedQuote, Series, SeriesMetadata, Snapshot};
