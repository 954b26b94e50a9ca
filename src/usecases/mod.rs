//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the tracker's workflows. Each use case is a self-contained
//! operation.
//!
//! Use cases:
//! - `SnapshotStore`: Series lifecycle (initialize, append, load)
//! - `Collector`: Provider fan-out + reconciliation + append

pub mod collector;
pub mod snapshot_store;

pub use collector::{CollectionReport, CollectionStats, Collector, ProviderStats};
pub use snapshot_store::{AppendOutcome, SnapshotStore};
