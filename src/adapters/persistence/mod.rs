//! Persistence Adapters - JSON Document Storage
//!
//! Implements the `SeriesRepository` port with a single JSON document
//! written atomically. No database dependency: the whole series is
//! small enough to rewrite on every weekly append.

pub mod json_store;

pub use json_store::JsonSeriesStore;
