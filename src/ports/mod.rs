//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `PriceSource`: Per-provider GPU price quotes
//! - `SeriesRepository`: Persisted snapshot series (JSON document)

pub mod price_source;
pub mod repository;

pub use price_source::{PriceSource, SourceReport};
pub use repository::SeriesRepository;
