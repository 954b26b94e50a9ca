//! Store-level errors.
//!
//! These are the only failures that halt a run. Provider failures never
//! surface here: they are absorbed at the adapter boundary.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(
        "price series already initialized ({entries} entries); remove the data file to re-initialize"
    )]
    AlreadyInitialized { entries: usize },

    #[error("no price data yet; run with --init first")]
    NotInitialized,

    #[error("corrupt price series at {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("price series at {} is inconsistent: {reason}", path.display())]
    Inconsistent { path: PathBuf, reason: String },

    #[error(
        "tracked GPUs in the price series ({persisted:?}) do not match the configured catalog ({configured:?})"
    )]
    CatalogMismatch {
        persisted: Vec<String>,
        configured: Vec<String>,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize price series: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
