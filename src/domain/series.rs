//! Snapshot series types.
//!
//! The persisted document is a `Series`: the fixed list of tracked GPUs
//! plus an append-only, chronologically ordered list of weekly
//! `Snapshot`s. `ScrapedQuote` is the ephemeral per-provider candidate
//! price that only lives for the duration of one collection run.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::catalog::GpuName;

// ────────────────────────────────────────────
// Providers and quotes
// ────────────────────────────────────────────

/// Identity of a price provider, used as provenance on quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    GetDeploying,
    RunPod,
    VastAi,
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetDeploying => write!(f, "getdeploying"),
            Self::RunPod => write!(f, "runpod"),
            Self::VastAi => write!(f, "vast.ai"),
        }
    }
}

/// A validated candidate price from one provider for one GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedQuote {
    /// Canonical GPU name.
    pub gpu: GpuName,
    /// Price in $/hr, already checked against the GPU's floor.
    pub price: f64,
    /// Provider the quote came from.
    pub provider: ProviderId,
}

// ────────────────────────────────────────────
// Snapshots
// ────────────────────────────────────────────

/// ISO week label in the persisted `W##` form.
pub fn week_label(date: NaiveDate) -> String {
    format!("W{:02}", date.iso_week().week())
}

/// One weekly price observation for every tracked GPU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// ISO week label (`W##`).
    pub week: String,
    /// Price per canonical GPU name ($/hr).
    pub prices: BTreeMap<GpuName, f64>,
}

impl Snapshot {
    /// Build a snapshot, deriving the week label from the date.
    pub fn new(date: NaiveDate, prices: BTreeMap<GpuName, f64>) -> Self {
        Self {
            date,
            week: week_label(date),
            prices,
        }
    }

    pub fn price(&self, gpu: &str) -> Option<f64> {
        self.prices.get(gpu).copied()
    }

    /// True when the snapshot prices exactly the given GPUs, no more, no less.
    pub fn covers_exactly(&self, gpus: &[GpuName]) -> bool {
        self.prices.len() == gpus.len() && gpus.iter().all(|g| self.prices.contains_key(g))
    }
}

// ────────────────────────────────────────────
// Series (the persisted document)
// ────────────────────────────────────────────

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    /// Tracked GPUs, fixed at initialization.
    pub tracked_gpus: Vec<GpuName>,
}

/// The whole persisted time series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub metadata: SeriesMetadata,
    pub entries: Vec<Snapshot>,
}

impl Series {
    /// The "no data yet" series: no tracked GPUs, no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(tracked_gpus: Vec<GpuName>, entries: Vec<Snapshot>) -> Self {
        Self {
            metadata: SeriesMetadata { tracked_gpus },
            entries,
        }
    }

    pub fn tracked_gpus(&self) -> &[GpuName] {
        &self.metadata.tracked_gpus
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    /// Index of the first entry that does not price exactly the tracked GPUs.
    pub fn first_incomplete_entry(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| !e.covers_exactly(&self.metadata.tracked_gpus))
    }
}
