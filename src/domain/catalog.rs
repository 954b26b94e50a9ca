//! GPU catalog: the fixed set of tracked GPUs and their price profiles.
//!
//! A `Catalog` is built once at startup from configuration and passed
//! by reference into the reconciler, the snapshot store and every price
//! source. It is never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Canonical GPU name as it appears in the persisted series.
pub type GpuName = String;

/// Price profile for one tracked GPU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuProfile {
    /// Canonical name (e.g. "H100 SXM").
    pub name: GpuName,
    /// Price at the start of the synthetic backfill window ($/hr).
    pub start_price: f64,
    /// Anchor for the synthetic walk and end of the backfill window ($/hr).
    pub current_price: f64,
    /// Maximum random perturbation applied per backfill step.
    pub volatility: f64,
    /// Minimum admissible price ($/hr).
    pub floor: f64,
}

impl GpuProfile {
    /// Whether a candidate price is admissible for this GPU.
    pub fn admits(&self, price: f64) -> bool {
        super::money::is_positive_price(price) && price >= self.floor
    }
}

/// Immutable, ordered collection of GPU profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    profiles: Vec<GpuProfile>,
}

impl Catalog {
    /// Build a catalog, preserving the given order.
    pub fn new(profiles: Vec<GpuProfile>) -> Self {
        Self { profiles }
    }

    /// Profiles in tracking order.
    pub fn profiles(&self) -> &[GpuProfile] {
        &self.profiles
    }

    /// Look up a profile by canonical name.
    pub fn get(&self, name: &str) -> Option<&GpuProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Position of a GPU in tracking order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.name == name)
    }

    /// Canonical names in tracking order.
    pub fn names(&self) -> Vec<GpuName> {
        self.profiles.iter().map(|p| p.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// A provider-specific name fragment pointing at a canonical GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alias {
    /// Canonical catalog name.
    pub canonical: &'static str,
    /// Fragment searched for (case-insensitively) in the provider's name.
    pub fragment: &'static str,
}

impl Alias {
    pub const fn new(canonical: &'static str, fragment: &'static str) -> Self {
        Self {
            canonical,
            fragment,
        }
    }
}

/// Resolves provider GPU names to canonical catalog names.
///
/// A provider name resolves to at most one GPU: among all aliases whose
/// fragment occurs in the name, the longest fragment wins, and equal
/// lengths go to the GPU listed first in the catalog. Aliases whose
/// canonical name is not tracked are dropped at construction.
#[derive(Debug, Clone)]
pub struct AliasTable {
    /// (canonical, lowercased fragment, catalog position)
    entries: Vec<(GpuName, String, usize)>,
}

impl AliasTable {
    pub fn new(aliases: &[Alias], catalog: &Catalog) -> Self {
        let entries = aliases
            .iter()
            .filter_map(|a| {
                catalog
                    .position(a.canonical)
                    .map(|pos| (a.canonical.to_string(), a.fragment.to_lowercase(), pos))
            })
            .collect();
        Self { entries }
    }

    /// Every tracked GPU maps to its own canonical name.
    pub fn identity(catalog: &Catalog) -> Self {
        let entries = catalog
            .profiles()
            .iter()
            .enumerate()
            .map(|(pos, p)| (p.name.clone(), p.name.to_lowercase(), pos))
            .collect();
        Self { entries }
    }

    /// Resolve a provider name to a canonical GPU name.
    pub fn resolve(&self, provider_name: &str) -> Option<&str> {
        let haystack = provider_name.to_lowercase();
        self.entries
            .iter()
            .filter(|(_, fragment, _)| !fragment.is_empty() && haystack.contains(fragment.as_str()))
            .min_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.2.cmp(&b.2)))
            .map(|(canonical, _, _)| canonical.as_str())
    }

    /// Distinct lowercased fragments with their canonical names.
    pub fn fragments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(canonical, fragment, _)| (canonical.as_str(), fragment.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
