//! Price Provider Adapters - Per-Provider Fetch, Parse, Validate
//!
//! Each provider issues one bounded HTTP GET and parses its own
//! response shape into `(provider name, price)` candidates. The shared
//! [`validate_candidates`] step maps names onto the catalog, applies
//! the floor check and logs every decision, so all providers emit the
//! same `SourceReport` regardless of how fragile their parsing is.
//!
//! Providers:
//! - `getdeploying`: HTML reference page (substring + regex)
//! - `runpod`: GraphQL JSON (nested `lowestPrice` fields)
//! - `vastai`: offer bundles JSON (cheapest offer per GPU)

pub mod getdeploying;
pub mod http;
pub mod runpod;
pub mod vastai;

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, info};

pub use getdeploying::GetDeployingSource;
pub use http::{HttpFetcher, HttpFetcherConfig};
pub use runpod::RunPodSource;
pub use vastai::VastAiSource;

use crate::config::ProvidersConfig;
use crate::domain::catalog::{AliasTable, Catalog};
use crate::domain::series::{ProviderId, ScrapedQuote};
use crate::ports::price_source::{PriceSource, SourceReport};

/// A raw price candidate as named by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Provider-side GPU name (or matched name fragment).
    pub name: String,
    /// Parsed price ($/hr), not yet validated.
    pub price: f64,
}

impl Candidate {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Map candidates onto the catalog, validate, and keep the cheapest
/// accepted quote per canonical GPU.
///
/// Unmapped names are ignored. Candidates that are non-positive or below
/// their GPU's floor are counted as rejected and logged.
pub fn validate_candidates(
    provider: ProviderId,
    catalog: &Catalog,
    aliases: &AliasTable,
    candidates: Vec<Candidate>,
) -> SourceReport {
    let mut best: BTreeMap<String, f64> = BTreeMap::new();
    let mut rejected = 0;

    for candidate in candidates {
        let Some(gpu) = aliases.resolve(&candidate.name) else {
            debug!(provider = %provider, name = %candidate.name, "No catalog match");
            continue;
        };
        let Some(profile) = catalog.get(gpu) else {
            continue;
        };

        let price = candidate.price;
        if !profile.admits(price) {
            let reason = if crate::domain::money::is_positive_price(price) {
                "below floor"
            } else {
                "non-positive"
            };
            info!(
                provider = %provider,
                gpu,
                price,
                floor = profile.floor,
                reason,
                "Quote rejected"
            );
            rejected += 1;
            continue;
        }

        info!(provider = %provider, gpu, price, "Quote accepted");
        best.entry(gpu.to_string())
            .and_modify(|p| *p = p.min(price))
            .or_insert(price);
    }

    // Emit in catalog order
    let quotes = catalog
        .profiles()
        .iter()
        .filter_map(|p| {
            best.get(&p.name).map(|&price| ScrapedQuote {
                gpu: p.name.clone(),
                price,
                provider,
            })
        })
        .collect();

    SourceReport {
        quotes,
        rejected,
        failed: false,
    }
}

/// Tagged provider variant: the reconciler and collector see one type.
#[derive(Debug, Clone)]
pub enum ProviderAdapter {
    GetDeploying(GetDeployingSource),
    RunPod(RunPodSource),
    VastAi(VastAiSource),
}

impl ProviderAdapter {
    /// Build every enabled provider from configuration.
    pub fn from_config(config: &ProvidersConfig, http: &HttpFetcher) -> Vec<Self> {
        let mut adapters = Vec::new();
        if config.getdeploying.enabled {
            adapters.push(Self::GetDeploying(GetDeployingSource::new(
                http.clone(),
                config.getdeploying.url.clone(),
            )));
        }
        if config.runpod.enabled {
            adapters.push(Self::RunPod(RunPodSource::new(
                http.clone(),
                config.runpod.url.clone(),
            )));
        }
        if config.vastai.enabled {
            adapters.push(Self::VastAi(VastAiSource::new(
                http.clone(),
                config.vastai.url.clone(),
            )));
        }
        adapters
    }
}

#[async_trait]
impl PriceSource for ProviderAdapter {
    fn provider(&self) -> ProviderId {
        match self {
            Self::GetDeploying(_) => ProviderId::GetDeploying,
            Self::RunPod(_) => ProviderId::RunPod,
            Self::VastAi(_) => ProviderId::VastAi,
        }
    }

    async fn fetch(&self, catalog: &Catalog) -> SourceReport {
        match self {
            Self::GetDeploying(source) => source.fetch(catalog).await,
            Self::RunPod(source) => source.fetch(catalog).await,
            Self::VastAi(source) => source.fetch(catalog).await,
        }
    }
}
