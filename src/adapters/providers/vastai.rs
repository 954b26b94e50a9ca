//! vast.ai - Verified On-Demand Offer Bundles
//!
//! The bundles endpoint returns individual machine offers, many per GPU
//! model. Every offer becomes one candidate; validation then keeps the
//! cheapest admissible offer per canonical GPU, so a junk offer below
//! the floor never hides a real one.

use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::http::HttpFetcher;
use super::{Candidate, validate_candidates};
use crate::domain::catalog::{Alias, AliasTable, Catalog};
use crate::domain::series::ProviderId;
use crate::ports::price_source::SourceReport;

/// Default bundles query: verified on-demand offers.
pub const DEFAULT_URL: &str = "https://cloud.vast.ai/api/v0/bundles/?q={%22type%22:%22on-demand%22,%22verified%22:{%22eq%22:true}}";

/// vast.ai `gpu_name` fragments per canonical GPU.
pub const ALIASES: &[Alias] = &[
    Alias::new("H100 SXM", "H100"),
    Alias::new("H200 SXM", "H200"),
    Alias::new("A100 80GB", "A100_SXM"),
    Alias::new("RTX 4090", "RTX_4090"),
    Alias::new("RTX 3090", "RTX_3090"),
    Alias::new("L40S", "L40S"),
    Alias::new("L4", "L4"),
    Alias::new("T4", "T4"),
    Alias::new("A40", "A40"),
    Alias::new("RTX 5090", "RTX_5090"),
    Alias::new("AMD MI300X", "MI300X"),
];

#[derive(Debug, Deserialize)]
struct BundlesResponse {
    #[serde(default)]
    offers: Vec<Offer>,
}

#[derive(Debug, Deserialize)]
struct Offer {
    #[serde(default)]
    gpu_name: String,
    /// Total dollars per hour for the offer.
    dph_total: Option<f64>,
}

/// vast.ai price source.
#[derive(Debug, Clone)]
pub struct VastAiSource {
    http: HttpFetcher,
    url: String,
}

impl VastAiSource {
    pub fn new(http: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    #[instrument(skip(self, catalog), fields(provider = %ProviderId::VastAi))]
    pub async fn fetch(&self, catalog: &Catalog) -> SourceReport {
        info!("Scraping vast.ai");

        let result = self
            .http
            .get_json::<serde_json::Value>(&self.url)
            .await
            .and_then(parse_response);

        match result {
            Ok(candidates) => {
                let aliases = AliasTable::new(ALIASES, catalog);
                validate_candidates(ProviderId::VastAi, catalog, &aliases, candidates)
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "vast.ai failed");
                SourceReport::failed()
            }
        }
    }
}

/// One candidate per named offer; an offer without a price counts as 0.
pub fn parse_response(body: serde_json::Value) -> anyhow::Result<Vec<Candidate>> {
    let response: BundlesResponse = serde_json::from_value(body)?;

    Ok(response
        .offers
        .into_iter()
        .filter(|offer| !offer.gpu_name.is_empty())
        .map(|offer| Candidate::new(offer.gpu_name, offer.dph_total.unwrap_or(0.0)))
        .collect())
}
