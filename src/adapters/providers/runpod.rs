//! RunPod - GraphQL GPU Type Listing
//!
//! A single unauthenticated GraphQL query returns every GPU type with
//! its lowest on-demand (`minPricePerHr`) and bid (`minimumBidPrice`)
//! price. Display names are mapped onto the catalog by alias.

use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::http::HttpFetcher;
use super::{Candidate, validate_candidates};
use crate::domain::catalog::{Alias, AliasTable, Catalog};
use crate::domain::series::ProviderId;
use crate::ports::price_source::SourceReport;

/// Default GraphQL endpoint with the query inlined.
pub const DEFAULT_URL: &str = "https://api.runpod.io/graphql?query={gpuTypes{id%20displayName%20lowestPrice{minimumBidPrice%20minPricePerHr}}}";

/// RunPod display-name fragments per canonical GPU.
pub const ALIASES: &[Alias] = &[
    Alias::new("H100 SXM", "H100 SXM"),
    Alias::new("H200 SXM", "H200"),
    Alias::new("A100 80GB", "A100 80GB"),
    Alias::new("A100 40GB", "A100"),
    Alias::new("RTX 4090", "RTX 4090"),
    Alias::new("RTX 3090", "RTX 3090"),
    Alias::new("L40S", "L40S"),
    Alias::new("L40", "L40"),
    Alias::new("L4", "L4"),
    Alias::new("T4", "T4"),
    Alias::new("RTX 5090", "RTX 5090"),
    Alias::new("RTX 6000 Ada", "RTX 6000"),
    Alias::new("A40", "A40"),
    Alias::new("AMD MI300X", "MI300X"),
];

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<GpuTypesData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GpuTypesData {
    #[serde(default)]
    gpu_types: Vec<GpuType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GpuType {
    #[serde(default)]
    display_name: String,
    lowest_price: Option<LowestPrice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LowestPrice {
    min_price_per_hr: Option<f64>,
    minimum_bid_price: Option<f64>,
}

impl LowestPrice {
    /// On-demand price if set and non-zero, else the bid price, else 0.
    fn effective(&self) -> f64 {
        [self.min_price_per_hr, self.minimum_bid_price]
            .into_iter()
            .flatten()
            .find(|p| *p != 0.0)
            .unwrap_or(0.0)
    }
}

/// RunPod price source.
#[derive(Debug, Clone)]
pub struct RunPodSource {
    http: HttpFetcher,
    url: String,
}

impl RunPodSource {
    pub fn new(http: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    #[instrument(skip(self, catalog), fields(provider = %ProviderId::RunPod))]
    pub async fn fetch(&self, catalog: &Catalog) -> SourceReport {
        info!("Scraping RunPod");

        let result = self
            .http
            .get_json::<serde_json::Value>(&self.url)
            .await
            .and_then(parse_response);

        match result {
            Ok(candidates) => {
                let aliases = AliasTable::new(ALIASES, catalog);
                validate_candidates(ProviderId::RunPod, catalog, &aliases, candidates)
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "RunPod failed");
                SourceReport::failed()
            }
        }
    }
}

/// Extract `(displayName, price)` pairs; GPU types without pricing are skipped.
pub fn parse_response(body: serde_json::Value) -> anyhow::Result<Vec<Candidate>> {
    let response: GraphQlResponse = serde_json::from_value(body)?;

    Ok(response
        .data
        .map(|d| d.gpu_types)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|gpu| {
            gpu.lowest_price
                .map(|lp| Candidate::new(gpu.display_name, lp.effective()))
        })
        .collect())
}
