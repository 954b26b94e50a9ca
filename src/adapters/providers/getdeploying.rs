//! getdeploying.com - HTML Price Reference Page
//!
//! The reference page lists every GPU by its marketing name followed
//! by a "From $X/h" starting price. There is no API, so the page is
//! searched textually: first whole-word occurrence of each GPU name,
//! then the first price pattern within a short window after it.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use tracing::{info, instrument, warn};

use super::http::HttpFetcher;
use super::{Candidate, validate_candidates};
use crate::domain::catalog::{AliasTable, Catalog};
use crate::domain::series::ProviderId;
use crate::ports::price_source::SourceReport;

/// Default reference page URL.
pub const DEFAULT_URL: &str = "https://getdeploying.com/reference/cloud-gpu";

/// How far after a GPU name the price may appear (bytes).
const PRICE_WINDOW: usize = 300;

static PRICE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"From\s*\$(\d+\.?\d*)/h").expect("Invalid regex"));

/// getdeploying.com price source.
#[derive(Debug, Clone)]
pub struct GetDeployingSource {
    http: HttpFetcher,
    url: String,
}

impl GetDeployingSource {
    pub fn new(http: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    #[instrument(skip(self, catalog), fields(provider = %ProviderId::GetDeploying))]
    pub async fn fetch(&self, catalog: &Catalog) -> SourceReport {
        info!(url = %self.url, "Scraping getdeploying.com");

        let aliases = AliasTable::identity(catalog);
        let result = self
            .http
            .get_text(&self.url)
            .await
            .and_then(|page| parse_page(&page, &aliases));

        match result {
            Ok(candidates) => {
                validate_candidates(ProviderId::GetDeploying, catalog, &aliases, candidates)
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "getdeploying failed");
                SourceReport::failed()
            }
        }
    }
}

/// Extract `(name, price)` pairs from the reference page.
///
/// Names that appear on the page without a price nearby yield nothing.
pub fn parse_page(page: &str, aliases: &AliasTable) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();

    for (_, fragment) in aliases.fragments() {
        let pattern = format!(r"\b{}\b", regex::escape(fragment));
        let name_regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid name pattern for {fragment}"))?;

        let Some(found) = name_regex.find(page) else {
            continue;
        };

        let window = &page[found.start()..window_end(page, found.start())];
        if let Some(caps) = PRICE_REGEX.captures(window) {
            let price: f64 = caps[1]
                .parse()
                .with_context(|| format!("Invalid price {:?}", &caps[1]))?;
            candidates.push(Candidate::new(found.as_str(), price));
        }
    }

    Ok(candidates)
}

/// End of the search window, backed off to a char boundary.
fn window_end(page: &str, start: usize) -> usize {
    let mut end = (start + PRICE_WINDOW).min(page.len());
    while !page.is_char_boundary(end) {
        end -= 1;
    }
    end
}
