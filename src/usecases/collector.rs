//! Collector - Weekly Price Collection Run
//!
//! One collection run:
//! 1. Check the series is initialized (before touching the network)
//! 2. Fan out to every price source concurrently, each under a timeout
//! 3. Union the accepted quotes and append one reconciled snapshot
//! 4. Log a run summary
//!
//! A provider that fails, times out or returns garbage contributes
//! zero quotes; the run still appends a fully priced snapshot.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use futures_util::future::join_all;
use rand::Rng;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::snapshot_store::{AppendOutcome, SnapshotStore};
use crate::domain::reconciler::PriceOrigin;
use crate::domain::series::{ProviderId, ScrapedQuote};
use crate::error::Result;
use crate::ports::price_source::{PriceSource, SourceReport};
use crate::ports::repository::SeriesRepository;

/// Per-provider outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStats {
    pub provider: ProviderId,
    /// Quotes accepted (one per GPU at most).
    pub accepted: usize,
    /// Candidates discarded by validation.
    pub rejected: usize,
    /// Fetch failed or timed out.
    pub failed: bool,
}

/// Collection run statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionStats {
    /// Per-provider breakdown, in source order.
    pub providers: Vec<ProviderStats>,
    /// GPUs priced from a live quote.
    pub live: usize,
    /// GPUs priced by synthetic estimate.
    pub estimated: usize,
    /// Entry count after the append.
    pub total_entries: usize,
    /// Wall time of the scrape phase.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CollectionStats {
    /// Number of providers that failed outright.
    pub fn failed_providers(&self) -> usize {
        self.providers.iter().filter(|p| p.failed).count()
    }

    /// Log a one-line summary of the run.
    pub fn log_summary(&self, label: &str) {
        info!(
            label,
            live = self.live,
            estimated = self.estimated,
            failed_providers = self.failed_providers(),
            total_entries = self.total_entries,
            elapsed_ms = u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
            "Collection summary"
        );
        for p in &self.providers {
            info!(
                provider = %p.provider,
                accepted = p.accepted,
                rejected = p.rejected,
                failed = p.failed,
                "Provider summary"
            );
        }
    }
}

/// Everything a caller needs to report on one run.
#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub outcome: AppendOutcome,
    pub stats: CollectionStats,
}

/// Runs all price sources and appends the reconciled snapshot.
pub struct Collector<R: SeriesRepository> {
    /// Price sources, queried concurrently.
    sources: Vec<Box<dyn PriceSource>>,
    /// Series lifecycle.
    store: SnapshotStore<R>,
    /// Upper bound on any single source's fetch.
    timeout: Duration,
}

impl<R: SeriesRepository> Collector<R> {
    pub fn new(
        sources: Vec<Box<dyn PriceSource>>,
        store: SnapshotStore<R>,
        timeout: Duration,
    ) -> Self {
        Self {
            sources,
            store,
            timeout,
        }
    }

    pub fn store(&self) -> &SnapshotStore<R> {
        &self.store
    }

    /// Query every source concurrently; never fails.
    ///
    /// Returns the union of accepted quotes and per-provider stats.
    #[instrument(skip(self), fields(sources = self.sources.len()))]
    pub async fn gather(&self) -> (Vec<ScrapedQuote>, Vec<ProviderStats>) {
        let catalog = self.store.catalog();
        let fetches = self.sources.iter().map(|source| async move {
            let provider = source.provider();
            let report = match tokio::time::timeout(self.timeout, source.fetch(catalog)).await {
                Ok(report) => report,
                Err(_) => {
                    warn!(
                        provider = %provider,
                        timeout_s = self.timeout.as_secs(),
                        "Provider timed out"
                    );
                    SourceReport::failed()
                }
            };
            (provider, report)
        });

        let mut quotes = Vec::new();
        let mut stats = Vec::new();
        for (provider, report) in join_all(fetches).await {
            stats.push(ProviderStats {
                provider,
                accepted: report.quotes.len(),
                rejected: report.rejected,
                failed: report.failed,
            });
            quotes.extend(report.quotes);
        }

        info!(quotes = quotes.len(), "Scraped GPU prices from the web");
        (quotes, stats)
    }

    /// Run one full collection and append a snapshot dated `today`.
    ///
    /// Fails only on store errors (not initialized, corrupt, I/O); the
    /// network is not touched when the store precondition fails.
    pub async fn collect<G: Rng>(&self, today: NaiveDate, rng: &mut G) -> Result<CollectionReport> {
        let series = self.store.load_initialized().await?;

        let started = Instant::now();
        let (quotes, providers) = self.gather().await;
        let elapsed = started.elapsed();

        let outcome = self.store.append_to(series, &quotes, today, rng).await?;

        for p in &outcome.reconciliation.prices {
            if p.origin == PriceOrigin::Estimated {
                info!(gpu = %p.gpu, price = p.price, source = "estimated", "Price estimated");
            }
        }

        let stats = CollectionStats {
            providers,
            live: outcome.reconciliation.live_count(),
            estimated: outcome.reconciliation.estimated_count(),
            total_entries: outcome.total_entries,
            elapsed,
        };

        Ok(CollectionReport { outcome, stats })
    }
}

impl CollectionReport {
    /// Final prices, most expensive first, with their origin.
    pub fn ranked_prices(&self) -> Vec<(&str, f64, PriceOrigin)> {
        let mut ranked: Vec<_> = self
            .outcome
            .reconciliation
            .prices
            .iter()
            .map(|p| (p.gpu.as_str(), p.price, p.origin))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Log the added week and the final price list.
    pub fn log_final_prices(&self) {
        info!(
            week = %self.outcome.snapshot.week,
            total = self.outcome.total_entries,
            "Added week"
        );
        for (gpu, price, origin) in self.ranked_prices() {
            let source = match origin {
                PriceOrigin::Live(_) => "LIVE",
                PriceOrigin::Estimated => "est",
            };
            info!(gpu, price, source, "Final price");
        }
    }
}
