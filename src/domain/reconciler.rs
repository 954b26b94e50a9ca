//! Price reconciliation.
//!
//! Turns the union of all providers' quotes into exactly one price per
//! tracked GPU:
//! 1. cheapest valid quote wins when any provider priced the GPU;
//! 2. otherwise a bounded random-walk step from the previous price
//!    (or the profile's `current_price` when there is no history);
//! 3. the result is rounded to cents and never left below the floor.
//!
//! The random source is injected so backfill and live estimates can use
//! separate generators.

use std::collections::BTreeMap;

use rand::Rng;

use super::catalog::{Catalog, GpuName, GpuProfile};
use super::money;
use super::series::{ProviderId, ScrapedQuote, Snapshot};

/// Lower bound of the weekly synthetic drift ($/hr).
pub const ESTIMATE_DRIFT_MIN: f64 = -0.05;
/// Upper bound of the weekly synthetic drift ($/hr).
pub const ESTIMATE_DRIFT_MAX: f64 = 0.03;

/// Where a reconciled price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOrigin {
    /// Cheapest valid quote from this provider.
    Live(ProviderId),
    /// Synthetic random-walk estimate.
    Estimated,
}

impl PriceOrigin {
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Live(_))
    }
}

/// One reconciled price with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledPrice {
    pub gpu: GpuName,
    pub price: f64,
    pub origin: PriceOrigin,
}

/// Result of a reconciliation pass, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub prices: Vec<ReconciledPrice>,
}

impl Reconciliation {
    /// Price map suitable for a `Snapshot`.
    pub fn price_map(&self) -> BTreeMap<GpuName, f64> {
        self.prices
            .iter()
            .map(|p| (p.gpu.clone(), p.price))
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.prices.iter().filter(|p| p.origin.is_live()).count()
    }

    pub fn estimated_count(&self) -> usize {
        self.prices.len() - self.live_count()
    }
}

/// Stateless reconciler over an immutable catalog.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    catalog: &'a Catalog,
}

impl<'a> Reconciler<'a> {
    pub const fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Produce exactly one price for every GPU in the catalog.
    ///
    /// Quotes for GPUs outside the catalog are ignored; quotes that fail
    /// the floor check are ignored as well, even though the adapters
    /// should already have dropped them.
    pub fn reconcile<R: Rng>(
        &self,
        previous: Option<&Snapshot>,
        quotes: &[ScrapedQuote],
        rng: &mut R,
    ) -> Reconciliation {
        let prices = self
            .catalog
            .profiles()
            .iter()
            .map(|profile| {
                let cheapest = cheapest_quote(profile, quotes);
                let (raw, origin) = match cheapest {
                    Some(q) => (q.price, PriceOrigin::Live(q.provider)),
                    None => {
                        let prev = previous
                            .and_then(|s| s.price(&profile.name))
                            .unwrap_or(profile.current_price);
                        (estimate(prev, rng), PriceOrigin::Estimated)
                    }
                };
                ReconciledPrice {
                    gpu: profile.name.clone(),
                    price: money::settle(raw, profile.floor),
                    origin,
                }
            })
            .collect();

        Reconciliation { prices }
    }
}

/// Cheapest admissible quote for a GPU, if any.
fn cheapest_quote<'q>(
    profile: &GpuProfile,
    quotes: &'q [ScrapedQuote],
) -> Option<&'q ScrapedQuote> {
    quotes
        .iter()
        .filter(|q| q.gpu == profile.name && profile.admits(q.price))
        .min_by(|a, b| a.price.total_cmp(&b.price))
}

/// One synthetic random-walk step (before floor clamp and rounding).
fn estimate<R: Rng>(previous: f64, rng: &mut R) -> f64 {
    previous + rng.gen_range(ESTIMATE_DRIFT_MIN..=ESTIMATE_DRIFT_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            GpuProfile {
                name: "H100 SXM".to_string(),
                start_price: 4.80,
                current_price: 2.99,
                volatility: 0.12,
                floor: 1.80,
            },
            GpuProfile {
                name: "T4".to_string(),
                start_price: 0.45,
                current_price: 0.29,
                volatility: 0.02,
                floor: 0.10,
            },
        ])
    }

    fn quote(gpu: &str, price: f64, provider: ProviderId) -> ScrapedQuote {
        ScrapedQuote {
            gpu: gpu.to_string(),
            price,
            provider,
        }
    }

    fn previous(h100: f64, t4: f64) -> Snapshot {
        Snapshot::new(
            NaiveDate::from_ymd_opt(2026, 10, 11).unwrap(),
            [("H100 SXM".to_string(), h100), ("T4".to_string(), t4)].into(),
        )
    }

    #[test]
    fn test_cheapest_quote_wins() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(7);
        let quotes = vec![
            quote("H100 SXM", 2.49, ProviderId::RunPod),
            quote("H100 SXM", 1.99, ProviderId::VastAi),
            quote("H100 SXM", 2.10, ProviderId::GetDeploying),
        ];

        let result =
            Reconciler::new(&catalog).reconcile(Some(&previous(2.99, 0.29)), &quotes, &mut rng);

        assert_eq!(result.prices[0].price, 1.99);
        assert_eq!(result.prices[0].origin, PriceOrigin::Live(ProviderId::VastAi));
        assert_eq!(result.prices[1].origin, PriceOrigin::Estimated);
        assert_eq!(result.live_count(), 1);
        assert_eq!(result.estimated_count(), 1);
    }

    #[test]
    fn test_estimate_stays_within_drift_and_floor() {
        let catalog = catalog();
        let prev = previous(2.99, 0.29);
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = Reconciler::new(&catalog).reconcile(Some(&prev), &[], &mut rng);
            for p in &result.prices {
                let last = prev.price(&p.gpu).unwrap();
                assert!(p.price >= last - 0.05 - 1e-9, "{} dropped too far", p.gpu);
                assert!(p.price <= last + 0.03 + 1e-9, "{} rose too far", p.gpu);
            }
        }
    }

    #[test]
    fn test_estimate_clamps_to_floor() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(1);
        let result =
            Reconciler::new(&catalog).reconcile(Some(&previous(1.80, 0.10)), &[], &mut rng);
        assert!(result.prices[0].price >= 1.80);
        assert!(result.prices[1].price >= 0.10);
    }

    #[test]
    fn test_without_history_walks_from_current_price() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(3);
        let result = Reconciler::new(&catalog).reconcile(None, &[], &mut rng);
        let t4 = &result.prices[1];
        assert!(t4.price >= 0.24 - 1e-9 && t4.price <= 0.32 + 1e-9);
    }

    #[test]
    fn test_below_floor_and_unknown_quotes_are_ignored() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(5);
        let quotes = vec![
            quote("T4", 0.05, ProviderId::VastAi),
            quote("GB300", 9.99, ProviderId::RunPod),
        ];
        let result =
            Reconciler::new(&catalog).reconcile(Some(&previous(2.99, 0.29)), &quotes, &mut rng);
        assert_eq!(result.prices.len(), 2);
        assert_eq!(result.prices[1].origin, PriceOrigin::Estimated);
        assert!(result.prices[1].price >= 0.10);
    }

    #[test]
    fn test_live_prices_are_rounded() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(9);
        let quotes = vec![quote("T4", 0.2349, ProviderId::RunPod)];
        let result = Reconciler::new(&catalog).reconcile(None, &quotes, &mut rng);
        assert_eq!(result.prices[1].price, 0.23);
    }
}
