//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify that reconciliation, backfill and the
//! money helpers keep every persisted price well-formed across random
//! inputs.

use chrono::NaiveDate;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use gpu_price_tracker::domain::backfill;
use gpu_price_tracker::domain::catalog::{Catalog, GpuProfile};
use gpu_price_tracker::domain::money;
use gpu_price_tracker::domain::reconciler::{PriceOrigin, Reconciler};
use gpu_price_tracker::domain::series::{ProviderId, ScrapedQuote, Snapshot};

fn catalog() -> Catalog {
    let gpu = |name: &str, start: f64, current: f64, volatility: f64, floor: f64| GpuProfile {
        name: name.to_string(),
        start_price: start,
        current_price: current,
        volatility,
        floor,
    };
    Catalog::new(vec![
        gpu("B200", 6.50, 5.49, 0.20, 3.00),
        gpu("H100 SXM", 4.80, 2.99, 0.12, 1.80),
        gpu("L40S", 1.20, 0.79, 0.06, 0.40),
        gpu("T4", 0.45, 0.29, 0.02, 0.10),
    ])
}

fn provider_strategy() -> impl Strategy<Value = ProviderId> {
    prop_oneof![
        Just(ProviderId::GetDeploying),
        Just(ProviderId::RunPod),
        Just(ProviderId::VastAi),
    ]
}

fn quote_strategy() -> impl Strategy<Value = ScrapedQuote> {
    (0usize..4, 0.0f64..8.0, provider_strategy()).prop_map(|(i, price, provider)| {
        ScrapedQuote {
            gpu: catalog().profiles()[i].name.clone(),
            price,
            provider,
        }
    })
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

// ── Reconciler Properties ───────────────────────────────────

proptest! {
    /// Every reconciled price is positive, at or above its floor, and
    /// the snapshot covers exactly the catalog.
    #[test]
    fn reconciled_prices_respect_floor(
        previous in prop::collection::vec(0.01f64..8.0, 4),
        quotes in prop::collection::vec(quote_strategy(), 0..12),
        seed in any::<u64>(),
    ) {
        let catalog = catalog();
        let prev = Snapshot::new(
            today(),
            catalog
                .names()
                .into_iter()
                .zip(previous)
                .collect(),
        );

        let result = Reconciler::new(&catalog)
            .reconcile(Some(&prev), &quotes, &mut StdRng::seed_from_u64(seed));
        let snapshot = Snapshot::new(today(), result.price_map());

        prop_assert!(snapshot.covers_exactly(&catalog.names()));
        for (p, profile) in result.prices.iter().zip(catalog.profiles()) {
            prop_assert_eq!(&p.gpu, &profile.name);
            prop_assert!(p.price > 0.0, "{} priced {}", p.gpu, p.price);
            prop_assert!(
                p.price >= profile.floor,
                "{} priced {} below floor {}", p.gpu, p.price, profile.floor
            );
        }
    }

    /// When any admissible quote exists, the cheapest one wins.
    #[test]
    fn cheapest_admissible_quote_wins(
        quotes in prop::collection::vec(quote_strategy(), 1..12),
        seed in any::<u64>(),
    ) {
        let catalog = catalog();
        let result = Reconciler::new(&catalog)
            .reconcile(None, &quotes, &mut StdRng::seed_from_u64(seed));

        for (p, profile) in result.prices.iter().zip(catalog.profiles()) {
            let cheapest = quotes
                .iter()
                .filter(|q| q.gpu == profile.name && profile.admits(q.price))
                .map(|q| q.price)
                .min_by(f64::total_cmp);

            match cheapest {
                Some(price) => {
                    prop_assert!(p.origin.is_live());
                    prop_assert!((p.price - money::settle(price, profile.floor)).abs() < 1e-9);
                }
                None => prop_assert_eq!(p.origin, PriceOrigin::Estimated),
            }
        }
    }

    /// Estimates move at most one drift step away from the previous price.
    #[test]
    fn estimate_stays_within_drift(
        previous in prop::collection::vec(0.5f64..8.0, 4),
        seed in any::<u64>(),
    ) {
        let catalog = catalog();
        let prev = Snapshot::new(
            today(),
            catalog.names().into_iter().zip(previous).collect(),
        );
        let result = Reconciler::new(&catalog)
            .reconcile(Some(&prev), &[], &mut StdRng::seed_from_u64(seed));

        for (p, profile) in result.prices.iter().zip(catalog.profiles()) {
            let before = prev.price(&profile.name).unwrap();
            prop_assert!(p.price <= before.max(profile.floor) + 0.03 + 0.005 + 1e-9);
            prop_assert!(p.price >= profile.floor);
        }
    }
}

// ── Backfill Properties ─────────────────────────────────────

proptest! {
    /// Backfill yields `weeks` entries, 7 days apart, ending before today,
    /// every one of them fully priced at or above the floors.
    #[test]
    fn backfill_is_weekly_and_floored(weeks in 1usize..60, seed in any::<u64>()) {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(seed);
        let entries = backfill::generate(&catalog, weeks, today(), &mut rng);

        prop_assert_eq!(entries.len(), weeks);
        prop_assert!(entries.last().unwrap().date < today());
        for pair in entries.windows(2) {
            prop_assert_eq!((pair[1].date - pair[0].date).num_days(), 7);
        }
        for entry in &entries {
            prop_assert!(entry.covers_exactly(&catalog.names()));
            for profile in catalog.profiles() {
                let price = entry.price(&profile.name).unwrap();
                prop_assert!(price >= profile.floor && price > 0.0);
            }
        }
    }

    /// The same seed always reproduces the same history.
    #[test]
    fn backfill_is_reproducible(weeks in 1usize..30, seed in any::<u64>()) {
        let catalog = catalog();
        let a = backfill::generate(&catalog, weeks, today(), &mut StdRng::seed_from_u64(seed));
        let b = backfill::generate(&catalog, weeks, today(), &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(a, b);
    }
}

// ── Money Properties ────────────────────────────────────────

proptest! {
    /// Settling never lands below the floor and stays on a cent grid.
    #[test]
    fn settle_never_below_floor(price in -5.0f64..50.0, floor in 0.01f64..10.0) {
        let settled = money::settle(price, floor);
        prop_assert!(settled >= floor, "settle({price}, {floor}) = {settled}");
        prop_assert!(((settled * 100.0).round() - settled * 100.0).abs() < 1e-6);
    }
}
