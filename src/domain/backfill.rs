//! Synthetic history generation.
//!
//! Produces `weeks` snapshots spaced seven days apart, ending one week
//! before `today`, so the first live collection continues the cadence.
//! Each GPU moves linearly from `start_price` to `current_price` across
//! the window, plus a perturbation of at most `volatility`, clamped to
//! the floor and rounded to cents.

use chrono::{Duration, NaiveDate};
use rand::Rng;

use super::catalog::Catalog;
use super::money;
use super::series::Snapshot;

/// Fixed seed for reproducible synthetic history.
pub const DEFAULT_BACKFILL_SEED: u64 = 42;

/// Default number of backfilled weeks.
pub const DEFAULT_BACKFILL_WEEKS: usize = 20;

/// Longest synthetic history accepted (20 years).
pub const MAX_BACKFILL_WEEKS: usize = 1040;

/// Interpolation position of entry `index` in a window of `weeks` entries.
///
/// A single-entry window sits at the end of the window (`current_price`).
pub fn window_position(index: usize, weeks: usize) -> f64 {
    if weeks <= 1 {
        1.0
    } else {
        index as f64 / (weeks - 1) as f64
    }
}

/// Generate the synthetic backfill window.
///
/// Deterministic for a given `rng` state: callers seed it with
/// [`DEFAULT_BACKFILL_SEED`] (or a configured seed) to reproduce the
/// same history on every run. Callers bound `weeks` by
/// [`MAX_BACKFILL_WEEKS`]; the window stops early rather than running
/// off the calendar.
pub fn generate<R: Rng>(
    catalog: &Catalog,
    weeks: usize,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<Snapshot> {
    let step = Duration::weeks(1);
    let mut dates: Vec<NaiveDate> =
        std::iter::successors(today.checked_sub_signed(step), |d| d.checked_sub_signed(step))
            .take(weeks)
            .collect();
    dates.reverse();
    let len = dates.len();

    dates
        .into_iter()
        .enumerate()
        .map(|(index, date)| {
            let position = window_position(index, len);
            let prices = catalog
                .profiles()
                .iter()
                .map(|p| {
                    let trend = p.start_price + (p.current_price - p.start_price) * position;
                    let noise = if p.volatility > 0.0 {
                        rng.gen_range(-p.volatility..=p.volatility)
                    } else {
                        0.0
                    };
                    (p.name.clone(), money::settle(trend + noise, p.floor))
                })
                .collect();
            Snapshot::new(date, prices)
        })
        .collect()
}
