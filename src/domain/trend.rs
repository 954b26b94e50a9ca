//! Lookback price change per tracked GPU.
//!
//! Read-only summary over the series: latest price against the price
//! `lookback` snapshots earlier (or the oldest snapshot when the series
//! is shorter than that).

use serde::Serialize;

use super::catalog::GpuName;
use super::series::Series;

/// Default lookback, in snapshots (weeks).
pub const DEFAULT_LOOKBACK: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTrend {
    pub gpu: GpuName,
    pub latest: f64,
    pub reference: f64,
    /// Percentage change from `reference` to `latest`.
    pub change_pct: f64,
}

/// Summarize every tracked GPU; empty when the series has no entries.
pub fn summarize(series: &Series, lookback: usize) -> Vec<PriceTrend> {
    let Some(latest) = series.latest() else {
        return Vec::new();
    };
    let ref_index = series.len().saturating_sub(lookback.saturating_add(1));
    let reference = &series.entries[ref_index];

    series
        .tracked_gpus()
        .iter()
        .filter_map(|gpu| {
            let now = latest.price(gpu)?;
            let then = reference.price(gpu).unwrap_or(now);
            let change_pct = if then == 0.0 { 0.0 } else { (now - then) / then * 100.0 };
            Some(PriceTrend {
                gpu: gpu.clone(),
                latest: now,
                reference: then,
                change_pct,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::Snapshot;
    use chrono::{Duration, NaiveDate};

    fn series(prices: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        let entries = prices
            .iter()
            .zip(0i64..)
            .map(|(&p, i)| {
                Snapshot::new(start + Duration::weeks(i), [("H100 SXM".to_string(), p)].into())
            })
            .collect();
        Series::new(vec!["H100 SXM".to_string()], entries)
    }

    #[test]
    fn test_four_week_change() {
        let s = series(&[3.50, 3.00, 2.90, 2.80, 2.70, 2.40]);
        let trends = summarize(&s, DEFAULT_LOOKBACK);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].reference, 3.00);
        assert_eq!(trends[0].latest, 2.40);
        assert!((trends[0].change_pct - -20.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_series_uses_first_entry() {
        let s = series(&[2.00, 2.20]);
        let trends = summarize(&s, DEFAULT_LOOKBACK);
        assert_eq!(trends[0].reference, 2.00);
        assert!((trends[0].change_pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_huge_lookback_uses_first_entry() {
        let s = series(&[2.00, 2.10, 2.20]);
        let trends = summarize(&s, usize::MAX);
        assert_eq!(trends[0].reference, 2.00);
    }

    #[test]
    fn test_empty_series() {
        assert!(summarize(&Series::empty(), DEFAULT_LOOKBACK).is_empty());
    }
}
