//! Flattens a `Series` into `(date, gpu, price)` rows for display.

use chrono::NaiveDate;
use serde::Serialize;

use super::catalog::GpuName;
use super::series::Series;

/// One row of the tabular series view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub date: NaiveDate,
    pub week: String,
    pub gpu: GpuName,
    pub price: f64,
}

/// One row per (snapshot, tracked GPU), snapshots in chronological order
/// and GPUs in tracking order. A tracked GPU missing from a snapshot
/// produces no row.
pub fn materialize(series: &Series) -> Vec<SeriesRow> {
    series
        .entries
        .iter()
        .flat_map(|entry| {
            series.tracked_gpus().iter().filter_map(move |gpu| {
                entry.price(gpu).map(|price| SeriesRow {
                    date: entry.date,
                    week: entry.week.clone(),
                    gpu: gpu.clone(),
                    price,
                })
            })
        })
        .collect()
}
