//! Rating-bucket grouping and per-bucket aggregates.
//!
//! Buckets partition the table by distinct rating value and iterate in
//! ascending rating order, so every test that reports per-bucket rows does so
//! in the same deterministic order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::{Column, Value};

/// Per-bucket aggregate used by the calibration and rank-based tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingBucket {
    /// The distinct rating value shared by the bucket's rows.
    pub rating: Value,
    /// Row count `n`.
    pub n_obs: u64,
    /// Default count `n1`.
    pub n_defaults: f64,
    /// Mean PD `p` over the bucket.
    pub average_pd: f64,
}

/// Row indices per distinct rating value, ascending by rating.
pub fn group_rows(ratings: &Column) -> BTreeMap<Value, Vec<usize>> {
    let mut groups: BTreeMap<Value, Vec<usize>> = BTreeMap::new();
    for (row, cell) in ratings.cells().enumerate() {
        if let Some(value) = cell {
            groups.entry(value.clone()).or_default().push(row);
        }
    }
    groups
}

/// Count, default count and mean PD per bucket.
pub fn summarise(ratings: &Column, defaults: &Column, pds: &Column) -> Vec<RatingBucket> {
    let default_values = defaults.numeric();
    let pd_values = pds.numeric();
    group_rows(ratings)
        .into_iter()
        .map(|(rating, rows)| {
            let n = rows.len();
            let n_defaults: f64 = rows.iter().map(|&i| default_values[i]).sum();
            let pd_sum: f64 = rows.iter().map(|&i| pd_values[i]).sum();
            RatingBucket {
                rating,
                n_obs: n as u64,
                n_defaults,
                average_pd: pd_sum / n as f64,
            }
        })
        .collect()
}
