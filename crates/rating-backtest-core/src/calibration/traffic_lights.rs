//! Traffic-lights classification of bucket default counts.
//!
//! Each rating bucket's total default count is placed against two quantile
//! thresholds of the count distribution. Both thresholds sit at the 95th
//! percentile, so the Yellow band between them is empty and every count
//! classifies as Green (below) or Red (at or above). Ratings that share a
//! default count always receive the same light.

use serde::{Deserialize, Serialize};

use crate::bucket;
use crate::contract::{self, ColumnArg};
use crate::table::{Table, Value};
use crate::BacktestResult;

/// Quantile rank of the lower threshold `c_low`.
const LOW_QUANTILE: f64 = 0.95;
/// Quantile rank of the upper threshold `c_high`.
const HIGH_QUANTILE: f64 = 0.95;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Input for the traffic-lights classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficLightsInput {
    /// Name of the column with ratings.
    #[serde(default)]
    pub ratings_col: Option<Value>,
    /// Name of the column with default statuses (0/1).
    #[serde(default)]
    pub defaults_col: Option<Value>,
}

impl TrafficLightsInput {
    pub fn new(ratings_col: &str, defaults_col: &str) -> Self {
        TrafficLightsInput {
            ratings_col: Some(Value::from(ratings_col)),
            defaults_col: Some(Value::from(defaults_col)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficLight {
    Green,
    Yellow,
    Red,
}

/// One result row per rating bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficLightBucket {
    pub rating: Value,
    pub light: TrafficLight,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficLightsOutput {
    pub buckets: Vec<TrafficLightBucket>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Classify every rating bucket's default count as Green, Yellow or Red.
pub fn traffic_lights(
    df: &Table,
    input: &TrafficLightsInput,
) -> BacktestResult<TrafficLightsOutput> {
    let [ratings, defaults] = contract::resolve_columns(
        df,
        [
            ColumnArg::new("ratings_col", input.ratings_col.as_ref()),
            ColumnArg::new("defaults_col", input.defaults_col.as_ref()),
        ],
    )?;

    let default_values = defaults.numeric();
    let counts: Vec<(Value, f64)> = bucket::group_rows(ratings)
        .into_iter()
        .map(|(rating, rows)| {
            let total: f64 = rows.iter().map(|&i| default_values[i]).sum();
            (rating, total)
        })
        .collect();

    let mut sorted: Vec<f64> = counts.iter().map(|&(_, x)| x).collect();
    sorted.sort_by(f64::total_cmp);
    let c_low = quantile_sorted(&sorted, LOW_QUANTILE);
    let c_high = quantile_sorted(&sorted, HIGH_QUANTILE);

    let buckets = counts
        .into_iter()
        .map(|(rating, count)| TrafficLightBucket {
            rating,
            light: classify(count, c_low, c_high),
        })
        .collect();

    Ok(TrafficLightsOutput { buckets })
}

fn classify(count: f64, c_low: f64, c_high: f64) -> TrafficLight {
    if count < c_low {
        TrafficLight::Green
    } else if count > c_low && count < c_high {
        TrafficLight::Yellow
    } else {
        TrafficLight::Red
    }
}

// ---------------------------------------------------------------------------
// Math helpers
// ---------------------------------------------------------------------------

/// Compute the quantile of a **sorted** slice using linear interpolation.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
