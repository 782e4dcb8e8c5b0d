//! Coefficient of concordance between bucket default counts and mean PDs.
//!
//! Both per-bucket vectors are ranked in descending order with tied values
//! collapsing onto one rank. With `m = 2` rank vectors over `n` buckets the
//! statistic is `Σ(S_i − a)² / ((1/12)·m²·(n³ − n))` where
//! `S_i = R_X[i] + R_Y[i]` and `a = 0.5·m·(n+1)`. It lies in [0, 1] for any
//! table with at least two buckets.

use serde::{Deserialize, Serialize};

use crate::bucket;
use crate::contract::{self, ColumnArg};
use crate::table::{Table, Value};
use crate::BacktestResult;

/// The two rank vectors act as raters of the bucket ordering.
const RATERS: f64 = 2.0;

/// Input for the coefficient of concordance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcordanceInput {
    /// Name of the column with default statuses (0/1).
    #[serde(default)]
    pub defaults_col: Option<Value>,
    /// Name of the column with probability-of-default values.
    #[serde(default)]
    pub pds_col: Option<Value>,
    /// Name of the column with ratings.
    #[serde(default)]
    pub ratings_col: Option<Value>,
}

impl ConcordanceInput {
    pub fn new(defaults_col: &str, pds_col: &str, ratings_col: &str) -> Self {
        ConcordanceInput {
            defaults_col: Some(Value::from(defaults_col)),
            pds_col: Some(Value::from(pds_col)),
            ratings_col: Some(Value::from(ratings_col)),
        }
    }
}

/// Compute the coefficient of concordance across rating buckets.
pub fn coefficient_of_concordance(df: &Table, input: &ConcordanceInput) -> BacktestResult<f64> {
    let [defaults, pds, ratings] = contract::resolve_columns(
        df,
        [
            ColumnArg::new("defaults_col", input.defaults_col.as_ref()),
            ColumnArg::new("pds_col", input.pds_col.as_ref()),
            ColumnArg::new("ratings_col", input.ratings_col.as_ref()),
        ],
    )?;

    let buckets = bucket::summarise(ratings, defaults, pds);
    let x: Vec<f64> = buckets.iter().map(|b| b.n_defaults).collect();
    let y: Vec<f64> = buckets.iter().map(|b| b.average_pd).collect();

    let ranked_x = rank_descending(&x);
    let ranked_y = rank_descending(&y);

    let n = buckets.len() as f64;
    let a = 0.5 * RATERS * (n + 1.0);
    let numerator: f64 = ranked_x
        .iter()
        .zip(&ranked_y)
        .map(|(rx, ry)| {
            let s = rx + ry - a;
            s * s
        })
        .sum();
    let denominator = (1.0 / 12.0) * RATERS * RATERS * (n * n * n - n);

    Ok(numerator / denominator)
}

// ---------------------------------------------------------------------------
// Math helpers
// ---------------------------------------------------------------------------

/// Descending ranks with tied values sharing one rank: the largest value
/// ranks 1, and a value's rank is one more than the number of strictly
/// greater values.
fn rank_descending(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    values
        .iter()
        .map(|&x| {
            let at_or_below = values.iter().filter(|&&v| v <= x).count();
            (n - at_or_below + 1) as f64
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
