//! Spiegelhalter normal calibration test.
//!
//! Covers:
//! 1. **Per-bucket z-test** -- mean squared error of the PDs against its
//!    expectation under the hypothesis that every PD is correct.
//! 2. **Overall z-test** -- the same statistic over the whole table,
//!    reported as a final summary record.
//!
//! For a group of `n` obligors: `MSE = Σ(d − PD)²/n`,
//! `EMSE = Σ PD(1−PD)/n`, `Var = Σ PD(1−PD)(1−2·PD)²/n²`,
//! `z = (MSE − EMSE)/√Var` and `p = 1 − Φ(|z|)`. A group whose PDs are all
//! 0 or 1 has `Var = 0`; the resulting NaN is returned as-is.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::bucket;
use crate::contract::{self, ColumnArg};
use crate::table::{Table, Value};
use crate::BacktestResult;

use super::{default_alpha, DEFAULT_ALPHA};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Input for the Spiegelhalter test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiegelhalterTestInput {
    /// Name of the column with ratings.
    #[serde(default)]
    pub ratings_col: Option<Value>,
    /// Name of the column with default statuses (0/1).
    #[serde(default)]
    pub defaults_col: Option<Value>,
    /// Name of the column with probability-of-default values.
    #[serde(default)]
    pub pds_col: Option<Value>,
    /// Significance level.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl SpiegelhalterTestInput {
    pub fn new(ratings_col: &str, defaults_col: &str, pds_col: &str) -> Self {
        SpiegelhalterTestInput {
            ratings_col: Some(Value::from(ratings_col)),
            defaults_col: Some(Value::from(defaults_col)),
            pds_col: Some(Value::from(pds_col)),
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl Default for SpiegelhalterTestInput {
    fn default() -> Self {
        SpiegelhalterTestInput {
            ratings_col: None,
            defaults_col: None,
            pds_col: None,
            alpha: DEFAULT_ALPHA,
        }
    }
}

/// Verdict per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Fail,
}

/// One result row per rating bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiegelhalterBucket {
    pub rating: Value,
    pub z_score: f64,
    pub p_value: f64,
    pub verdict: Verdict,
}

/// The whole-table summary record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiegelhalterSummary {
    pub z_score: f64,
    pub p_value: f64,
    pub verdict: Verdict,
}

/// Output: per-bucket rows in ascending rating order plus the overall record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiegelhalterTestOutput {
    pub buckets: Vec<SpiegelhalterBucket>,
    pub overall: SpiegelhalterSummary,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Run the Spiegelhalter test per bucket and over the whole table.
pub fn spiegelhalter_test(
    df: &Table,
    input: &SpiegelhalterTestInput,
) -> BacktestResult<SpiegelhalterTestOutput> {
    let [ratings, defaults, pds] = contract::resolve_columns(
        df,
        [
            ColumnArg::new("ratings_col", input.ratings_col.as_ref()),
            ColumnArg::new("defaults_col", input.defaults_col.as_ref()),
            ColumnArg::new("pds_col", input.pds_col.as_ref()),
        ],
    )?;

    let default_values = defaults.numeric();
    let pd_values = pds.numeric();

    let buckets = bucket::group_rows(ratings)
        .into_iter()
        .map(|(rating, rows)| {
            let d: Vec<f64> = rows.iter().map(|&i| default_values[i]).collect();
            let p: Vec<f64> = rows.iter().map(|&i| pd_values[i]).collect();
            let (z_score, p_value) = group_statistic(&d, &p);
            // Per-bucket verdicts use a strict comparison.
            let verdict = if p_value < input.alpha {
                Verdict::Pass
            } else {
                Verdict::Fail
            };
            SpiegelhalterBucket {
                rating,
                z_score,
                p_value,
                verdict,
            }
        })
        .collect();

    let (z_score, p_value) = group_statistic(&default_values, &pd_values);
    // The overall verdict uses a non-strict comparison.
    let verdict = if p_value <= input.alpha {
        Verdict::Pass
    } else {
        Verdict::Fail
    };

    Ok(SpiegelhalterTestOutput {
        buckets,
        overall: SpiegelhalterSummary {
            z_score,
            p_value,
            verdict,
        },
    })
}

/// z-score and upper-tail p-value for one group of observations.
fn group_statistic(defaults: &[f64], pds: &[f64]) -> (f64, f64) {
    let n = defaults.len() as f64;
    let mse: f64 = defaults
        .iter()
        .zip(pds)
        .map(|(d, p)| (d - p) * (d - p))
        .sum::<f64>()
        / n;
    let emse: f64 = pds.iter().map(|p| p * (1.0 - p)).sum::<f64>() / n;
    let var: f64 = pds
        .iter()
        .map(|p| p * (1.0 - p) * (1.0 - 2.0 * p) * (1.0 - 2.0 * p))
        .sum::<f64>()
        / (n * n);
    let z = (mse - emse) / var.sqrt();
    (z, upper_tail(z))
}

/// `1 − Φ(|z|)`, invariant to the sign of `z`.
fn upper_tail(z: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(standard) => standard.sf(z.abs()),
        Err(_) => f64::NAN,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
