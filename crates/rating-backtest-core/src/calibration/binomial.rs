//! Exact binomial calibration test, per rating bucket.
//!
//! For a bucket of `n` obligors with `n1` observed defaults and mean assigned
//! PD `p`, the statistic is `F = BinomialCDF(n1; n, p)`. The test is
//! two-sided: a bucket whose default count sits in either tail of the
//! Binomial(n, p) distribution rejects the calibration hypothesis.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, DiscreteCDF};

use crate::bucket;
use crate::contract::{self, ColumnArg};
use crate::table::{Table, Value};
use crate::BacktestResult;

use super::{default_alpha, DEFAULT_ALPHA};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Input for the binomial test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinomialTestInput {
    /// Name of the column with default statuses (0/1).
    #[serde(default)]
    pub defaults_col: Option<Value>,
    /// Name of the column with ratings.
    #[serde(default)]
    pub ratings_col: Option<Value>,
    /// Name of the column with probability-of-default values.
    #[serde(default)]
    pub pds_col: Option<Value>,
    /// Significance level of the two-sided test.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl BinomialTestInput {
    pub fn new(defaults_col: &str, ratings_col: &str, pds_col: &str) -> Self {
        BinomialTestInput {
            defaults_col: Some(Value::from(defaults_col)),
            ratings_col: Some(Value::from(ratings_col)),
            pds_col: Some(Value::from(pds_col)),
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl Default for BinomialTestInput {
    fn default() -> Self {
        BinomialTestInput {
            defaults_col: None,
            ratings_col: None,
            pds_col: None,
            alpha: DEFAULT_ALPHA,
        }
    }
}

/// Test conclusion per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conclusion {
    #[serde(rename = "reject")]
    Reject,
    #[serde(rename = "fail to reject")]
    FailToReject,
}

/// One result row per rating bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinomialBucket {
    pub rating: Value,
    pub n_obs: u64,
    pub n_defaults: f64,
    pub average_pd: f64,
    /// `F = BinomialCDF(n1; n, p)`.
    pub statistic: f64,
    pub conclusion: Conclusion,
}

/// Output of the binomial test, one row per bucket in ascending rating order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinomialTestOutput {
    pub buckets: Vec<BinomialBucket>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Run the binomial calibration test on every rating bucket.
pub fn binomial_test(df: &Table, input: &BinomialTestInput) -> BacktestResult<BinomialTestOutput> {
    let [defaults, ratings, pds] = contract::resolve_columns(
        df,
        [
            ColumnArg::new("defaults_col", input.defaults_col.as_ref()),
            ColumnArg::new("ratings_col", input.ratings_col.as_ref()),
            ColumnArg::new("pds_col", input.pds_col.as_ref()),
        ],
    )?;

    let buckets = bucket::summarise(ratings, defaults, pds)
        .into_iter()
        .map(|b| {
            // A degenerate bucket (non-finite mean PD) yields NaN, which
            // fails both tail comparisons below.
            let statistic = match Binomial::new(b.average_pd, b.n_obs) {
                Ok(dist) => dist.cdf(b.n_defaults as u64),
                Err(_) => f64::NAN,
            };
            let conclusion = if statistic <= input.alpha || 1.0 - statistic <= input.alpha {
                Conclusion::Reject
            } else {
                Conclusion::FailToReject
            };
            BinomialBucket {
                rating: b.rating,
                n_obs: b.n_obs,
                n_defaults: b.n_defaults,
                average_pd: b.average_pd,
                statistic,
                conclusion,
            }
        })
        .collect();

    Ok(BinomialTestOutput { buckets })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
