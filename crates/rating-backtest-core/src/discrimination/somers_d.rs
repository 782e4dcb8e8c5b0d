//! Somers' D rank-concordance statistic over rating buckets.
//!
//! Buckets are compared pairwise on default count and on mean PD. A pair is
//! concordant when the two orderings agree. Ties compare as "not less", so a
//! tied pair lands on the same side as a strictly greater one.

use serde::{Deserialize, Serialize};

use crate::bucket;
use crate::contract::{self, ColumnArg};
use crate::table::{Table, Value};
use crate::BacktestResult;

/// Input for Somers' D.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SomersDInput {
    /// Name of the column with ratings.
    #[serde(default)]
    pub ratings_col: Option<Value>,
    /// Name of the column with probability-of-default values.
    #[serde(default)]
    pub pds_col: Option<Value>,
    /// Name of the column with default statuses (0/1).
    #[serde(default)]
    pub defaults_col: Option<Value>,
}

impl SomersDInput {
    pub fn new(ratings_col: &str, pds_col: &str, defaults_col: &str) -> Self {
        SomersDInput {
            ratings_col: Some(Value::from(ratings_col)),
            pds_col: Some(Value::from(pds_col)),
            defaults_col: Some(Value::from(defaults_col)),
        }
    }
}

/// Compute Somers' D: `(C − D) / C(k, 2)` over the `k` rating buckets.
/// A single-bucket table has no pairs and yields NaN.
pub fn somers_d(df: &Table, input: &SomersDInput) -> BacktestResult<f64> {
    let [ratings, pds, defaults] = contract::resolve_columns(
        df,
        [
            ColumnArg::new("ratings_col", input.ratings_col.as_ref()),
            ColumnArg::new("pds_col", input.pds_col.as_ref()),
            ColumnArg::new("defaults_col", input.defaults_col.as_ref()),
        ],
    )?;

    let buckets = bucket::summarise(ratings, defaults, pds);
    let x: Vec<f64> = buckets.iter().map(|b| b.n_defaults).collect();
    let y: Vec<f64> = buckets.iter().map(|b| b.average_pd).collect();
    let k = buckets.len();

    let mut concordant = 0i64;
    let mut discordant = 0i64;
    for i in 0..k {
        for j in (i + 1)..k {
            let x_less = x[i] < x[j];
            let y_less = y[i] < y[j];
            if x_less == y_less {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }

    let pairs = (k * (k - 1) / 2) as f64;
    Ok((concordant - discordant) as f64 / pairs)
}
