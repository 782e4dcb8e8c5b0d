//! Information value of the PD distribution, defaulters against
//! non-defaulters.
//!
//! Covers:
//! 1. **Binned information value** -- the canonical measure. Within each
//!    rating bucket (and once over the whole table) the PDs of good and bad
//!    obligors are counted into 10 equal-width bins spanning
//!    `[min, max)` of the combined sample; zero bin counts are replaced by
//!    0.0001 before the log-odds terms are accumulated.
//! 2. **Unbinned information value** -- a coarser variant that compares each
//!    bucket's share of all non-defaults against its share of all defaults,
//!    with the overall figure being the sum over buckets.
//!
//! The overall binned figure is recomputed from the full population, not
//! summed from the bucket figures. A group with no defaulters, no
//! non-defaulters, or a single distinct PD has no usable bin range and
//! yields NaN; the unbinned variant lets empty shares surface as ±∞/NaN.

use serde::{Deserialize, Serialize};

use crate::bucket;
use crate::contract::{self, ColumnArg};
use crate::table::{Column, Table, Value};
use crate::BacktestResult;

const NUM_BINS: usize = 10;
/// Stand-in for a zero bin count, keeping the log-odds terms finite.
const ZERO_COUNT_SUBSTITUTE: f64 = 0.0001;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Input shared by both information-value variants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InformationValueInput {
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

impl InformationValueInput {
    pub fn new(defaults_col: &str, pds_col: &str, ratings_col: &str) -> Self {
        InformationValueInput {
            defaults_col: Some(Value::from(defaults_col)),
            pds_col: Some(Value::from(pds_col)),
            ratings_col: Some(Value::from(ratings_col)),
        }
    }
}

/// One result row per rating bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InformationValueBucket {
    pub rating: Value,
    pub information_value: f64,
}

/// Output: per-bucket rows in ascending rating order plus the overall figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InformationValueOutput {
    pub buckets: Vec<InformationValueBucket>,
    pub overall: f64,
}

// ---------------------------------------------------------------------------
// Binned information value
// ---------------------------------------------------------------------------

/// Compute the binned information value per bucket and overall.
pub fn information_value(
    df: &Table,
    input: &InformationValueInput,
) -> BacktestResult<InformationValueOutput> {
    let [defaults, pds, ratings] = resolve(df, input)?;
    let default_values = defaults.numeric();
    let pd_values = pds.numeric();

    let buckets = bucket::group_rows(ratings)
        .into_iter()
        .map(|(rating, rows)| {
            let (good, bad) = split_pds(&rows, &default_values, &pd_values);
            InformationValueBucket {
                rating,
                information_value: binned_iv(&good, &bad),
            }
        })
        .collect();

    let all_rows: Vec<usize> = (0..df.n_rows()).collect();
    let (good, bad) = split_pds(&all_rows, &default_values, &pd_values);

    Ok(InformationValueOutput {
        buckets,
        overall: binned_iv(&good, &bad),
    })
}

/// PDs of the group's non-defaulters (`good`) and defaulters (`bad`).
/// Flags other than 0 and 1 fall into neither sample.
fn split_pds(rows: &[usize], defaults: &[f64], pds: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut good = Vec::new();
    let mut bad = Vec::new();
    for &row in rows {
        if defaults[row] == 0.0 {
            good.push(pds[row]);
        } else if defaults[row] == 1.0 {
            bad.push(pds[row]);
        }
    }
    (good, bad)
}

fn binned_iv(good: &[f64], bad: &[f64]) -> f64 {
    if good.is_empty() || bad.is_empty() {
        return f64::NAN;
    }
    let lo = good
        .iter()
        .chain(bad)
        .fold(f64::INFINITY, |acc, &v| acc.min(v));
    let hi = good
        .iter()
        .chain(bad)
        .fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
    let width = (hi - lo) / NUM_BINS as f64;
    if width == 0.0 {
        return f64::NAN;
    }

    let mut n0 = [0.0f64; NUM_BINS];
    let mut n1 = [0.0f64; NUM_BINS];
    for &v in good {
        if let Some(j) = bin_index(v, lo, width) {
            n0[j] += 1.0;
        }
    }
    for &v in bad {
        if let Some(j) = bin_index(v, lo, width) {
            n1[j] += 1.0;
        }
    }

    let n = good.len() as f64;
    let m = bad.len() as f64;
    let mut iv = 0.0;
    for j in 0..NUM_BINS {
        let goods = if n0[j] == 0.0 {
            ZERO_COUNT_SUBSTITUTE
        } else {
            n0[j]
        };
        let bads = if n1[j] == 0.0 {
            ZERO_COUNT_SUBSTITUTE
        } else {
            n1[j]
        };
        iv += (bads / n - goods / m) * ((bads * m) / (goods * n)).ln();
    }
    iv
}

/// Bin position within `[lo, lo + NUM_BINS * width)`; the upper bound of the
/// range is excluded.
fn bin_index(value: f64, lo: f64, width: f64) -> Option<usize> {
    let j = ((value - lo) / width).floor();
    if j >= 0.0 && j < NUM_BINS as f64 {
        Some(j as usize)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Unbinned information value
// ---------------------------------------------------------------------------

/// Compute the unbinned (bucket-share) information value per bucket; the
/// overall figure is the sum of the bucket figures.
pub fn information_value_unbinned(
    df: &Table,
    input: &InformationValueInput,
) -> BacktestResult<InformationValueOutput> {
    let [defaults, _pds, ratings] = resolve(df, input)?;
    let default_values = defaults.numeric();

    let total_good = default_values.iter().filter(|&&d| d == 0.0).count() as f64;
    let total_bad = default_values.iter().filter(|&&d| d == 1.0).count() as f64;

    let buckets: Vec<InformationValueBucket> = bucket::group_rows(ratings)
        .into_iter()
        .map(|(rating, rows)| {
            let good = rows.iter().filter(|&&i| default_values[i] == 0.0).count() as f64;
            let bad = rows.iter().filter(|&&i| default_values[i] == 1.0).count() as f64;
            let good_share = good / total_good;
            let bad_share = bad / total_bad;
            InformationValueBucket {
                rating,
                information_value: (good_share - bad_share) * (good_share / bad_share).ln(),
            }
        })
        .collect();

    let overall = buckets.iter().map(|b| b.information_value).sum();

    Ok(InformationValueOutput { buckets, overall })
}

fn resolve<'a>(
    df: &'a Table,
    input: &InformationValueInput,
) -> BacktestResult<[&'a Column; 3]> {
    contract::resolve_columns(
        df,
        [
            ColumnArg::new("defaults_col", input.defaults_col.as_ref()),
            ColumnArg::new("pds_col", input.pds_col.as_ref()),
            ColumnArg::new("ratings_col", input.ratings_col.as_ref()),
        ],
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
