//! Migration-matrix bandwidth statistics for upgrades and downgrades.
//!
//! Covers:
//! 1. **Contingency table** -- counts of initial-rating × final-rating
//!    pairs, rows and columns each sorted ascending over the respective
//!    column's own observed values.
//! 2. **Row-normalized transition matrix** `P`.
//! 3. **Matrix-weighted bandwidths** -- distance-weighted mass of the strict
//!    upper triangle (`upper_mwb`) and strict lower triangle (`lower_mwb`)
//!    of `P`, each normalized by `Σ max(i−K, i−1) · rowTotal_i · tailMass_i`.
//!
//! Indices `i`, `j` are 1-based positions into the sorted value sets, with
//! `K` the number of distinct initial ratings; grades are assumed to occupy
//! matching positions on both axes. A snapshot pair with no upgrades (or no
//! downgrades) leaves the corresponding normalizer at zero and the statistic
//! surfaces as ±∞/NaN.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contract::{self, ColumnArg};
use crate::table::{Column, Table, Value};
use crate::BacktestResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Input for the migration-matrix statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationInput {
    /// Name of the column with the initial ratings.
    #[serde(default)]
    pub initial_ratings_col: Option<Value>,
    /// Name of the column with the final ratings.
    #[serde(default)]
    pub final_ratings_col: Option<Value>,
}

impl MigrationInput {
    pub fn new(initial_ratings_col: &str, final_ratings_col: &str) -> Self {
        MigrationInput {
            initial_ratings_col: Some(Value::from(initial_ratings_col)),
            final_ratings_col: Some(Value::from(final_ratings_col)),
        }
    }
}

/// The two matrix-weighted bandwidth measures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationStatistics {
    /// Downgrade intensity: weighted mass above the diagonal.
    pub upper_mwb: f64,
    /// Upgrade intensity: weighted mass below the diagonal.
    pub lower_mwb: f64,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Compute the upper and lower matrix-weighted bandwidths of the rating
/// transition matrix.
pub fn migration_matrix_statistics(
    df: &Table,
    input: &MigrationInput,
) -> BacktestResult<MigrationStatistics> {
    let [initial_col, final_col] = contract::resolve_columns(
        df,
        [
            ColumnArg::new(
                "initial_ratings_col",
                input.initial_ratings_col.as_ref(),
            ),
            ColumnArg::new("final_ratings_col", input.final_ratings_col.as_ref()),
        ],
    )?;

    let row_index = position_index(initial_col);
    let col_index = position_index(final_col);

    let mut counts = vec![vec![0.0f64; col_index.len()]; row_index.len()];
    for (from, to) in initial_col.cells().flatten().zip(final_col.cells().flatten()) {
        counts[row_index[from]][col_index[to]] += 1.0;
    }

    let row_totals: Vec<f64> = counts.iter().map(|row| row.iter().sum()).collect();
    let p: Vec<Vec<f64>> = counts
        .iter()
        .zip(&row_totals)
        .map(|(row, total)| row.iter().map(|c| c / total).collect())
        .collect();

    let k = row_index.len();

    let mut mnorm_upper = 0.0;
    for i in 1..k {
        let tail: f64 = p[i - 1][i..].iter().sum();
        mnorm_upper += distance_weight(i, k) * row_totals[i - 1] * tail;
    }
    let mut mnorm_lower = 0.0;
    for i in 2..=k {
        let head: f64 = p[i - 1][..i - 1].iter().sum();
        mnorm_lower += distance_weight(i, k) * row_totals[i - 1] * head;
    }

    let mut upper_mwb = 0.0;
    for i in 1..k {
        for j in (i + 1)..=k {
            upper_mwb += (j - i) as f64 * row_totals[i - 1] * p[i - 1][j - 1];
        }
    }
    upper_mwb /= mnorm_upper;

    let mut lower_mwb = 0.0;
    for i in 2..=k {
        for j in 1..i {
            lower_mwb += (i - j) as f64 * row_totals[i - 1] * p[i - 1][j - 1];
        }
    }
    lower_mwb /= mnorm_lower;

    Ok(MigrationStatistics {
        upper_mwb,
        lower_mwb,
    })
}

/// `max(i − K, i − 1)` for the 1-based row position `i`.
fn distance_weight(i: usize, k: usize) -> f64 {
    (i as i64 - k as i64).max(i as i64 - 1) as f64
}

/// Position of each distinct value within the column's sorted value set.
fn position_index(column: &Column) -> BTreeMap<&Value, usize> {
    let mut index: BTreeMap<&Value, usize> = BTreeMap::new();
    for cell in column.cells().flatten() {
        index.entry(cell).or_default();
    }
    for (position, slot) in index.values_mut().enumerate() {
        *slot = position;
    }
    index
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
