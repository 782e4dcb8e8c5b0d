//! Population stability index between two rating snapshots.
//!
//! The two columns' percentage distributions `pi` and `qi` are taken over
//! each column's own value set and aligned by rating value; the index is
//! `Σ (pi − qi)·ln(pi/qi)` over the initial column's values. A rating value
//! present in only one snapshot makes a term degenerate and the result
//! surfaces as ±∞/NaN rather than being patched over.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contract::{self, ColumnArg};
use crate::table::{Column, Table, Value};
use crate::BacktestResult;

/// Input for the population stability index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PsiInput {
    /// Name of the column with the initial ratings.
    #[serde(default)]
    pub initial_ratings_col: Option<Value>,
    /// Name of the column with the final ratings.
    #[serde(default)]
    pub final_ratings_col: Option<Value>,
}

impl PsiInput {
    pub fn new(initial_ratings_col: &str, final_ratings_col: &str) -> Self {
        PsiInput {
            initial_ratings_col: Some(Value::from(initial_ratings_col)),
            final_ratings_col: Some(Value::from(final_ratings_col)),
        }
    }
}

/// Compute the population stability index between the two rating columns.
pub fn population_stability_index(df: &Table, input: &PsiInput) -> BacktestResult<f64> {
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

    let pi = percentage_distribution(initial_col);
    let qi = percentage_distribution(final_col);

    let psi = pi
        .iter()
        .map(|(value, &p)| {
            let q = qi.get(value).copied().unwrap_or(0.0);
            (p - q) * (p / q).ln()
        })
        .sum();

    Ok(psi)
}

/// Share of rows per distinct value, in percent.
fn percentage_distribution(column: &Column) -> BTreeMap<Value, f64> {
    let mut counts: BTreeMap<Value, u64> = BTreeMap::new();
    for cell in column.cells().flatten() {
        *counts.entry(cell.clone()).or_default() += 1;
    }
    let total = column.len() as f64;
    counts
        .into_iter()
        .map(|(value, count)| (value, 100.0 * count as f64 / total))
        .collect()
}
