//! In-memory tabular data shared by every backtest.
//!
//! Covers:
//! 1. **Value** -- totally ordered scalar cell (integer, double, text).
//! 2. **Column** -- named sequence of optional cells (`None` = missing).
//! 3. **Table** -- equally long, uniquely named columns.
//!
//! Tables are read-only from the point of view of the backtests: every test
//! takes `&Table` and returns a fresh result.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BacktestError;
use crate::BacktestResult;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A single cell value.
///
/// Rating grades are integers in practice but any of the three forms works as
/// a bucket key. The two numeric forms compare numerically with each other
/// (`f64::total_cmp`), numbers order before text, text orders lexically, so
/// the ordering is total and bucket iteration is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) => None,
        }
    }

    /// Numeric view of the cell. Text cells surface as NaN so that a
    /// non-numeric entry in a numeric column poisons the result instead of
    /// being silently skipped.
    pub fn to_f64(&self) -> f64 {
        self.as_number().unwrap_or(f64::NAN)
    }

    /// Human-readable type name, used in argument-type error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "number",
            Value::Text(_) => "string",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (self, other) {
                (Value::Text(a), Value::Text(b)) => a.cmp(b),
                _ => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A named column. `None` cells are missing values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    name: String,
    cells: Vec<Option<Value>>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Option<Value>>) -> Self {
        Column {
            name: name.into(),
            cells,
        }
    }

    /// Column without missing entries.
    pub fn dense<T: Into<Value>>(name: impl Into<String>, values: Vec<T>) -> Self {
        Column {
            name: name.into(),
            cells: values.into_iter().map(|v| Some(v.into())).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.cells.get(row).and_then(|c| c.as_ref())
    }

    pub fn cells(&self) -> impl Iterator<Item = Option<&Value>> {
        self.cells.iter().map(|c| c.as_ref())
    }

    pub fn has_missing(&self) -> bool {
        self.cells.iter().any(|c| c.is_none())
    }

    /// All cells as `f64`, in row order. Callers run this only after the
    /// missing-value scan, so a `None` here never occurs in practice; it is
    /// mapped to NaN rather than skipped to keep row indices aligned.
    pub fn numeric(&self) -> Vec<f64> {
        self.cells
            .iter()
            .map(|c| c.as_ref().map_or(f64::NAN, Value::to_f64))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// An ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    pub fn from_columns(columns: Vec<Column>) -> BacktestResult<Self> {
        let mut table = Table::new();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Append a column. Duplicate names and ragged lengths are rejected so
    /// that a column lookup by name is always unambiguous and every row is
    /// complete across columns.
    pub fn push_column(&mut self, column: Column) -> BacktestResult<()> {
        if self.columns.iter().any(|c| c.name == column.name) {
            return Err(BacktestError::DuplicateColumn {
                column: column.name,
            });
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(BacktestError::LengthMismatch {
                    column: column.name,
                    expected: first.len(),
                    actual: column.len(),
                });
            }
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// True when the table holds zero rows (including the no-columns case).
    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_orders_numerically_across_forms() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert!(Value::Int(1) < Value::Float(1.5));
        assert!(Value::Float(3.0) < Value::Int(4));
    }

    #[test]
    fn test_numbers_order_before_text() {
        assert!(Value::Int(99) < Value::from("AAA"));
        assert!(Value::from("AA") < Value::from("BBB"));
    }

    #[test]
    fn test_text_cell_is_nan_numerically() {
        assert!(Value::from("AAA").to_f64().is_nan());
        assert_eq!(Value::Int(3).to_f64(), 3.0);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut table = Table::new();
        table
            .push_column(Column::dense("ratings", vec![1i64, 2]))
            .unwrap();
        let err = table
            .push_column(Column::dense("ratings", vec![3i64, 4]))
            .unwrap_err();
        assert_eq!(
            err,
            BacktestError::DuplicateColumn {
                column: "ratings".into()
            }
        );
    }

    #[test]
    fn test_ragged_column_rejected() {
        let mut table = Table::new();
        table
            .push_column(Column::dense("ratings", vec![1i64, 2]))
            .unwrap();
        let err = table
            .push_column(Column::dense("pds", vec![0.1]))
            .unwrap_err();
        assert_eq!(
            err,
            BacktestError::LengthMismatch {
                column: "pds".into(),
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_empty_table_has_zero_rows() {
        assert!(Table::new().is_empty());
        let table = Table::from_columns(vec![Column::dense("a", Vec::<i64>::new())]).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_cells_detected() {
        let column = Column::new("flags", vec![Some(Value::Int(0)), None]);
        assert!(column.has_missing());
        assert_eq!(column.get(1), None);
    }

    #[test]
    fn test_value_serde_untagged() {
        let v: Value = serde_json::from_str("3").unwrap();
        assert_eq!(v, Value::Int(3));
        let v: Value = serde_json::from_str("0.25").unwrap();
        assert_eq!(v, Value::Float(0.25));
        let v: Value = serde_json::from_str("\"ratings\"").unwrap();
        assert_eq!(v, Value::from("ratings"));
    }

    #[test]
    fn test_table_serialization_roundtrip() {
        let table = Table::from_columns(vec![
            Column::dense("ratings", vec![1i64, 2]),
            Column::dense("pds", vec![0.1, 0.2]),
        ])
        .unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let back: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(back.n_rows(), 2);
        assert!(back.column("pds").is_some());
    }
}
