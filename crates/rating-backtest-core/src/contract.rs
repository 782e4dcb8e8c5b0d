//! Shared input validation applied before every backtest.
//!
//! Every test runs the same fail-fast sequence over its column-name
//! arguments: non-empty table, argument presence, argument type, column
//! existence, then a missing-value scan per column in argument order. The
//! first failing check aborts the call; nothing is computed past it.

use crate::error::BacktestError;
use crate::table::{Column, Table, Value};
use crate::BacktestResult;

/// One named column argument as supplied by the caller. `value` is `None`
/// when the argument was never set; a non-text value (e.g. a number arriving
/// through JSON deserialization) fails the type check.
pub struct ColumnArg<'a> {
    pub name: &'static str,
    pub value: Option<&'a Value>,
}

impl<'a> ColumnArg<'a> {
    pub fn new(name: &'static str, value: Option<&'a Value>) -> Self {
        ColumnArg { name, value }
    }
}

/// Resolve all column arguments of a test against the table, running the
/// full contract. Returns the columns in argument order.
pub fn resolve_columns<'a, const N: usize>(
    df: &'a Table,
    args: [ColumnArg<'_>; N],
) -> BacktestResult<[&'a Column; N]> {
    if df.is_empty() {
        return Err(BacktestError::EmptyInput);
    }

    for arg in &args {
        if arg.value.is_none() {
            return Err(BacktestError::MissingArgument { argument: arg.name });
        }
    }

    let mut names: Vec<&str> = Vec::with_capacity(N);
    for arg in &args {
        if let Some(value) = arg.value {
            match value {
                Value::Text(name) => names.push(name.as_str()),
                other => {
                    return Err(BacktestError::InvalidArgumentType {
                        argument: arg.name,
                        found: other.kind(),
                    })
                }
            }
        }
    }

    let mut columns: Vec<&Column> = Vec::with_capacity(N);
    for name in &names {
        match df.column(name) {
            Some(column) => columns.push(column),
            None => {
                return Err(BacktestError::UnknownColumn {
                    column: (*name).to_string(),
                })
            }
        }
    }

    for column in &columns {
        if column.has_missing() {
            return Err(BacktestError::MissingValue {
                column: column.name().to_string(),
            });
        }
    }

    Ok(std::array::from_fn(|i| columns[i]))
}
