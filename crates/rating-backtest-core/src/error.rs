use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BacktestError {
    #[error("no data provided")]
    EmptyInput,

    #[error("no column name provided for {argument}")]
    MissingArgument { argument: &'static str },

    #[error("{argument} not of type string (got {found})")]
    InvalidArgumentType {
        argument: &'static str,
        found: &'static str,
    },

    #[error("{column} is not a column in the table")]
    UnknownColumn { column: String },

    #[error("missing values in {column}")]
    MissingValue { column: String },

    #[error("duplicate column {column}")]
    DuplicateColumn { column: String },

    #[error("column {column} has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}
