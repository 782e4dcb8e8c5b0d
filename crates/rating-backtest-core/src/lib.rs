//! Statistical backtesting procedures for credit-rating models.
//!
//! Given a table of obligors carrying a rating grade, an assigned
//! probability of default and an observed default outcome, these routines
//! compute the standard validation statistics: calibration tests (binomial,
//! Spiegelhalter, traffic lights), discriminatory-power measures (Somers' D,
//! coefficient of concordance, information value, loss capture ratio) and
//! stability measures (population stability index, migration-matrix
//! bandwidths).
//!
//! Every test is a pure function of a [`table::Table`] plus named column
//! arguments and is validated up front by the shared contract in
//! [`contract`]; results come back as plain serializable values. Nothing is
//! cached or mutated, so the functions are safe to call concurrently on
//! shared input tables.

pub mod bucket;
pub mod contract;
pub mod error;
pub mod table;

#[cfg(feature = "calibration")]
pub mod calibration;

#[cfg(feature = "discrimination")]
pub mod discrimination;

#[cfg(feature = "stability")]
pub mod stability;

pub use error::BacktestError;
pub use table::{Column, Table, Value};

/// Standard result type for all backtest operations
pub type BacktestResult<T> = Result<T, BacktestError>;
