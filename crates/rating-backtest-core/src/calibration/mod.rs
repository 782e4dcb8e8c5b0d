//! Calibration backtests: realized default rates against assigned PDs.

pub mod binomial;
pub mod spiegelhalter;
pub mod traffic_lights;

/// Default significance level for the calibration tests.
pub const DEFAULT_ALPHA: f64 = 0.05;

pub(crate) fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}
