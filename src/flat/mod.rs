//! Flat-period detection
//!
//! Decides whether a symbol's recent price action was "flat": low
//! volatility sustained over a minimum duration. Intraday and after-hours
//! windows are evaluated with independent thresholds.

mod detector;
mod types;

pub use detector::FlatDetector;
pub use types::{FlatPeriodResult, FlatReason};
