//! Flat-period detector

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use super::types::{FlatPeriodResult, FlatReason};
use crate::config::FlatWindowConfig;
use crate::state::PriceWindow;

/// Threshold set for one kind of flat window
#[derive(Debug, Clone)]
pub struct FlatDetector {
    volatility_threshold_pct: Decimal,
    min_duration: Duration,
    min_samples: usize,
}

impl FlatDetector {
    pub fn new(config: &FlatWindowConfig) -> Self {
        Self {
            volatility_threshold_pct: config.volatility_threshold_pct,
            min_duration: Duration::minutes(config.min_duration_minutes as i64),
            min_samples: config.min_samples,
        }
    }

    /// Append a sample, prune, then evaluate the window
    pub fn observe(
        &self,
        window: &mut PriceWindow,
        timestamp: DateTime<Utc>,
        price: Decimal,
    ) -> FlatPeriodResult {
        window.push(timestamp, price);
        self.evaluate(window)
    }

    /// Prune relative to `now`, then evaluate without adding a sample
    pub fn evaluate_at(&self, window: &mut PriceWindow, now: DateTime<Utc>) -> FlatPeriodResult {
        window.prune(now);
        self.evaluate(window)
    }

    /// Evaluate the window as it stands
    pub fn evaluate(&self, window: &PriceWindow) -> FlatPeriodResult {
        let samples = window.len();
        let (first_ts, last_ts, last_price) = match (window.first(), window.last()) {
            (Some((first_ts, _)), Some((last_ts, last_price))) => (first_ts, last_ts, last_price),
            _ => return FlatPeriodResult::insufficient(Decimal::ZERO, 0),
        };
        if samples < self.min_samples {
            return FlatPeriodResult::insufficient(last_price, samples);
        }

        let prices = window.prices();
        let sum: Decimal = prices.iter().sum();
        let avg = sum / Decimal::from(samples);
        let low = prices.iter().copied().min().unwrap_or(last_price);
        let high = prices.iter().copied().max().unwrap_or(last_price);

        let volatility_pct = if avg > Decimal::ZERO {
            (high - low) / avg * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        let duration = last_ts - first_ts;

        let calm = volatility_pct <= self.volatility_threshold_pct;
        let long_enough = duration >= self.min_duration;
        let reason = match (calm, long_enough) {
            (true, true) => FlatReason::Flat,
            (false, _) => FlatReason::TooVolatile,
            (true, false) => FlatReason::TooShort,
        };

        FlatPeriodResult {
            is_flat: calm && long_enough,
            reason,
            duration_secs: duration.num_seconds(),
            volatility_pct,
            avg_price: avg,
            price_range: (low, high),
            samples,
        }
    }
}
