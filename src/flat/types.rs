//! Flat-period result types

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why a window was or was not judged flat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlatReason {
    Flat,
    InsufficientData,
    TooVolatile,
    TooShort,
}

/// Verdict over one price window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatPeriodResult {
    pub is_flat: bool,
    pub reason: FlatReason,
    /// Span between the oldest and newest sample
    pub duration_secs: i64,
    /// (high - low) / avg * 100
    pub volatility_pct: Decimal,
    pub avg_price: Decimal,
    /// (low, high)
    pub price_range: (Decimal, Decimal),
    pub samples: usize,
}

impl FlatPeriodResult {
    pub fn insufficient(price: Decimal, samples: usize) -> Self {
        Self {
            is_flat: false,
            reason: FlatReason::InsufficientData,
            duration_secs: 0,
            volatility_pct: Decimal::ZERO,
            avg_price: price,
            price_range: (price, price),
            samples,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.duration_secs)
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_secs / 60
    }
}
