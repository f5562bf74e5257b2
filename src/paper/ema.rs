//! Exponential moving averages

use rust_decimal::Decimal;

/// EMA of `prices` (oldest first) with smoothing `2 / (period + 1)`.
///
/// Seeded with the first price, no bias adjustment. Returns None when there
/// are fewer than `period` prices.
pub fn ema(prices: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let alpha = Decimal::TWO / Decimal::from(period as u64 + 1);
    let mut iter = prices.iter();
    let mut value = *iter.next()?;
    for price in iter {
        value += alpha * (*price - value);
    }
    Some(value)
}

/// Fast and slow EMA of one price series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmaPair {
    pub fast: Option<Decimal>,
    pub slow: Option<Decimal>,
}

impl EmaPair {
    pub fn compute(prices: &[Decimal], fast: usize, slow: usize) -> Self {
        Self {
            fast: ema(prices, fast),
            slow: ema(prices, slow),
        }
    }

    /// Slow EMA, or the fast one while the slow period is not yet filled
    pub fn exit_line(&self) -> Option<Decimal> {
        self.slow.or(self.fast)
    }
}
