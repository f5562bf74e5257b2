//! Time-bounded price window

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Ordered (timestamp, price) samples pruned to a trailing duration
///
/// Timestamps are strictly increasing. A sample older than the newest one is
/// dropped; a sample at the same instant replaces the newest price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceWindow {
    samples: VecDeque<(DateTime<Utc>, Decimal)>,
    retention: Duration,
    max_samples: Option<usize>,
}

impl PriceWindow {
    pub fn new(retention: Duration) -> Self {
        Self {
            samples: VecDeque::new(),
            retention,
            max_samples: None,
        }
    }

    /// Window that additionally keeps at most `max_samples` entries
    pub fn with_max_samples(retention: Duration, max_samples: usize) -> Self {
        Self {
            max_samples: Some(max_samples),
            ..Self::new(retention)
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Append a sample and prune relative to its timestamp.
    ///
    /// Returns false if the sample was older than the newest one and ignored.
    pub fn push(&mut self, timestamp: DateTime<Utc>, price: Decimal) -> bool {
        match self.samples.back_mut() {
            Some((last_ts, _)) if timestamp < *last_ts => return false,
            Some((last_ts, last_price)) if timestamp == *last_ts => *last_price = price,
            _ => self.samples.push_back((timestamp, price)),
        }

        self.prune(timestamp);

        if let Some(max) = self.max_samples {
            while self.samples.len() > max {
                self.samples.pop_front();
            }
        }
        true
    }

    /// Remove samples older than `now - retention`
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.retention;
        while let Some((ts, _)) = self.samples.front() {
            if *ts < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(DateTime<Utc>, Decimal)> {
        self.samples.iter()
    }

    /// Prices oldest first
    pub fn prices(&self) -> Vec<Decimal> {
        self.samples.iter().map(|(_, p)| *p).collect()
    }

    pub fn first(&self) -> Option<(DateTime<Utc>, Decimal)> {
        self.samples.front().copied()
    }

    pub fn last(&self) -> Option<(DateTime<Utc>, Decimal)> {
        self.samples.back().copied()
    }

    /// Percent change from the oldest to the newest sample
    pub fn change_pct(&self) -> Option<Decimal> {
        if self.samples.len() < 2 {
            return None;
        }
        let (_, first) = self.first()?;
        let (_, last) = self.last()?;
        if first.is_zero() {
            return None;
        }
        Some((last - first) / first * Decimal::ONE_HUNDRED)
    }
}
