//! Quote and snapshot types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::ScannerConfig;

/// Metrics for one ticker in one snapshot
///
/// Optional fields are absent when the provider has no value for them;
/// rules that depend on a missing field skip the ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerQuote {
    /// Ticker symbol (e.g., "ABCD")
    pub symbol: String,
    /// Last traded price
    pub price: Decimal,
    /// Session volume
    #[serde(default)]
    pub volume: u64,
    /// Change versus previous close, in percent
    #[serde(default)]
    pub change_pct: Option<Decimal>,
    /// Change versus today's open, in percent
    #[serde(default)]
    pub change_from_open: Option<Decimal>,
    /// Change versus previous session close, in percent
    #[serde(default)]
    pub change_from_prev_close: Option<Decimal>,
    /// Premarket change, in percent
    #[serde(default)]
    pub premarket_change: Option<Decimal>,
    /// Premarket volume
    #[serde(default)]
    pub premarket_volume: Option<u64>,
    /// Volume relative to the trailing average (e.g., 12.5 = 12.5x)
    #[serde(default)]
    pub relative_volume: Option<Decimal>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub float_shares: Option<u64>,
}

impl TickerQuote {
    /// Minimal quote with only symbol and price set
    pub fn new(symbol: impl Into<String>, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume: 0,
            change_pct: None,
            change_from_open: None,
            change_from_prev_close: None,
            premarket_change: None,
            premarket_volume: None,
            relative_volume: None,
            sector: None,
            exchange: None,
            float_shares: None,
        }
    }

    /// Whether the quote belongs to the scanned universe
    pub fn in_universe(&self, scanner: &ScannerConfig) -> bool {
        if self.price <= Decimal::ZERO || self.price >= scanner.max_price {
            return false;
        }
        match &self.exchange {
            Some(exchange) => !scanner
                .excluded_exchanges
                .iter()
                .any(|x| x.eq_ignore_ascii_case(exchange)),
            None => true,
        }
    }
}

/// One poll cycle's quotes, ordered by rank (best first)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub timestamp: DateTime<Utc>,
    pub quotes: Vec<TickerQuote>,
}

impl MarketSnapshot {
    pub fn new(timestamp: DateTime<Utc>, quotes: Vec<TickerQuote>) -> Self {
        Self { timestamp, quotes }
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Copy of the snapshot restricted to the scanned universe, ranks recomputed
    pub fn filter_universe(&self, scanner: &ScannerConfig) -> Self {
        Self {
            timestamp: self.timestamp,
            quotes: self
                .quotes
                .iter()
                .filter(|q| q.in_universe(scanner))
                .cloned()
                .collect(),
        }
    }

    /// Symbol -> 1-based rank; the first occurrence wins on duplicates
    pub fn ranks(&self) -> HashMap<&str, usize> {
        let mut ranks = HashMap::with_capacity(self.quotes.len());
        for (i, quote) in self.quotes.iter().enumerate() {
            ranks.entry(quote.symbol.as_str()).or_insert(i + 1);
        }
        ranks
    }

    /// Symbol -> quote
    pub fn by_symbol(&self) -> HashMap<&str, &TickerQuote> {
        let mut map = HashMap::with_capacity(self.quotes.len());
        for quote in &self.quotes {
            map.entry(quote.symbol.as_str()).or_insert(quote);
        }
        map
    }

    pub fn get(&self, symbol: &str) -> Option<&TickerQuote> {
        self.quotes.iter().find(|q| q.symbol == symbol)
    }
}
