//! Ticker state store

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::ticker::{TickerRecord, TickerState};
use crate::alert::AlertType;
use crate::config::Config;

/// Retention of each per-ticker window
#[derive(Debug, Clone, Copy)]
pub struct WindowSettings {
    pub flat: Duration,
    pub spike: Duration,
    pub afterhours: Duration,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl WindowSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            flat: Duration::minutes(config.flat.intraday.window_minutes as i64),
            spike: Duration::minutes(config.classifier.spike_window_minutes as i64),
            afterhours: Duration::minutes(config.flat.afterhours.window_minutes as i64),
        }
    }
}

/// Per-ticker summary for the `stats` command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerStats {
    pub symbol: String,
    pub lifetime_alert_count: u64,
    pub session_alert_count: u64,
    pub alert_type_histogram: BTreeMap<AlertType, u64>,
    pub last_alert_time: Option<DateTime<Utc>>,
    pub disregarded: bool,
}

/// Map of symbol -> [`TickerState`]
#[derive(Debug, Clone)]
pub struct TickerStore {
    tickers: HashMap<String, TickerState>,
    windows: WindowSettings,
}

impl TickerStore {
    pub fn new(windows: WindowSettings) -> Self {
        Self {
            tickers: HashMap::new(),
            windows,
        }
    }

    /// Rebuild from persisted records
    pub fn from_records(records: BTreeMap<String, TickerRecord>, windows: WindowSettings) -> Self {
        let tickers = records
            .into_iter()
            .map(|(symbol, record)| {
                let state = TickerState::from_record(symbol.clone(), record, &windows);
                (symbol, state)
            })
            .collect();
        Self { tickers, windows }
    }

    /// Durable records for tickers that carry alert history
    pub fn to_records(&self) -> BTreeMap<String, TickerRecord> {
        self.tickers
            .iter()
            .filter(|(_, s)| s.lifetime_alert_count > 0 || s.last_alert_time.is_some())
            .map(|(symbol, s)| (symbol.clone(), s.to_record()))
            .collect()
    }

    pub fn get(&self, symbol: &str) -> Option<&TickerState> {
        self.tickers.get(symbol)
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut TickerState> {
        self.tickers.get_mut(symbol)
    }

    pub fn entry(&mut self, symbol: &str) -> &mut TickerState {
        let windows = self.windows;
        self.tickers
            .entry(symbol.to_string())
            .or_insert_with(|| TickerState::new(symbol, &windows))
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn lifetime_count(&self, symbol: &str) -> u64 {
        self.get(symbol).map_or(0, |s| s.lifetime_alert_count)
    }

    /// Mute a symbol for the session; returns false if it was already muted
    pub fn mute(&mut self, symbol: &str) -> bool {
        let state = self.entry(symbol);
        let newly = !state.disregarded;
        state.disregarded = true;
        newly
    }

    pub fn is_muted(&self, symbol: &str) -> bool {
        self.get(symbol).is_some_and(|s| s.disregarded)
    }

    /// Muted symbols, sorted
    pub fn list_muted(&self) -> Vec<String> {
        let mut muted: Vec<String> = self
            .tickers
            .values()
            .filter(|s| s.disregarded)
            .map(|s| s.symbol.clone())
            .collect();
        muted.sort();
        muted
    }

    /// Top `n` tickers by lifetime alert count, ties broken by symbol
    pub fn stats(&self, n: usize) -> Vec<TickerStats> {
        let mut rows: Vec<&TickerState> = self
            .tickers
            .values()
            .filter(|s| s.lifetime_alert_count > 0)
            .collect();
        rows.sort_by(|a, b| {
            b.lifetime_alert_count
                .cmp(&a.lifetime_alert_count)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        rows.into_iter()
            .take(n)
            .map(|s| TickerStats {
                symbol: s.symbol.clone(),
                lifetime_alert_count: s.lifetime_alert_count,
                session_alert_count: s.session_alert_count,
                alert_type_histogram: s.alert_type_histogram.clone(),
                last_alert_time: s.last_alert_time,
                disregarded: s.disregarded,
            })
            .collect()
    }

    /// Clear counters, histories, cooldowns and mutes for every ticker
    pub fn reset(&mut self) {
        for state in self.tickers.values_mut() {
            state.reset_counters();
        }
    }

    /// New trading day: session counters and mutes start over
    pub fn start_session(&mut self) {
        for state in self.tickers.values_mut() {
            state.session_alert_count = 0;
            state.disregarded = false;
        }
    }

    /// Drop tickers with empty windows and no alert history
    pub fn evict_idle(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.tickers.len();
        self.tickers.retain(|_, s| {
            s.flat_window.prune(now);
            s.spike_window.prune(now);
            s.afterhours_window.prune(now);
            s.has_history()
                || !s.flat_window.is_empty()
                || !s.spike_window.is_empty()
                || !s.afterhours_window.is_empty()
        });
        before - self.tickers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TickerState> {
        self.tickers.values()
    }
}
