//! Per-symbol state

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::store::WindowSettings;
use super::window::PriceWindow;
use crate::alert::AlertType;
use crate::flat::FlatPeriodResult;

/// Rolling history and alert bookkeeping for one symbol
#[derive(Debug, Clone)]
pub struct TickerState {
    pub symbol: String,
    /// Intraday samples for flat-period detection
    pub flat_window: PriceWindow,
    /// Short window for windowed spike detection
    pub spike_window: PriceWindow,
    /// Samples taken during after-hours only
    pub afterhours_window: PriceWindow,
    /// Flat verdict from the previous cycle, i.e. before the latest move
    pub prior_flat: Option<FlatPeriodResult>,
    /// Flat verdict including the latest sample
    pub current_flat: Option<FlatPeriodResult>,
    /// Verdict over the previous after-hours session, set during premarket
    pub afterhours_flat: Option<FlatPeriodResult>,
    pub lifetime_alert_count: u64,
    pub session_alert_count: u64,
    pub alert_type_histogram: BTreeMap<AlertType, u64>,
    pub last_alert_time: Option<DateTime<Utc>>,
    /// change_pct of the most recent dispatched alerts, oldest first
    pub recent_changes: VecDeque<Decimal>,
    /// Muted by the user for the current session
    pub disregarded: bool,
}

impl TickerState {
    pub fn new(symbol: impl Into<String>, windows: &WindowSettings) -> Self {
        Self {
            symbol: symbol.into(),
            flat_window: PriceWindow::new(windows.flat),
            spike_window: PriceWindow::new(windows.spike),
            afterhours_window: PriceWindow::new(windows.afterhours),
            prior_flat: None,
            current_flat: None,
            afterhours_flat: None,
            lifetime_alert_count: 0,
            session_alert_count: 0,
            alert_type_histogram: BTreeMap::new(),
            last_alert_time: None,
            recent_changes: VecDeque::new(),
            disregarded: false,
        }
    }

    /// Bookkeeping for an approved (dispatched) alert
    pub fn record_alert(
        &mut self,
        alert_type: AlertType,
        change_pct: Decimal,
        now: DateTime<Utc>,
        history_len: usize,
    ) {
        self.last_alert_time = Some(now);
        self.lifetime_alert_count += 1;
        self.session_alert_count += 1;
        *self.alert_type_histogram.entry(alert_type).or_insert(0) += 1;

        self.recent_changes.push_back(change_pct);
        while self.recent_changes.len() > history_len {
            self.recent_changes.pop_front();
        }
    }

    /// Mean change_pct of recent alerts, if at least `min_history` exist
    pub fn average_recent_change(&self, min_history: usize) -> Option<Decimal> {
        if self.recent_changes.is_empty() || self.recent_changes.len() < min_history {
            return None;
        }
        let sum: Decimal = self.recent_changes.iter().sum();
        Some(sum / Decimal::from(self.recent_changes.len()))
    }

    /// Forget counters, history, cooldown and mute; price windows stay
    pub fn reset_counters(&mut self) {
        self.lifetime_alert_count = 0;
        self.session_alert_count = 0;
        self.alert_type_histogram.clear();
        self.last_alert_time = None;
        self.recent_changes.clear();
        self.disregarded = false;
    }

    pub fn to_record(&self) -> TickerRecord {
        TickerRecord {
            lifetime_alert_count: self.lifetime_alert_count,
            alert_type_histogram: self.alert_type_histogram.clone(),
            last_alert_time: self.last_alert_time,
            recent_changes: self.recent_changes.iter().copied().collect(),
        }
    }

    pub fn from_record(symbol: impl Into<String>, record: TickerRecord, windows: &WindowSettings) -> Self {
        Self {
            lifetime_alert_count: record.lifetime_alert_count,
            alert_type_histogram: record.alert_type_histogram,
            last_alert_time: record.last_alert_time,
            recent_changes: record.recent_changes.into_iter().collect(),
            ..Self::new(symbol, windows)
        }
    }

    /// Has this ticker ever produced a dispatched alert or been muted
    pub fn has_history(&self) -> bool {
        self.lifetime_alert_count > 0 || self.last_alert_time.is_some() || self.disregarded
    }
}

/// Durable subset of [`TickerState`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    pub lifetime_alert_count: u64,
    #[serde(default)]
    pub alert_type_histogram: BTreeMap<AlertType, u64>,
    #[serde(default)]
    pub last_alert_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recent_changes: Vec<Decimal>,
}
