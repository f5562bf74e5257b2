//! Persisted state types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::alert::AlertType;
use crate::paper::{CompletedTrade, PaperPosition};
use crate::scoring::ProbabilityCategory;
use crate::state::TickerRecord;

/// Current layout of `state.json`
pub const STATE_VERSION: u32 = 1;

/// Persistence errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unsupported state version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Everything that survives a restart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tickers: BTreeMap<String, TickerRecord>,
    #[serde(default)]
    pub positions: BTreeMap<String, PaperPosition>,
    #[serde(default)]
    pub trades: Vec<CompletedTrade>,
    /// Paper account balance; None before the first save
    #[serde(default)]
    pub balance: Option<Decimal>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            saved_at: None,
            tickers: BTreeMap::new(),
            positions: BTreeMap::new(),
            trades: Vec::new(),
            balance: None,
        }
    }
}

/// One line of the alert journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub alert_type: AlertType,
    pub score: i32,
    pub probability_category: ProbabilityCategory,
    pub price: Decimal,
    pub change_pct: Decimal,
    pub relative_volume: Option<Decimal>,
    pub lifetime_alert_count: u64,
    pub session_alert_count: u64,
    /// Suppressed because the user muted the symbol
    pub muted: bool,
}
