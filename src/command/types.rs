//! Command types

use serde::Serialize;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::paper::PerformanceSummary;
use crate::state::TickerStats;

/// Command channel errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("scan loop is not running")]
    Closed,
    #[error("scan loop dropped the reply")]
    NoReply,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Reply to a stats request
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub tickers: Vec<TickerStats>,
    pub paper: PerformanceSummary,
}

/// A request executed by the scan loop between cycles
#[derive(Debug)]
pub enum Command {
    /// Suppress alerts for a symbol for the rest of the session
    Mute {
        symbol: String,
        reply: oneshot::Sender<bool>,
    },
    ListMuted {
        reply: oneshot::Sender<Vec<String>>,
    },
    /// Top `n` tickers by lifetime alert count
    Stats {
        n: usize,
        reply: oneshot::Sender<StatsReport>,
    },
    /// Clear every counter, cooldown and mute
    Reset { reply: oneshot::Sender<()> },
}
