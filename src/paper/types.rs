//! Paper trading types

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::alert::AlertType;

/// Why a position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    /// Price crossed below the exit EMA
    EmaExit,
    /// Forced liquidation at the end-of-day cutoff
    EodCutoff,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::EmaExit => "EMA_EXIT",
            ExitReason::EodCutoff => "EOD_CUTOFF",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open simulated position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperPosition {
    /// Position identifier
    pub id: Uuid,
    pub symbol: String,
    /// Alert that triggered the entry
    pub alert_type: AlertType,
    pub entry_price: Decimal,
    /// Fractional share count, `notional / entry_price`
    pub shares: Decimal,
    /// Cash committed at entry
    pub notional: Decimal,
    pub entry_time: DateTime<Utc>,
    pub entry_ema_fast: Option<Decimal>,
    pub entry_ema_slow: Option<Decimal>,
}

/// A closed position with realized P&L
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTrade {
    /// Original position
    pub position: PaperPosition,
    pub exit_price: Decimal,
    pub exit_time: DateTime<Utc>,
    pub exit_reason: ExitReason,
    /// `shares * exit_price - notional`
    pub pnl_abs: Decimal,
    /// `pnl_abs / notional * 100`
    pub pnl_pct: Decimal,
}

impl CompletedTrade {
    pub fn symbol(&self) -> &str {
        &self.position.symbol
    }

    pub fn holding_time(&self) -> Duration {
        self.exit_time - self.position.entry_time
    }

    pub fn is_win(&self) -> bool {
        self.pnl_abs > Decimal::ZERO
    }
}

/// Why an alert did not open a position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBlock {
    Disabled,
    AlreadyOpen,
    InvalidPrice,
    MaxPositions { open: usize, max: usize },
    InsufficientBalance { balance: Decimal, notional: Decimal },
    InsufficientSamples { have: usize, need: usize },
    BelowEma { price: Decimal, ema: Decimal },
    /// Inside the end-of-day liquidation window
    EodWindow,
}

impl fmt::Display for EntryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryBlock::Disabled => f.write_str("paper trading disabled"),
            EntryBlock::AlreadyOpen => f.write_str("position already open"),
            EntryBlock::InvalidPrice => f.write_str("invalid price"),
            EntryBlock::MaxPositions { open, max } => {
                write!(f, "max concurrent positions reached ({open}/{max})")
            }
            EntryBlock::InsufficientBalance { balance, notional } => {
                write!(f, "balance {balance} below notional {notional}")
            }
            EntryBlock::InsufficientSamples { have, need } => {
                write!(f, "{have}/{need} price samples")
            }
            EntryBlock::BelowEma { price, ema } => write!(f, "price {price} <= fast EMA {ema}"),
            EntryBlock::EodWindow => f.write_str("inside end-of-day window"),
        }
    }
}

/// Aggregate statistics over completed trades
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_pct: Decimal,
    pub total_pnl: Decimal,
    pub average_pnl_pct: Decimal,
    pub median_pnl_pct: Decimal,
    pub best_trade: Decimal,
    pub worst_trade: Decimal,
    pub average_holding_minutes: Decimal,
    pub balance: Decimal,
    pub total_return_pct: Decimal,
    pub open_positions: usize,
    pub max_concurrent_positions: usize,
}

impl fmt::Display for PerformanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "trades: {} ({} won, {} lost, win rate {}%)",
            self.total_trades,
            self.winning_trades,
            self.losing_trades,
            self.win_rate_pct.round_dp(1)
        )?;
        writeln!(
            f,
            "pnl: {} total, {}% avg, {}% median, best {}, worst {}",
            self.total_pnl.round_dp(2),
            self.average_pnl_pct.round_dp(2),
            self.median_pnl_pct.round_dp(2),
            self.best_trade.round_dp(2),
            self.worst_trade.round_dp(2)
        )?;
        writeln!(f, "avg holding: {} min", self.average_holding_minutes.round_dp(1))?;
        write!(
            f,
            "balance: {} ({}% return), open positions {}/{}",
            self.balance.round_dp(2),
            self.total_return_pct.round_dp(2),
            self.open_positions,
            self.max_concurrent_positions
        )
    }
}
