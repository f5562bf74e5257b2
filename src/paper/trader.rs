//! Paper trader
//!
//! One fixed-notional long position per symbol, opened on an alert when the
//! price is above the fast EMA and closed when it drops below the slow EMA
//! or at the end-of-day cutoff.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ema::EmaPair;
use super::types::{CompletedTrade, EntryBlock, ExitReason, PaperPosition, PerformanceSummary};
use crate::alert::AlertType;
use crate::config::PaperConfig;
use crate::market::SessionCalendar;
use crate::state::PriceWindow;

/// Simulated account with per-symbol price history
#[derive(Debug, Clone)]
pub struct PaperTrader {
    config: PaperConfig,
    calendar: SessionCalendar,
    windows: HashMap<String, PriceWindow>,
    positions: BTreeMap<String, PaperPosition>,
    trades: Vec<CompletedTrade>,
    balance: Decimal,
}

impl PaperTrader {
    pub fn new(config: PaperConfig, calendar: SessionCalendar) -> Self {
        let balance = config.initial_balance;
        Self {
            config,
            calendar,
            windows: HashMap::new(),
            positions: BTreeMap::new(),
            trades: Vec::new(),
            balance,
        }
    }

    /// Replace account state with persisted positions, trades and balance
    pub fn restore(
        &mut self,
        positions: BTreeMap<String, PaperPosition>,
        trades: Vec<CompletedTrade>,
        balance: Option<Decimal>,
    ) {
        self.positions = positions;
        self.trades = trades;
        self.balance = balance.unwrap_or(self.config.initial_balance);
    }

    pub fn config(&self) -> &PaperConfig {
        &self.config
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn positions(&self) -> &BTreeMap<String, PaperPosition> {
        &self.positions
    }

    pub fn position(&self, symbol: &str) -> Option<&PaperPosition> {
        self.positions.get(symbol)
    }

    pub fn trades(&self) -> &[CompletedTrade] {
        &self.trades
    }

    pub fn open_count(&self) -> usize {
        self.positions.len()
    }

    /// `floor(max_exposure_pct * initial_balance / notional)`
    pub fn max_concurrent_positions(&self) -> usize {
        if self.config.notional <= Decimal::ZERO {
            return 0;
        }
        (self.config.max_exposure_pct * self.config.initial_balance / self.config.notional)
            .floor()
            .to_usize()
            .unwrap_or(0)
    }

    /// Sum of realized P&L
    pub fn realized_pnl(&self) -> Decimal {
        self.trades.iter().map(|t| t.pnl_abs).sum()
    }

    /// Number of samples held for `symbol`
    pub fn samples(&self, symbol: &str) -> usize {
        self.windows.get(symbol).map_or(0, PriceWindow::len)
    }

    pub fn record_price(&mut self, symbol: &str, ts: DateTime<Utc>, price: Decimal) {
        if price <= Decimal::ZERO {
            return;
        }
        let retention = Duration::minutes(self.config.window_minutes as i64);
        let max_samples = self.config.max_samples;
        self.windows
            .entry(symbol.to_string())
            .or_insert_with(|| PriceWindow::with_max_samples(retention, max_samples))
            .push(ts, price);
    }

    pub fn emas(&self, symbol: &str) -> EmaPair {
        let prices = self
            .windows
            .get(symbol)
            .map(PriceWindow::prices)
            .unwrap_or_default();
        EmaPair::compute(&prices, self.config.ema_fast, self.config.ema_slow)
    }

    /// Weekday, regular session, at or past the cutoff
    pub fn is_eod(&self, now: DateTime<Utc>) -> bool {
        self.calendar.is_past_cutoff(now, self.config.eod_cutoff)
    }

    /// Record the latest prices and run exits.
    ///
    /// The end-of-day liquidation takes precedence over signal exits.
    pub fn update_prices(
        &mut self,
        prices: &HashMap<String, Decimal>,
        now: DateTime<Utc>,
    ) -> Vec<CompletedTrade> {
        for (symbol, price) in prices {
            self.record_price(symbol, now, *price);
        }

        if self.positions.is_empty() {
            return Vec::new();
        }
        if self.is_eod(now) {
            return self.force_exit_all(prices, now, ExitReason::EodCutoff);
        }

        let exits: Vec<(String, Decimal)> = self
            .positions
            .keys()
            .filter_map(|symbol| prices.get(symbol).map(|p| (symbol.clone(), *p)))
            .filter(|(symbol, price)| self.should_exit(symbol, *price))
            .collect();

        exits
            .into_iter()
            .filter_map(|(symbol, price)| self.close(&symbol, price, now, ExitReason::EmaExit))
            .collect()
    }

    /// Price below the slow EMA, or the fast one with too few samples
    pub fn should_exit(&self, symbol: &str, price: Decimal) -> bool {
        if !self.positions.contains_key(symbol) {
            return false;
        }
        match self.emas(symbol).exit_line() {
            Some(line) => price < line,
            None => false,
        }
    }

    /// Close every open position, at the given price or the last known one
    pub fn force_exit_all(
        &mut self,
        prices: &HashMap<String, Decimal>,
        now: DateTime<Utc>,
        reason: ExitReason,
    ) -> Vec<CompletedTrade> {
        let symbols: Vec<String> = self.positions.keys().cloned().collect();
        if symbols.is_empty() {
            return Vec::new();
        }
        info!(count = symbols.len(), %reason, "Force exiting all positions");

        let mut closed = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let price = prices
                .get(&symbol)
                .copied()
                .filter(|p| *p > Decimal::ZERO)
                .or_else(|| {
                    self.windows
                        .get(&symbol)
                        .and_then(PriceWindow::last)
                        .map(|(_, p)| p)
                });
            let price = match price {
                Some(p) => p,
                None => {
                    let entry = self.positions.get(&symbol).map_or(Decimal::ZERO, |p| p.entry_price);
                    warn!(symbol = %symbol, entry_price = %entry, "No current price, exiting at entry price");
                    entry
                }
            };
            if let Some(trade) = self.close(&symbol, price, now, reason) {
                closed.push(trade);
            }
        }
        closed
    }

    /// Open a position if every entry condition holds
    pub fn try_enter(
        &mut self,
        symbol: &str,
        price: Decimal,
        alert_type: AlertType,
        now: DateTime<Utc>,
    ) -> Result<PaperPosition, EntryBlock> {
        if !self.config.enabled {
            return Err(EntryBlock::Disabled);
        }
        if price <= Decimal::ZERO {
            return Err(EntryBlock::InvalidPrice);
        }
        self.record_price(symbol, now, price);

        if self.positions.contains_key(symbol) {
            return Err(EntryBlock::AlreadyOpen);
        }
        let max = self.max_concurrent_positions();
        if self.positions.len() >= max {
            return Err(EntryBlock::MaxPositions {
                open: self.positions.len(),
                max,
            });
        }
        if self.balance < self.config.notional {
            return Err(EntryBlock::InsufficientBalance {
                balance: self.balance,
                notional: self.config.notional,
            });
        }
        if self.is_eod(now) {
            return Err(EntryBlock::EodWindow);
        }

        let have = self.samples(symbol);
        let need = self.config.ema_fast;
        if have < need {
            return Err(EntryBlock::InsufficientSamples { have, need });
        }
        let emas = self.emas(symbol);
        let fast = emas
            .fast
            .ok_or(EntryBlock::InsufficientSamples { have, need })?;
        if price <= fast {
            return Err(EntryBlock::BelowEma { price, ema: fast });
        }

        let position = PaperPosition {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            alert_type,
            entry_price: price,
            shares: self.config.notional / price,
            notional: self.config.notional,
            entry_time: now,
            entry_ema_fast: emas.fast,
            entry_ema_slow: emas.slow,
        };
        self.balance -= position.notional;
        self.positions.insert(symbol.to_string(), position.clone());

        info!(
            symbol = %symbol,
            price = %price,
            shares = %position.shares.round_dp(4),
            ema_fast = %fast.round_dp(4),
            %alert_type,
            "Entered paper trade"
        );
        Ok(position)
    }

    /// Close the position for `symbol`; None if there is none
    pub fn close(
        &mut self,
        symbol: &str,
        price: Decimal,
        now: DateTime<Utc>,
        reason: ExitReason,
    ) -> Option<CompletedTrade> {
        let position = self.positions.remove(symbol)?;

        let exit_value = position.shares * price;
        let pnl_abs = exit_value - position.notional;
        let pnl_pct = if position.notional.is_zero() {
            Decimal::ZERO
        } else {
            pnl_abs / position.notional * Decimal::ONE_HUNDRED
        };
        let exit_time = now.max(position.entry_time);

        self.balance += exit_value;
        let trade = CompletedTrade {
            position,
            exit_price: price,
            exit_time,
            exit_reason: reason,
            pnl_abs,
            pnl_pct,
        };

        info!(
            symbol = %symbol,
            price = %price,
            pnl = %trade.pnl_abs.round_dp(2),
            pnl_pct = %trade.pnl_pct.round_dp(2),
            held_minutes = trade.holding_time().num_minutes(),
            %reason,
            "Exited paper trade"
        );
        self.trades.push(trade.clone());
        Some(trade)
    }

    /// Drop price windows of symbols without a position that have gone quiet
    pub fn evict_idle(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.windows.len();
        let positions = &self.positions;
        self.windows.retain(|symbol, window| {
            if positions.contains_key(symbol) {
                return true;
            }
            window.prune(now);
            !window.is_empty()
        });
        let evicted = before - self.windows.len();
        if evicted > 0 {
            debug!(evicted, "Evicted idle paper price windows");
        }
        evicted
    }

    pub fn summary(&self) -> PerformanceSummary {
        let total = self.trades.len();
        let winning = self.trades.iter().filter(|t| t.is_win()).count();
        let total_pnl = self.realized_pnl();
        let initial = self.config.initial_balance;
        let total_return_pct = if initial.is_zero() {
            Decimal::ZERO
        } else {
            (self.balance / initial - Decimal::ONE) * Decimal::ONE_HUNDRED
        };

        let mut pcts: Vec<Decimal> = self.trades.iter().map(|t| t.pnl_pct).collect();
        pcts.sort();

        let (win_rate_pct, average_pnl_pct, median_pnl_pct, average_holding_minutes) = if total == 0 {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        } else {
            let n = Decimal::from(total as u64);
            let holding: Decimal = self
                .trades
                .iter()
                .map(|t| Decimal::from(t.holding_time().num_seconds()) / Decimal::from(60))
                .sum();
            (
                Decimal::from(winning as u64) / n * Decimal::ONE_HUNDRED,
                pcts.iter().copied().sum::<Decimal>() / n,
                median(&pcts),
                holding / n,
            )
        };

        PerformanceSummary {
            total_trades: total,
            winning_trades: winning,
            losing_trades: total - winning,
            win_rate_pct,
            total_pnl,
            average_pnl_pct,
            median_pnl_pct,
            best_trade: self.trades.iter().map(|t| t.pnl_abs).max().unwrap_or_default(),
            worst_trade: self.trades.iter().map(|t| t.pnl_abs).min().unwrap_or_default(),
            average_holding_minutes,
            balance: self.balance,
            total_return_pct,
            open_positions: self.positions.len(),
            max_concurrent_positions: self.max_concurrent_positions(),
        }
    }
}

/// Median of a sorted slice
fn median(sorted: &[Decimal]) -> Decimal {
    match sorted.len() {
        0 => Decimal::ZERO,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / Decimal::TWO,
    }
}
