//! Engine
//!
//! Owns the ticker state store and every component that reads or writes
//! it. One call to [`Engine::run_cycle`] takes a snapshot through window
//! updates, paper exits, classification, scoring, gating, paper entries
//! and dispatch, in that order.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::types::{CycleReport, GatedAlert};
use crate::alert::{AlertCandidate, AlertClassifier};
use crate::command::{Command, StatsReport};
use crate::config::{Config, EntryTrigger};
use crate::dispatch::{AlertMessage, DispatchQueue, DispatchStats};
use crate::flat::FlatDetector;
use crate::gate::{GateDecision, NotificationGate, RejectReason};
use crate::market::{MarketSnapshot, SessionCalendar, SessionPhase};
use crate::paper::{EntryBlock, PaperTrader};
use crate::persistence::{
    AlertJournal, JournalEntry, PersistedState, PersistenceError, StateStore, STATE_VERSION,
};
use crate::scoring::{MomentumScorer, ScoreResult};
use crate::state::{TickerStore, WindowSettings};
use crate::telemetry::{
    increment_counter, record_cycle_latency, set_gauge, CounterMetric, GaugeMetric,
};

pub struct Engine {
    config: Config,
    calendar: SessionCalendar,
    store: TickerStore,
    intraday_flat: FlatDetector,
    afterhours_flat: FlatDetector,
    classifier: AlertClassifier,
    scorer: MomentumScorer,
    gate: NotificationGate,
    paper: PaperTrader,
    previous: Option<MarketSnapshot>,
    session_date: Option<NaiveDate>,
    state_store: Option<StateStore>,
    journal: Option<AlertJournal>,
    dispatch: Option<DispatchQueue>,
    /// Durable state changed since the last save
    dirty: bool,
}

impl Engine {
    /// In-memory engine without persistence or dispatch
    pub fn new(config: Config) -> Self {
        let calendar = SessionCalendar::from_config(&config.session);
        Self {
            store: TickerStore::new(WindowSettings::from_config(&config)),
            intraday_flat: FlatDetector::new(&config.flat.intraday),
            afterhours_flat: FlatDetector::new(&config.flat.afterhours),
            classifier: AlertClassifier::new(config.classifier.clone(), config.scanner.max_price),
            scorer: MomentumScorer::new(config.scoring.clone()),
            gate: NotificationGate::new(config.gate.clone()),
            paper: PaperTrader::new(config.paper.clone(), calendar.clone()),
            calendar,
            previous: None,
            session_date: None,
            state_store: None,
            journal: None,
            dispatch: None,
            dirty: false,
            config,
        }
    }

    /// Load persisted state and keep saving to the configured data directory
    pub fn with_persistence(mut self) -> Self {
        let state_store = StateStore::new(self.config.persistence.state_path());
        self.restore(state_store.load());
        self.journal = Some(AlertJournal::new(self.config.persistence.journal_path()));
        self.state_store = Some(state_store);
        self
    }

    /// Hand approved alerts to a background dispatch queue
    pub fn with_dispatch(mut self, queue: DispatchQueue) -> Self {
        self.dispatch = Some(queue);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn calendar(&self) -> &SessionCalendar {
        &self.calendar
    }

    pub fn store(&self) -> &TickerStore {
        &self.store
    }

    pub fn paper(&self) -> &PaperTrader {
        &self.paper
    }

    pub fn previous_snapshot(&self) -> Option<&MarketSnapshot> {
        self.previous.as_ref()
    }

    /// Replace counters, positions and trades with persisted state
    pub fn restore(&mut self, state: PersistedState) {
        info!(
            tickers = state.tickers.len(),
            positions = state.positions.len(),
            trades = state.trades.len(),
            "Restoring state"
        );
        self.store =
            TickerStore::from_records(state.tickers, WindowSettings::from_config(&self.config));
        self.paper.restore(state.positions, state.trades, state.balance);
    }

    /// Durable view of the current state
    pub fn persisted_state(&self, saved_at: DateTime<Utc>) -> PersistedState {
        PersistedState {
            version: STATE_VERSION,
            saved_at: Some(saved_at),
            tickers: self.store.to_records(),
            positions: self.paper.positions().clone(),
            trades: self.paper.trades().to_vec(),
            balance: Some(self.paper.balance()),
        }
    }

    /// Write state now if a state file is configured
    pub fn save(&mut self, now: DateTime<Utc>) -> Result<(), PersistenceError> {
        if let Some(store) = &self.state_store {
            store.save(&self.persisted_state(now))?;
            self.dirty = false;
        }
        Ok(())
    }

    fn persist_if_dirty(&mut self, now: DateTime<Utc>) {
        if !self.dirty {
            return;
        }
        if let Err(e) = self.save(now) {
            warn!(error = %e, "Failed to save state");
        }
    }

    /// Flush state and drain the dispatch queue
    pub async fn shutdown(mut self) -> Option<DispatchStats> {
        self.dirty = true;
        self.persist_if_dirty(Utc::now());
        match self.dispatch.take() {
            Some(queue) => Some(queue.shutdown().await),
            None => None,
        }
    }

    /// Apply one command from a listener
    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::Mute { symbol, reply } => {
                let newly = self.store.mute(&symbol);
                info!(symbol = %symbol, newly, "Symbol muted");
                let _ = reply.send(newly);
            }
            Command::ListMuted { reply } => {
                let _ = reply.send(self.store.list_muted());
            }
            Command::Stats { n, reply } => {
                let _ = reply.send(StatsReport {
                    tickers: self.store.stats(n),
                    paper: self.paper.summary(),
                });
            }
            Command::Reset { reply } => {
                self.store.reset();
                self.gate.reset();
                self.dirty = true;
                info!("Counters, cooldowns and mutes reset");
                let _ = reply.send(());
            }
        }
    }

    /// Process one snapshot; its timestamp is the cycle's clock
    pub fn run_cycle(&mut self, snapshot: &MarketSnapshot) -> CycleReport {
        let started = Instant::now();
        let now = snapshot.timestamp;
        let snapshot = snapshot.filter_universe(&self.config.scanner);

        let mut report = CycleReport {
            timestamp: Some(now),
            universe: snapshot.len(),
            ..CycleReport::default()
        };
        report.session_started = self.roll_session(now);

        self.update_windows(&snapshot, now);

        if self.paper.config().enabled {
            let prices: HashMap<String, Decimal> = snapshot
                .quotes
                .iter()
                .map(|q| (q.symbol.clone(), q.price))
                .collect();
            report.exits = self.paper.update_prices(&prices, now);
            for trade in &report.exits {
                increment_counter(
                    CounterMetric::PaperTrades,
                    Some(trade.exit_reason.as_str()),
                    1,
                );
            }
            self.dirty |= !report.exits.is_empty();
        }

        let classification = self
            .classifier
            .classify(&snapshot, self.previous.as_ref(), &self.store);
        report.candidates = classification.candidates.len();
        report.rule_errors = classification.rule_errors.len();
        for candidate in &classification.candidates {
            increment_counter(
                CounterMetric::Candidates,
                Some(candidate.alert_type().as_str()),
                1,
            );
        }
        if report.rule_errors > 0 {
            increment_counter(CounterMetric::RuleErrors, None, report.rule_errors as u64);
        }

        let mut scored: Vec<(AlertCandidate, ScoreResult)> = classification
            .candidates
            .into_iter()
            .map(|c| {
                let score = self.scorer.score(&c);
                (c, score)
            })
            .collect();
        // stable: equal scores keep the classifier's order
        scored.sort_by(|a, b| b.1.score.cmp(&a.1.score));

        let mut dispatched: HashSet<String> = HashSet::new();
        let mut muted_logged: HashSet<String> = HashSet::new();
        for (candidate, score) in scored {
            if dispatched.contains(&candidate.symbol) {
                continue;
            }
            let decision = self.gate.decide(&candidate, &score, &mut self.store, now);
            increment_counter(CounterMetric::GateDecisions, Some(decision.label()), 1);

            let paper_note = self.maybe_enter(&candidate, &decision, now, &mut report);

            match &decision {
                GateDecision::Approved(path) => {
                    dispatched.insert(candidate.symbol.clone());
                    self.dirty = true;
                    info!(
                        symbol = %candidate.symbol,
                        alert_type = %candidate.alert_type(),
                        score = score.score,
                        category = %score.probability_category,
                        path = ?path,
                        "Alert approved"
                    );
                    let message = self.render(&candidate, &score, paper_note);
                    self.journal_alert(&candidate, &score, false);
                    if let Some(queue) = &self.dispatch {
                        queue.enqueue(message.clone());
                    }
                    report.messages.push(message);
                }
                GateDecision::Rejected(RejectReason::Muted) => {
                    if muted_logged.insert(candidate.symbol.clone()) {
                        info!(
                            symbol = %candidate.symbol,
                            alert_type = %candidate.alert_type(),
                            score = score.score,
                            "Alert suppressed for muted symbol"
                        );
                        self.journal_alert(&candidate, &score, true);
                    }
                }
                GateDecision::Rejected(reason) => {
                    debug!(
                        symbol = %candidate.symbol,
                        alert_type = %candidate.alert_type(),
                        score = score.score,
                        %reason,
                        "Alert filtered"
                    );
                }
            }
            report.gated.push(GatedAlert {
                candidate,
                score,
                decision,
            });
        }

        self.previous = Some(snapshot);
        let evicted = self.store.evict_idle(now);
        self.paper.evict_idle(now);
        if evicted > 0 {
            debug!(evicted, "Evicted idle tickers");
        }
        self.persist_if_dirty(now);

        self.record_gauges(&report);
        record_cycle_latency(started.elapsed());
        info!(
            universe = report.universe,
            candidates = report.candidates,
            approved = report.messages.len(),
            entries = report.entries.len(),
            exits = report.exits.len(),
            "Cycle complete"
        );
        report
    }

    /// Start a new session when the exchange-local date changes
    fn roll_session(&mut self, now: DateTime<Utc>) -> bool {
        let date = self.calendar.trading_date(now);
        match self.session_date.replace(date) {
            Some(previous) if previous != date => {
                self.store.start_session();
                info!(%date, "New trading session");
                true
            }
            _ => false,
        }
    }

    /// Feed each symbol's price into its windows and refresh flat verdicts
    fn update_windows(&mut self, snapshot: &MarketSnapshot, now: DateTime<Utc>) {
        let phase = self.calendar.phase(now);
        let mut seen = HashSet::new();
        for quote in &snapshot.quotes {
            if !seen.insert(quote.symbol.as_str()) {
                continue;
            }
            let state = self.store.entry(&quote.symbol);
            state.prior_flat = state.current_flat.take();
            state.current_flat = Some(self.intraday_flat.observe(
                &mut state.flat_window,
                now,
                quote.price,
            ));
            state.spike_window.push(now, quote.price);

            match phase {
                SessionPhase::AfterHours => {
                    state.afterhours_window.push(now, quote.price);
                }
                SessionPhase::Premarket => {
                    state.afterhours_flat = Some(
                        self.afterhours_flat
                            .evaluate_at(&mut state.afterhours_window, now),
                    );
                }
                SessionPhase::Regular | SessionPhase::Closed => {}
            }
        }
    }

    /// Try a paper entry when the configured trigger matches
    fn maybe_enter(
        &mut self,
        candidate: &AlertCandidate,
        decision: &GateDecision,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) -> Option<String> {
        let config = self.paper.config();
        let eligible = match config.entry_on {
            EntryTrigger::Approved => decision.is_approved(),
            EntryTrigger::All => true,
        };
        if !config.enabled || !eligible {
            return None;
        }

        match self.paper.try_enter(
            &candidate.symbol,
            candidate.metrics.price,
            candidate.alert_type(),
            now,
        ) {
            Ok(position) => {
                let note = format!("BOUGHT at ${}", position.entry_price.round_dp(4));
                report.entries.push(position);
                self.dirty = true;
                Some(note)
            }
            Err(EntryBlock::AlreadyOpen) => Some("position already open".to_string()),
            Err(block) => {
                debug!(symbol = %candidate.symbol, %block, "No paper entry");
                Some(format!("NOT BOUGHT - {block}"))
            }
        }
    }

    fn counts(&self, symbol: &str) -> (u64, u64) {
        self.store
            .get(symbol)
            .map_or((0, 0), |s| (s.lifetime_alert_count, s.session_alert_count))
    }

    fn render(
        &self,
        candidate: &AlertCandidate,
        score: &ScoreResult,
        paper_note: Option<String>,
    ) -> String {
        let (lifetime, session) = self.counts(&candidate.symbol);
        AlertMessage {
            candidate,
            score,
            lifetime_alert_count: lifetime,
            session_alert_count: session,
            paper_note,
        }
        .to_string()
    }

    fn journal_alert(&self, candidate: &AlertCandidate, score: &ScoreResult, muted: bool) {
        let Some(journal) = &self.journal else {
            return;
        };
        let (lifetime, session) = self.counts(&candidate.symbol);
        let entry = JournalEntry {
            timestamp: candidate.timestamp,
            symbol: candidate.symbol.clone(),
            alert_type: candidate.alert_type(),
            score: score.score,
            probability_category: score.probability_category,
            price: candidate.metrics.price,
            change_pct: candidate.metrics.change_pct,
            relative_volume: candidate.metrics.relative_volume,
            lifetime_alert_count: lifetime,
            session_alert_count: session,
            muted,
        };
        if let Err(e) = journal.append(&entry) {
            warn!(error = %e, "Failed to append alert journal");
        }
    }

    fn record_gauges(&self, report: &CycleReport) {
        let f = |d: Decimal| d.to_f64().unwrap_or_default();
        set_gauge(GaugeMetric::OpenPositions, self.paper.open_count() as f64);
        set_gauge(GaugeMetric::PaperBalance, f(self.paper.balance()));
        set_gauge(GaugeMetric::RealizedPnl, f(self.paper.realized_pnl()));
        set_gauge(GaugeMetric::TrackedTickers, self.store.len() as f64);
        set_gauge(GaugeMetric::UniverseSize, report.universe as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertType;
    use crate::market::TickerQuote;
    use crate::paper::ExitReason;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use tokio::sync::oneshot;

    /// Wednesday 10:00 New York
    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 12, 14, 0, 0).unwrap()
    }

    fn spiking(symbol: &str, price: Decimal) -> TickerQuote {
        TickerQuote {
            change_pct: Some(dec!(15)),
            relative_volume: Some(dec!(5)),
            volume: 1_000_000,
            ..TickerQuote::new(symbol, price)
        }
    }

    fn snapshot(ts: DateTime<Utc>, quotes: Vec<TickerQuote>) -> MarketSnapshot {
        MarketSnapshot::new(ts, quotes)
    }

    fn mute(engine: &mut Engine, symbol: &str) -> bool {
        let (reply, mut rx) = oneshot::channel();
        engine.handle_command(Command::Mute {
            symbol: symbol.to_string(),
            reply,
        });
        rx.try_recv().unwrap()
    }

    #[test]
    fn test_first_cycle_approves_spike() {
        let mut engine = Engine::new(Config::default());
        let report = engine.run_cycle(&snapshot(t0(), vec![spiking("ABC", dec!(2.00))]));

        assert_eq!(report.universe, 1);
        assert_eq!(report.candidates, 1);
        // premarket and sustained rules lack their fields
        assert_eq!(report.rule_errors, 3);
        assert_eq!(report.approved_symbols(), vec!["ABC"]);
        assert_eq!(report.gated[0].candidate.alert_type(), AlertType::PriceSpike);
        assert_eq!(report.gated[0].score.score, 70);
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].starts_with("MOMENTUM ALERT: ABC"));
        assert!(report.messages[0].contains("NOT BOUGHT"));

        let state = engine.store().get("ABC").unwrap();
        assert_eq!(state.lifetime_alert_count, 1);
        assert_eq!(state.session_alert_count, 1);
        assert!(engine.paper().positions().is_empty());
    }

    #[test]
    fn test_universe_filter_applies_before_classification() {
        let mut engine = Engine::new(Config::default());
        let otc = TickerQuote {
            exchange: Some("otc".to_string()),
            ..spiking("PINK", dec!(1.00))
        };
        let report = engine.run_cycle(&snapshot(
            t0(),
            vec![spiking("BIG", dec!(25)), otc, spiking("ABC", dec!(2.00))],
        ));

        assert_eq!(report.universe, 1);
        assert_eq!(report.approved_symbols(), vec!["ABC"]);
        assert!(engine.store().get("BIG").is_none());
        assert_eq!(engine.previous_snapshot().map(MarketSnapshot::len), Some(1));
    }

    #[test]
    fn test_one_alert_per_symbol_per_cycle() {
        let mut engine = Engine::new(Config::default());
        let quote = TickerQuote {
            change_from_prev_close: Some(dec!(20)),
            ..spiking("ABC", dec!(2.00))
        };
        let report = engine.run_cycle(&snapshot(t0(), vec![quote]));

        assert_eq!(report.candidates, 2);
        assert_eq!(report.gated.len(), 1);
        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.gated[0].candidate.alert_type(), AlertType::PriceSpike);
        assert_eq!(engine.store().get("ABC").unwrap().lifetime_alert_count, 1);
    }

    #[test]
    fn test_cooldown_suppresses_repeat() {
        let mut engine = Engine::new(Config::default());
        engine.run_cycle(&snapshot(t0(), vec![spiking("ABC", dec!(2.00))]));
        let report = engine.run_cycle(&snapshot(
            t0() + Duration::minutes(2),
            vec![spiking("ABC", dec!(2.10))],
        ));

        assert!(report.messages.is_empty());
        assert!(matches!(
            report.gated[0].decision,
            GateDecision::Rejected(RejectReason::Cooldown { .. })
        ));

        let report = engine.run_cycle(&snapshot(
            t0() + Duration::minutes(12),
            vec![spiking("ABC", dec!(2.20))],
        ));
        assert_eq!(report.approved_symbols(), vec!["ABC"]);
        assert_eq!(engine.store().get("ABC").unwrap().lifetime_alert_count, 2);
    }

    #[test]
    fn test_muted_symbol_is_suppressed_and_journaled_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.persistence.data_dir = dir.path().to_path_buf();
        let mut engine = Engine::new(config.clone()).with_persistence();

        assert!(mute(&mut engine, "ABC"));
        assert!(!mute(&mut engine, "ABC"));

        let quote = TickerQuote {
            change_from_prev_close: Some(dec!(20)),
            ..spiking("ABC", dec!(2.00))
        };
        let report = engine.run_cycle(&snapshot(t0(), vec![quote]));

        assert!(report.messages.is_empty());
        assert!(report
            .gated
            .iter()
            .all(|g| g.decision == GateDecision::Rejected(RejectReason::Muted)));

        let journal = AlertJournal::new(config.persistence.journal_path());
        let entries = journal.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].muted);
        assert_eq!(entries[0].alert_type, AlertType::PriceSpike);
    }

    #[test]
    fn test_session_rollover_clears_session_counts_and_mutes() {
        let mut engine = Engine::new(Config::default());
        engine.run_cycle(&snapshot(t0(), vec![spiking("ABC", dec!(2.00))]));
        mute(&mut engine, "XYZ");

        let report = engine.run_cycle(&snapshot(
            t0() + Duration::days(1),
            vec![spiking("ABC", dec!(2.00))],
        ));

        assert!(report.session_started);
        assert_eq!(report.approved_symbols(), vec!["ABC"]);
        let state = engine.store().get("ABC").unwrap();
        assert_eq!(state.lifetime_alert_count, 2);
        assert_eq!(state.session_alert_count, 1);
        assert!(engine.store().list_muted().is_empty());
    }

    #[test]
    fn test_reset_command_clears_cooldown() {
        let mut engine = Engine::new(Config::default());
        engine.run_cycle(&snapshot(t0(), vec![spiking("ABC", dec!(2.00))]));

        let (reply, mut rx) = oneshot::channel();
        engine.handle_command(Command::Reset { reply });
        rx.try_recv().unwrap();
        assert_eq!(engine.store().lifetime_count("ABC"), 0);

        let report = engine.run_cycle(&snapshot(
            t0() + Duration::minutes(1),
            vec![spiking("ABC", dec!(2.05))],
        ));
        assert_eq!(report.approved_symbols(), vec!["ABC"]);
    }

    #[test]
    fn test_stats_command_reports_tickers_and_paper() {
        let mut engine = Engine::new(Config::default());
        engine.run_cycle(&snapshot(
            t0(),
            vec![spiking("ABC", dec!(2.00)), spiking("XYZ", dec!(4.00))],
        ));

        let (reply, mut rx) = oneshot::channel();
        engine.handle_command(Command::Stats { n: 1, reply });
        let report = rx.try_recv().unwrap();
        assert_eq!(report.tickers.len(), 1);
        assert_eq!(report.tickers[0].symbol, "ABC");
        assert_eq!(report.paper.total_trades, 0);
        assert_eq!(report.paper.balance, dec!(10000));
    }

    #[test]
    fn test_paper_entry_and_ema_exit_through_cycles() {
        let mut config = Config::default();
        config.paper.entry_on = EntryTrigger::All;
        config.paper.ema_fast = 2;
        config.paper.ema_slow = 3;
        let mut engine = Engine::new(config);

        let report = engine.run_cycle(&snapshot(t0(), vec![spiking("ABC", dec!(2.00))]));
        assert!(report.entries.is_empty());

        // cooldown rejects the alert but every candidate may enter
        let report = engine.run_cycle(&snapshot(
            t0() + Duration::minutes(1),
            vec![spiking("ABC", dec!(2.20))],
        ));
        assert!(report.messages.is_empty());
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].entry_price, dec!(2.20));
        assert_eq!(engine.paper().balance(), dec!(9900));

        let report = engine.run_cycle(&snapshot(
            t0() + Duration::minutes(2),
            vec![spiking("ABC", dec!(1.80))],
        ));
        assert_eq!(report.exits.len(), 1);
        assert_eq!(report.exits[0].exit_reason, ExitReason::EmaExit);
        assert_eq!(report.exits[0].exit_price, dec!(1.80));
        assert!(report.entries.is_empty());
        assert!(engine.paper().positions().is_empty());
    }

    #[test]
    fn test_paper_disabled_never_enters() {
        let mut config = Config::default();
        config.paper.enabled = false;
        config.paper.entry_on = EntryTrigger::All;
        let mut engine = Engine::new(config);

        let report = engine.run_cycle(&snapshot(t0(), vec![spiking("ABC", dec!(2.00))]));
        assert_eq!(report.messages.len(), 1);
        assert!(!report.messages[0].contains("Paper trade"));
        assert!(report.entries.is_empty());
    }

    #[test]
    fn test_state_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.persistence.data_dir = dir.path().to_path_buf();

        let mut engine = Engine::new(config.clone()).with_persistence();
        engine.run_cycle(&snapshot(t0(), vec![spiking("ABC", dec!(2.00))]));
        assert!(config.persistence.state_path().exists());

        let restored = Engine::new(config.clone()).with_persistence();
        let state = restored.store().get("ABC").unwrap();
        assert_eq!(state.lifetime_alert_count, 1);
        assert_eq!(state.last_alert_time, Some(t0()));
        assert_eq!(restored.paper().balance(), dec!(10000));

        let journal = AlertJournal::new(config.persistence.journal_path());
        assert_eq!(journal.read_all().unwrap().len(), 1);
    }
}
