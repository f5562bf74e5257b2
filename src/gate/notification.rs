//! Notification gate state machine

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;

use super::types::{ApprovalPath, GateDecision, PerformerTier, RejectReason};
use crate::alert::AlertCandidate;
use crate::config::GateConfig;
use crate::scoring::ScoreResult;
use crate::state::{TickerState, TickerStore};

/// Gate with a rolling log of approvals for concentration limits
#[derive(Debug, Clone)]
pub struct NotificationGate {
    config: GateConfig,
    /// (approval time, symbol), oldest first
    approvals: VecDeque<(DateTime<Utc>, String)>,
}

impl NotificationGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            approvals: VecDeque::new(),
        }
    }

    /// Check the candidate and, when approved, record the alert on the ticker
    pub fn decide(
        &mut self,
        candidate: &AlertCandidate,
        score: &ScoreResult,
        store: &mut TickerStore,
        now: DateTime<Utc>,
    ) -> GateDecision {
        let decision = self.check(candidate, score, store, now);
        if decision.is_approved() {
            self.record_approval(candidate, store, now);
        }
        decision
    }

    /// Evaluate the checks in order without changing any state
    pub fn check(
        &self,
        candidate: &AlertCandidate,
        score: &ScoreResult,
        store: &TickerStore,
        now: DateTime<Utc>,
    ) -> GateDecision {
        if score.score > self.config.priority_bypass_score {
            return GateDecision::Approved(ApprovalPath::PriorityBypass);
        }

        let state = store.get(&candidate.symbol);
        if state.is_some_and(|s| s.disregarded) {
            return GateDecision::Rejected(RejectReason::Muted);
        }

        if let Some(last) = state.and_then(|s| s.last_alert_time) {
            let tier = self.performer_tier(state);
            let elapsed = now - last;
            let cooldown = self.cooldown_for(tier);
            if elapsed < cooldown {
                return GateDecision::Rejected(RejectReason::Cooldown {
                    tier,
                    remaining_secs: (cooldown - elapsed).num_seconds(),
                });
            }
        }

        let m = &candidate.metrics;
        let rule = self.config.sector_rule(m.sector.as_deref());
        let required_rv = self.config.base_relative_volume * rule.relative_volume_multiplier;
        let required_change = self.config.base_price_change * rule.price_change_multiplier;
        let rv_ok = m.relative_volume.is_some_and(|rv| rv >= required_rv);
        if !rv_ok || m.change_pct < required_change {
            return GateDecision::Rejected(RejectReason::BelowThreshold {
                relative_volume: m.relative_volume,
                required_relative_volume: required_rv,
                change_pct: m.change_pct,
                required_change_pct: required_change,
            });
        }

        if let Some(cap) = rule.max_ticker_concentration {
            let share = self.concentration_share(&candidate.symbol, now);
            if share > cap {
                return GateDecision::Rejected(RejectReason::Concentration { share, cap });
            }
        }

        GateDecision::Approved(ApprovalPath::Checked)
    }

    /// Tier from the mean change of recent alerts; regular without enough history
    pub fn performer_tier(&self, state: Option<&TickerState>) -> PerformerTier {
        let cd = &self.config.cooldown;
        match state.and_then(|s| s.average_recent_change(cd.min_history)) {
            Some(avg) if avg >= cd.high_performer_avg_change => PerformerTier::High,
            Some(avg) if avg >= cd.regular_avg_change => PerformerTier::Regular,
            Some(_) => PerformerTier::Poor,
            None => PerformerTier::Regular,
        }
    }

    pub fn cooldown_for(&self, tier: PerformerTier) -> Duration {
        let cd = &self.config.cooldown;
        let secs = match tier {
            PerformerTier::High => cd.high_performer_secs,
            PerformerTier::Regular => cd.regular_secs,
            PerformerTier::Poor => cd.poor_performer_secs,
        };
        Duration::seconds(secs as i64)
    }

    /// Share of approvals in the concentration window held by `symbol`
    pub fn concentration_share(&self, symbol: &str, now: DateTime<Utc>) -> Decimal {
        let cutoff = now - self.window();
        let mut total = 0u64;
        let mut mine = 0u64;
        for (ts, s) in &self.approvals {
            if *ts >= cutoff {
                total += 1;
                if s == symbol {
                    mine += 1;
                }
            }
        }
        if total == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(mine) / Decimal::from(total)
    }

    /// Forget the concentration log
    pub fn reset(&mut self) {
        self.approvals.clear();
    }

    fn window(&self) -> Duration {
        Duration::minutes(self.config.concentration_window_minutes as i64)
    }

    fn record_approval(&mut self, candidate: &AlertCandidate, store: &mut TickerStore, now: DateTime<Utc>) {
        let history_len = self.config.cooldown.history_len;
        store.entry(&candidate.symbol).record_alert(
            candidate.alert_type(),
            candidate.metrics.change_pct,
            now,
            history_len,
        );

        self.approvals.push_back((now, candidate.symbol.clone()));
        let cutoff = now - self.window();
        while let Some((ts, _)) = self.approvals.front() {
            if *ts < cutoff {
                self.approvals.pop_front();
            } else {
                break;
            }
        }
    }
}
