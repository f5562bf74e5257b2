//! Alert classifier
//!
//! Compares the current snapshot against the previous one and the ticker
//! state store, and emits typed alert candidates. Every rule runs
//! independently per symbol; a failing rule skips only that symbol.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use super::types::{AlertCandidate, AlertMetrics, AlertPayload, AlertType, RuleError};
use crate::config::ClassifierConfig;
use crate::market::{MarketSnapshot, TickerQuote};
use crate::state::{TickerState, TickerStore};

/// Everything a rule may look at for one symbol
struct RuleInput<'a> {
    quote: &'a TickerQuote,
    rank: usize,
    previous: Option<&'a TickerQuote>,
    previous_rank: Option<usize>,
    /// False on the first scan, when there is no previous snapshot
    has_previous_snapshot: bool,
    state: Option<&'a TickerState>,
    snapshot: &'a MarketSnapshot,
}

type Rule = fn(&AlertClassifier, &RuleInput<'_>) -> Result<Option<AlertCandidate>, RuleError>;

/// Candidates from one classification pass
#[derive(Debug, Default)]
pub struct Classification {
    /// Grouped by alert type; within a type ordered by
    /// (lifetime alert count desc, magnitude desc)
    pub candidates: Vec<AlertCandidate>,
    pub rule_errors: Vec<RuleError>,
}

impl Classification {
    pub fn count_by_type(&self) -> HashMap<AlertType, usize> {
        let mut counts = HashMap::new();
        for c in &self.candidates {
            *counts.entry(c.alert_type()).or_insert(0) += 1;
        }
        counts
    }
}

/// Rule-based alert classifier
pub struct AlertClassifier {
    config: ClassifierConfig,
    max_price: Decimal,
}

impl AlertClassifier {
    const RULES: [(&'static str, Rule); 6] = [
        ("volume_climber", Self::volume_climber),
        ("volume_newcomer", Self::volume_newcomer),
        ("price_spike", Self::price_spike),
        ("premarket_move", Self::premarket_move),
        ("premarket_volume", Self::premarket_volume),
        ("sustained_positive", Self::sustained_positive),
    ];

    pub fn new(config: ClassifierConfig, max_price: Decimal) -> Self {
        Self { config, max_price }
    }

    /// Run every rule over every symbol in `current`.
    ///
    /// Expects the store's windows and flat verdicts to already include
    /// `current`.
    pub fn classify(
        &self,
        current: &MarketSnapshot,
        previous: Option<&MarketSnapshot>,
        store: &TickerStore,
    ) -> Classification {
        let previous_ranks = previous.map(|p| p.ranks()).unwrap_or_default();
        let previous_quotes = previous.map(|p| p.by_symbol()).unwrap_or_default();

        let mut out = Classification::default();
        let mut seen = HashSet::new();

        for (i, quote) in current.quotes.iter().enumerate() {
            if !seen.insert(quote.symbol.as_str()) {
                continue;
            }
            let input = RuleInput {
                quote,
                rank: i + 1,
                previous: previous_quotes.get(quote.symbol.as_str()).copied(),
                previous_rank: previous_ranks.get(quote.symbol.as_str()).copied(),
                has_previous_snapshot: previous.is_some(),
                state: store.get(&quote.symbol),
                snapshot: current,
            };

            for (name, rule) in Self::RULES {
                match rule(self, &input) {
                    Ok(Some(candidate)) => out.candidates.push(candidate),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::trace!(rule = name, error = %e, "rule skipped");
                        out.rule_errors.push(e);
                    }
                }
            }
        }

        out.candidates.sort_by(|a, b| {
            a.alert_type()
                .cmp(&b.alert_type())
                .then_with(|| store.lifetime_count(&b.symbol).cmp(&store.lifetime_count(&a.symbol)))
                .then_with(|| b.magnitude().cmp(&a.magnitude()))
        });
        out
    }

    fn volume_climber(&self, input: &RuleInput<'_>) -> Result<Option<AlertCandidate>, RuleError> {
        let Some(previous_rank) = input.previous_rank else {
            return Ok(None);
        };
        if previous_rank <= input.rank
            || previous_rank - input.rank <= self.config.climber_min_rank_change
        {
            return Ok(None);
        }
        let change = required(input.quote.change_pct, "volume_climber", input, "change_pct")?;
        if change <= Decimal::ZERO {
            return Ok(None);
        }
        Ok(Some(self.candidate(
            input,
            regular_metrics(input.quote, change),
            AlertPayload::VolumeClimber {
                previous_rank,
                current_rank: input.rank,
            },
        )))
    }

    fn volume_newcomer(&self, input: &RuleInput<'_>) -> Result<Option<AlertCandidate>, RuleError> {
        let top_n = self.config.newcomer_top_n;
        if !input.has_previous_snapshot || input.rank > top_n {
            return Ok(None);
        }
        if input.previous_rank.is_some_and(|r| r <= top_n) {
            return Ok(None);
        }
        let change = required(input.quote.change_pct, "volume_newcomer", input, "change_pct")?;
        if change <= Decimal::ZERO {
            return Ok(None);
        }
        Ok(Some(self.candidate(
            input,
            regular_metrics(input.quote, change),
            AlertPayload::VolumeNewcomer {
                current_rank: input.rank,
            },
        )))
    }

    fn price_spike(&self, input: &RuleInput<'_>) -> Result<Option<AlertCandidate>, RuleError> {
        let quote = input.quote;
        let change = required(quote.change_pct, "price_spike", input, "change_pct")?;
        if change <= Decimal::ZERO || quote.price >= self.max_price {
            return Ok(None);
        }

        let window_change = input.state.and_then(|s| s.spike_window.change_pct());
        let window_hit = window_change.is_some_and(|w| w > self.config.spike_window_change_pct);
        let instant_hit = change > self.config.spike_instant_change_pct;
        if !window_hit && !instant_hit {
            return Ok(None);
        }

        let window_minutes = self.config.spike_window_minutes;
        let prior_flat = input
            .state
            .and_then(|s| s.prior_flat.as_ref())
            .filter(|f| f.is_flat);
        let payload = match prior_flat {
            Some(flat) => AlertPayload::FlatToSpike {
                window_change_pct: window_change,
                window_minutes,
                flat: flat.clone(),
            },
            None => AlertPayload::PriceSpike {
                window_change_pct: window_change,
                window_minutes,
            },
        };
        Ok(Some(self.candidate(input, regular_metrics(quote, change), payload)))
    }

    /// Premarket acceleration, new premarket move, and the after-hours
    /// flat reclassification of either
    fn premarket_move(&self, input: &RuleInput<'_>) -> Result<Option<AlertCandidate>, RuleError> {
        let pm_change = required(
            input.quote.premarket_change,
            "premarket_move",
            input,
            "premarket_change",
        )?;
        if pm_change <= self.config.premarket_min_change_pct {
            return Ok(None);
        }

        let base = if !input.has_previous_snapshot {
            if pm_change <= self.config.first_scan_premarket_change_pct {
                return Ok(None);
            }
            AlertPayload::NewPremarketMove {
                premarket_change: pm_change,
            }
        } else if let Some(previous) = input.previous {
            let previous_change = previous.premarket_change.unwrap_or(Decimal::ZERO);
            let acceleration = pm_change - previous_change;
            if acceleration <= self.config.premarket_acceleration_delta {
                return Ok(None);
            }
            AlertPayload::PremarketAcceleration {
                premarket_change: pm_change,
                previous_premarket_change: previous_change,
                acceleration,
            }
        } else {
            if pm_change <= self.config.new_premarket_move_pct {
                return Ok(None);
            }
            AlertPayload::NewPremarketMove {
                premarket_change: pm_change,
            }
        };

        let metrics = premarket_metrics(input.quote, pm_change);
        let afterhours_flat = input
            .state
            .and_then(|s| s.afterhours_flat.as_ref())
            .filter(|f| f.is_flat);
        let payload = match afterhours_flat {
            Some(flat) if pm_change > self.config.afterhours_spike_pct => {
                let spike_from_afterhours_pct = if flat.avg_price > Decimal::ZERO {
                    (metrics.price - flat.avg_price) / flat.avg_price * Decimal::ONE_HUNDRED
                } else {
                    Decimal::ZERO
                };
                AlertPayload::AfterhoursFlatToPremarketSpike {
                    premarket_change: pm_change,
                    afterhours: flat.clone(),
                    spike_from_afterhours_pct,
                }
            }
            _ => base,
        };
        Ok(Some(self.candidate(input, metrics, payload)))
    }

    fn premarket_volume(&self, input: &RuleInput<'_>) -> Result<Option<AlertCandidate>, RuleError> {
        let volume = required(
            input.quote.premarket_volume,
            "premarket_volume",
            input,
            "premarket_volume",
        )?;
        let pm_change = input.quote.premarket_change.unwrap_or(Decimal::ZERO);

        let (previous_volume, volume_change_pct) = if !input.has_previous_snapshot {
            if volume <= self.config.first_scan_premarket_volume {
                return Ok(None);
            }
            (None, None)
        } else {
            let Some(previous_volume) = input.previous.and_then(|p| p.premarket_volume) else {
                return Ok(None);
            };
            if previous_volume == 0 {
                return Ok(None);
            }
            let prev = Decimal::from(previous_volume);
            let change = (Decimal::from(volume) - prev) / prev * Decimal::ONE_HUNDRED;
            if change <= self.config.premarket_volume_surge_pct {
                return Ok(None);
            }
            (Some(previous_volume), Some(change))
        };

        Ok(Some(self.candidate(
            input,
            premarket_metrics(input.quote, pm_change),
            AlertPayload::PremarketVolumeSurge {
                premarket_volume: volume,
                previous_premarket_volume: previous_volume,
                volume_change_pct,
            },
        )))
    }

    fn sustained_positive(&self, input: &RuleInput<'_>) -> Result<Option<AlertCandidate>, RuleError> {
        let from_close = required(
            input.quote.change_from_prev_close,
            "sustained_positive",
            input,
            "change_from_prev_close",
        )?;
        if from_close <= self.config.sustained_change_pct {
            return Ok(None);
        }
        let change = input.quote.change_pct.unwrap_or(from_close);
        Ok(Some(self.candidate(
            input,
            regular_metrics(input.quote, change),
            AlertPayload::SustainedPositive {
                change_from_prev_close: from_close,
            },
        )))
    }

    fn candidate(
        &self,
        input: &RuleInput<'_>,
        metrics: AlertMetrics,
        payload: AlertPayload,
    ) -> AlertCandidate {
        AlertCandidate {
            symbol: input.quote.symbol.clone(),
            timestamp: input.snapshot.timestamp,
            metrics,
            payload,
        }
    }
}

fn required<T: Copy>(
    value: Option<T>,
    rule: &'static str,
    input: &RuleInput<'_>,
    field: &'static str,
) -> Result<T, RuleError> {
    value.ok_or_else(|| RuleError::MissingField {
        rule,
        symbol: input.quote.symbol.clone(),
        field,
    })
}

fn regular_metrics(quote: &TickerQuote, change_pct: Decimal) -> AlertMetrics {
    AlertMetrics {
        price: quote.price,
        change_pct,
        volume: quote.volume,
        relative_volume: quote.relative_volume,
        change_from_open: quote.change_from_open,
        sector: quote.sector.clone(),
        float_shares: quote.float_shares,
    }
}

/// Premarket alerts report the implied premarket price, not the last close
fn premarket_metrics(quote: &TickerQuote, premarket_change: Decimal) -> AlertMetrics {
    AlertMetrics {
        price: quote.price * (Decimal::ONE + premarket_change / Decimal::ONE_HUNDRED),
        change_pct: premarket_change,
        ..regular_metrics(quote, premarket_change)
    }
}
