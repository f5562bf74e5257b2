//! Momentum scorer

use rust_decimal::Decimal;

use super::tables::ScoreTables;
use super::types::{ProbabilityCategory, ScoreResult, StopLoss};
use crate::alert::{AlertCandidate, AlertType};

/// Scores candidates against a fixed set of tables
#[derive(Debug, Clone, Default)]
pub struct MomentumScorer {
    tables: ScoreTables,
}

impl MomentumScorer {
    pub fn new(tables: ScoreTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ScoreTables {
        &self.tables
    }

    pub fn score(&self, candidate: &AlertCandidate) -> ScoreResult {
        let m = &candidate.metrics;
        self.score_metrics(
            candidate.alert_type(),
            m.price,
            m.change_pct,
            m.relative_volume,
            m.sector.as_deref(),
        )
    }

    /// Sum the table contributions for one set of metrics
    pub fn score_metrics(
        &self,
        alert_type: AlertType,
        price: Decimal,
        change_pct: Decimal,
        relative_volume: Option<Decimal>,
        sector: Option<&str>,
    ) -> ScoreResult {
        let t = &self.tables;
        let mut score = 0i32;
        let mut flags = Vec::new();
        let mut apply = |points: i32, flag: &Option<String>| {
            score += points;
            if let Some(f) = flag {
                flags.push(f.clone());
            }
        };

        if let Some(w) = t.alert_weight(alert_type) {
            apply(w.points, &w.flag);
            if w.big_move_points != 0 && change_pct >= t.big_move_pct {
                apply(w.big_move_points, &w.big_move_flag);
            }
        }

        match t.price.bands.iter().find(|b| price < b.below) {
            Some(band) => apply(band.points, &band.flag),
            None => apply(t.price.otherwise.points, &t.price.otherwise.flag),
        }

        if let Some(tier) = t.change.iter().find(|tier| change_pct >= tier.at_least) {
            apply(tier.points, &tier.flag);
        }

        if let Some(rv) = relative_volume {
            let rvt = &t.relative_volume;
            if let Some(tier) = rvt.tiers.iter().find(|tier| rv >= tier.at_least) {
                apply(tier.points, &tier.flag);
            } else if rv < rvt.penalty_below {
                apply(rvt.penalty.points, &rvt.penalty.flag);
            }
        }

        match sector.and_then(|s| t.sectors.weights.get(s)) {
            Some(weight) => {
                if let Some(tier) = t.sectors.tiers.iter().find(|tier| *weight >= tier.min_weight) {
                    apply(tier.points, &tier.flag);
                }
            }
            None => apply(t.sectors.unknown.points, &t.sectors.unknown.flag),
        }

        ScoreResult {
            score,
            flags,
            probability_category: self.category(score),
            estimated_probability_pct: self.probability(score),
            stop_loss: self.stop_loss(score, price),
        }
    }

    pub fn category(&self, score: i32) -> ProbabilityCategory {
        self.tables
            .categories
            .iter()
            .find(|b| score >= b.at_least)
            .map_or(self.tables.category_floor, |b| b.category)
    }

    pub fn probability(&self, score: i32) -> Decimal {
        self.tables
            .probability
            .iter()
            .find(|b| score >= b.at_least)
            .map_or(self.tables.probability_floor_pct, |b| b.pct)
    }

    /// Tighter stop for stronger scores, widened for sub-dollar prices
    pub fn stop_loss(&self, score: i32, price: Decimal) -> StopLoss {
        let sl = &self.tables.stop_loss;
        let (mut pct, mut rationale) = sl
            .tiers
            .iter()
            .find(|tier| score >= tier.min_score)
            .map_or((sl.default_pct, sl.default_rationale.clone()), |tier| {
                (tier.pct, tier.rationale.clone())
            });

        if price < sl.low_price_below {
            pct += sl.low_price_adjust_pct;
            rationale.push_str(" (penny stock adjustment)");
        } else if price > sl.high_price_above {
            pct += sl.high_price_adjust_pct;
            rationale.push_str(" (high price adjustment)");
        }
        let pct = pct.clamp(sl.min_pct, sl.max_pct);

        StopLoss {
            percentage: pct,
            stop_price: price * (Decimal::ONE - pct / Decimal::ONE_HUNDRED),
            rationale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertMetrics, AlertPayload};
    use crate::flat::{FlatPeriodResult, FlatReason};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn scorer() -> MomentumScorer {
        MomentumScorer::default()
    }

    #[test]
    fn test_flat_to_spike_scenario() {
        let candidate = AlertCandidate {
            symbol: "HOT".into(),
            timestamp: Utc::now(),
            metrics: AlertMetrics {
                price: dec!(0.85),
                change_pct: dec!(120),
                volume: 5_000_000,
                relative_volume: Some(dec!(400)),
                change_from_open: None,
                sector: Some("Health Technology".into()),
                float_shares: None,
            },
            payload: AlertPayload::FlatToSpike {
                window_change_pct: Some(dec!(40)),
                window_minutes: 10,
                flat: FlatPeriodResult {
                    is_flat: true,
                    reason: FlatReason::Flat,
                    duration_secs: 600,
                    volatility_pct: dec!(1),
                    avg_price: dec!(0.40),
                    price_range: (dec!(0.40), dec!(0.404)),
                    samples: 5,
                },
            },
        };

        let result = scorer().score(&candidate);
        // 40 + 40 (big move) + 20 (under $1) + 30 (100%+) + 45 (400x) + 25 (top sector)
        assert_eq!(result.score, 200);
        assert!(result.probability_category >= ProbabilityCategory::High);
        assert!(result.has_flag("FLAT-TO-SPIKE"));
        assert!(result.has_flag("EXTREME VOL 400x+"));
        assert_eq!(result.estimated_probability_pct, dec!(45));
    }

    #[test]
    fn test_flags_in_application_order() {
        let result = scorer().score_metrics(
            AlertType::PriceSpike,
            dec!(2.5),
            dec!(35),
            Some(dec!(60)),
            Some("Finance"),
        );
        assert_eq!(
            result.flags,
            vec!["PRICE SPIKE", "Under $3", "SOLID MOVE 30%+", "HIGH VOL 50x+", "GOOD SECTOR"]
        );
        assert_eq!(result.score, 35 + 30 + 15 + 20 + 15);
    }

    #[test]
    fn test_missing_metrics_contribute_nothing() {
        let with_rv = scorer().score_metrics(
            AlertType::SustainedPositive,
            dec!(8),
            dec!(5),
            None,
            Some("Finance"),
        );
        // 5 (higher price) + 15 (good sector)
        assert_eq!(with_rv.score, 20);
    }

    #[test]
    fn test_unknown_sector_penalized() {
        let known = scorer().score_metrics(AlertType::PriceSpike, dec!(2), dec!(20), None, Some("Retail Trade"));
        let unknown = scorer().score_metrics(AlertType::PriceSpike, dec!(2), dec!(20), None, Some("Shell Companies"));
        let missing = scorer().score_metrics(AlertType::PriceSpike, dec!(2), dec!(20), None, None);
        assert_eq!(known.score - unknown.score, 5);
        assert_eq!(unknown.score, missing.score);
    }

    #[test]
    fn test_premarket_penalty() {
        let r = scorer().score_metrics(AlertType::NewPremarketMove, dec!(2), dec!(8), Some(dec!(3)), None);
        // -20 premarket, +30 under $3, -10 low volume, -5 unknown sector
        assert_eq!(r.score, -5);
        assert_eq!(r.probability_category, ProbabilityCategory::VeryLow);
        assert_eq!(r.estimated_probability_pct, dec!(8));
    }

    #[test]
    fn test_relative_volume_monotonic() {
        let s = scorer();
        let levels = [dec!(0), dec!(4.9), dec!(5), dec!(9), dec!(10), dec!(50), dec!(199), dec!(200), dec!(400), dec!(500), dec!(900)];
        let scores: Vec<i32> = levels
            .iter()
            .map(|rv| s.score_metrics(AlertType::PriceSpike, dec!(2), dec!(20), Some(*rv), None).score)
            .collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]), "{scores:?}");
    }

    #[test]
    fn test_change_monotonic() {
        let s = scorer();
        for alert_type in AlertType::ALL {
            let mut last = i32::MIN;
            for change in [0, 10, 15, 29, 30, 50, 74, 75, 100, 145, 300] {
                let score = s
                    .score_metrics(alert_type, dec!(2), Decimal::from(change), Some(dec!(20)), None)
                    .score;
                assert!(score >= last, "{alert_type} at {change}");
                last = score;
            }
        }
    }

    #[test]
    fn test_category_breakpoints() {
        let s = scorer();
        assert_eq!(s.category(110), ProbabilityCategory::VeryHigh);
        assert_eq!(s.category(109), ProbabilityCategory::High);
        assert_eq!(s.category(85), ProbabilityCategory::High);
        assert_eq!(s.category(55), ProbabilityCategory::Medium);
        assert_eq!(s.category(30), ProbabilityCategory::Low);
        assert_eq!(s.category(29), ProbabilityCategory::VeryLow);
        assert_eq!(s.probability(140), dec!(45));
        assert_eq!(s.probability(139), dec!(35));
    }

    #[test]
    fn test_stop_loss_adjustments() {
        let s = scorer();
        let tight = s.stop_loss(90, dec!(2));
        assert_eq!(tight.percentage, dec!(10));
        assert_eq!(tight.stop_price, dec!(1.8));

        let penny = s.stop_loss(90, dec!(0.5));
        assert_eq!(penny.percentage, dec!(15));
        assert!(penny.rationale.contains("penny"));

        let wide_penny = s.stop_loss(10, dec!(0.5));
        assert_eq!(wide_penny.percentage, dec!(25));

        let pricey = s.stop_loss(90, dec!(25));
        assert_eq!(pricey.percentage, dec!(8));

        let mid = s.stop_loss(45, dec!(4));
        assert_eq!(mid.percentage, dec!(15));
        assert_eq!(s.stop_loss(65, dec!(4)).percentage, dec!(12));
    }

    #[test]
    fn test_stop_loss_clamped_to_bounds() {
        let s = scorer();
        for score in [-50, 0, 39, 40, 59, 60, 79, 80, 250] {
            for price in [dec!(0.1), dec!(1), dec!(5), dec!(20), dec!(50)] {
                let sl = s.stop_loss(score, price);
                assert!(sl.percentage >= dec!(8) && sl.percentage <= dec!(25));
                assert!(sl.stop_price < price);
            }
        }
    }
}
