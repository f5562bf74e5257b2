//! Score tables
//!
//! Every weight, band and breakpoint used by the scorer lives here as data.
//! Tables are versioned and can be overridden from the `[scoring]` config
//! section; `validate` enforces ordering so lookups stay monotonic.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::ProbabilityCategory;
use crate::alert::AlertType;

/// Points plus an optional flag emitted when they apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub points: i32,
    #[serde(default)]
    pub flag: Option<String>,
}

/// Applies when the metric is at or above `at_least`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub at_least: Decimal,
    pub points: i32,
    #[serde(default)]
    pub flag: Option<String>,
}

/// Applies when the price is strictly below `below`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub below: Decimal,
    pub points: i32,
    #[serde(default)]
    pub flag: Option<String>,
}

/// Base weight for an alert type, with an extra bonus for big moves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertTypeWeight {
    pub alert_type: AlertType,
    pub points: i32,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub big_move_points: i32,
    #[serde(default)]
    pub big_move_flag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    /// Ascending by `below`; first match wins
    pub bands: Vec<PriceBand>,
    /// Prices above every band
    pub otherwise: Contribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeVolumeTable {
    /// Descending by `at_least`; first match wins
    pub tiers: Vec<Tier>,
    /// Relative volume strictly below this is penalized
    pub penalty_below: Decimal,
    pub penalty: Contribution,
}

/// Sector weight tier: sectors with weight >= `min_weight` get `points`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorTier {
    pub min_weight: i32,
    pub points: i32,
    #[serde(default)]
    pub flag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorTable {
    pub weights: BTreeMap<String, i32>,
    /// Descending by `min_weight`
    pub tiers: Vec<SectorTier>,
    /// Sectors missing from `weights`, including no sector at all
    pub unknown: Contribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakpoint {
    pub at_least: i32,
    pub category: ProbabilityCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityBreakpoint {
    pub at_least: i32,
    pub pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopLossTier {
    pub min_score: i32,
    pub pct: Decimal,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopLossTable {
    /// Descending by `min_score`
    pub tiers: Vec<StopLossTier>,
    pub default_pct: Decimal,
    pub default_rationale: String,
    /// Prices strictly below this widen the stop
    pub low_price_below: Decimal,
    pub low_price_adjust_pct: Decimal,
    /// Prices strictly above this tighten the stop
    pub high_price_above: Decimal,
    pub high_price_adjust_pct: Decimal,
    pub min_pct: Decimal,
    pub max_pct: Decimal,
}

/// Complete scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTables {
    pub version: u32,
    pub alert_types: Vec<AlertTypeWeight>,
    /// change_pct at or above which the big-move bonus applies
    pub big_move_pct: Decimal,
    pub price: PriceTable,
    /// Descending by `at_least`
    pub change: Vec<Tier>,
    pub relative_volume: RelativeVolumeTable,
    pub sectors: SectorTable,
    /// Descending by `at_least`
    pub categories: Vec<CategoryBreakpoint>,
    pub category_floor: ProbabilityCategory,
    /// Descending by `at_least`
    pub probability: Vec<ProbabilityBreakpoint>,
    pub probability_floor_pct: Decimal,
    pub stop_loss: StopLossTable,
}

fn flag(s: &str) -> Option<String> {
    Some(s.to_string())
}

fn tier(at_least: Decimal, points: i32, f: Option<&str>) -> Tier {
    Tier {
        at_least,
        points,
        flag: f.map(str::to_string),
    }
}

fn weight(alert_type: AlertType, points: i32, f: Option<&str>) -> AlertTypeWeight {
    AlertTypeWeight {
        alert_type,
        points,
        flag: f.map(str::to_string),
        big_move_points: 0,
        big_move_flag: None,
    }
}

impl Default for ScoreTables {
    fn default() -> Self {
        let alert_types = vec![
            AlertTypeWeight {
                big_move_points: 45,
                big_move_flag: flag("BIG AH->PM SPIKE"),
                ..weight(
                    AlertType::AfterhoursFlatToPremarketSpike,
                    50,
                    Some("AH-FLAT->PM-SPIKE"),
                )
            },
            AlertTypeWeight {
                big_move_points: 40,
                big_move_flag: flag("BIG FLAT-TO-SPIKE"),
                ..weight(AlertType::FlatToSpike, 40, Some("FLAT-TO-SPIKE"))
            },
            AlertTypeWeight {
                big_move_points: 20,
                big_move_flag: flag("BIG PRICE SPIKE"),
                ..weight(AlertType::PriceSpike, 35, Some("PRICE SPIKE"))
            },
            weight(AlertType::VolumeClimber, 25, Some("VOLUME CLIMBER")),
            weight(AlertType::PremarketAcceleration, -20, Some("PREMARKET")),
            weight(AlertType::NewPremarketMove, -20, Some("PREMARKET")),
            weight(AlertType::PremarketVolumeSurge, -20, Some("PREMARKET")),
            weight(AlertType::VolumeNewcomer, 0, None),
            weight(AlertType::SustainedPositive, 0, None),
        ];

        let weights: BTreeMap<String, i32> = [
            ("Health Technology", 40),
            ("Electronic Technology", 35),
            ("Technology Services", 25),
            ("Finance", 20),
            ("Transportation", 15),
            ("Distribution Services", 10),
            ("Consumer Services", 10),
            ("Producer Manufacturing", 5),
            ("Retail Trade", 5),
        ]
        .into_iter()
        .map(|(name, w)| (name.to_string(), w))
        .collect();

        Self {
            version: 1,
            alert_types,
            big_move_pct: dec!(75),
            price: PriceTable {
                bands: vec![
                    PriceBand {
                        below: dec!(1),
                        points: 20,
                        flag: flag("Under $1"),
                    },
                    PriceBand {
                        below: dec!(3),
                        points: 30,
                        flag: flag("Under $3"),
                    },
                    PriceBand {
                        below: dec!(6),
                        points: 20,
                        flag: flag("Mid-Range"),
                    },
                ],
                otherwise: Contribution {
                    points: 5,
                    flag: flag("Higher Price"),
                },
            },
            change: vec![
                tier(dec!(145), 35, Some("MASSIVE SPIKE 145%+")),
                tier(dec!(100), 30, Some("BIG SPIKE 100%+")),
                tier(dec!(50), 25, Some("STRONG SPIKE 50%+")),
                tier(dec!(30), 15, Some("SOLID MOVE 30%+")),
                tier(dec!(15), 10, None),
            ],
            relative_volume: RelativeVolumeTable {
                tiers: vec![
                    tier(dec!(500), 50, Some("MEGA VOLUME 500x+")),
                    tier(dec!(400), 45, Some("EXTREME VOL 400x+")),
                    tier(dec!(200), 35, Some("VERY HIGH VOL 200x+")),
                    tier(dec!(50), 20, Some("HIGH VOL 50x+")),
                    tier(dec!(10), 10, Some("GOOD VOL 10x+")),
                ],
                penalty_below: dec!(5),
                penalty: Contribution {
                    points: -10,
                    flag: None,
                },
            },
            sectors: SectorTable {
                weights,
                tiers: vec![
                    SectorTier {
                        min_weight: 35,
                        points: 25,
                        flag: flag("TOP SECTOR"),
                    },
                    SectorTier {
                        min_weight: 20,
                        points: 15,
                        flag: flag("GOOD SECTOR"),
                    },
                    SectorTier {
                        min_weight: 10,
                        points: 5,
                        flag: flag("OK SECTOR"),
                    },
                ],
                unknown: Contribution {
                    points: -5,
                    flag: None,
                },
            },
            categories: vec![
                CategoryBreakpoint {
                    at_least: 110,
                    category: ProbabilityCategory::VeryHigh,
                },
                CategoryBreakpoint {
                    at_least: 85,
                    category: ProbabilityCategory::High,
                },
                CategoryBreakpoint {
                    at_least: 55,
                    category: ProbabilityCategory::Medium,
                },
                CategoryBreakpoint {
                    at_least: 30,
                    category: ProbabilityCategory::Low,
                },
            ],
            category_floor: ProbabilityCategory::VeryLow,
            probability: vec![
                ProbabilityBreakpoint { at_least: 140, pct: dec!(45) },
                ProbabilityBreakpoint { at_least: 110, pct: dec!(35) },
                ProbabilityBreakpoint { at_least: 85, pct: dec!(28) },
                ProbabilityBreakpoint { at_least: 55, pct: dec!(22) },
                ProbabilityBreakpoint { at_least: 30, pct: dec!(16) },
            ],
            probability_floor_pct: dec!(8),
            stop_loss: StopLossTable {
                tiers: vec![
                    StopLossTier {
                        min_score: 80,
                        pct: dec!(10),
                        rationale: "High confidence - tight stop".to_string(),
                    },
                    StopLossTier {
                        min_score: 60,
                        pct: dec!(12),
                        rationale: "Good confidence - moderate stop".to_string(),
                    },
                    StopLossTier {
                        min_score: 40,
                        pct: dec!(15),
                        rationale: "Standard confidence - safe stop".to_string(),
                    },
                ],
                default_pct: dec!(20),
                default_rationale: "Low confidence - wide stop".to_string(),
                low_price_below: dec!(1),
                low_price_adjust_pct: dec!(5),
                high_price_above: dec!(20),
                high_price_adjust_pct: dec!(-3),
                min_pct: dec!(8),
                max_pct: dec!(25),
            },
        }
    }
}

impl ScoreTables {
    pub fn alert_weight(&self, alert_type: AlertType) -> Option<&AlertTypeWeight> {
        self.alert_types.iter().find(|w| w.alert_type == alert_type)
    }

    /// Structural checks: ordering, and non-increasing points down each tier list
    pub fn validate(&self) -> Result<(), String> {
        if self.price.bands.is_empty() || self.change.is_empty() || self.categories.is_empty() {
            return Err("price, change and category tables must not be empty".to_string());
        }
        if self.probability.is_empty() || self.relative_volume.tiers.is_empty() {
            return Err("probability and relative volume tables must not be empty".to_string());
        }

        if !self.price.bands.windows(2).all(|w| w[0].below < w[1].below) {
            return Err("price bands must be ascending by `below`".to_string());
        }
        for (name, tiers) in [("change", &self.change), ("relative_volume", &self.relative_volume.tiers)] {
            if !tiers
                .windows(2)
                .all(|w| w[0].at_least > w[1].at_least && w[0].points >= w[1].points)
            {
                return Err(format!(
                    "{name} tiers must be descending with non-increasing points"
                ));
            }
        }
        if let Some(lowest) = self.relative_volume.tiers.last() {
            if self.relative_volume.penalty_below > lowest.at_least
                || self.relative_volume.penalty.points > 0
            {
                return Err("relative volume penalty must sit below every tier".to_string());
            }
        }
        if !self
            .sectors
            .tiers
            .windows(2)
            .all(|w| w[0].min_weight > w[1].min_weight)
        {
            return Err("sector tiers must be descending by min_weight".to_string());
        }
        if !self
            .categories
            .windows(2)
            .all(|w| w[0].at_least > w[1].at_least && w[0].category > w[1].category)
        {
            return Err("category breakpoints must be descending".to_string());
        }
        if !self
            .probability
            .windows(2)
            .all(|w| w[0].at_least > w[1].at_least && w[0].pct >= w[1].pct)
        {
            return Err("probability breakpoints must be descending".to_string());
        }

        let sl = &self.stop_loss;
        if sl.min_pct <= Decimal::ZERO || sl.min_pct > sl.max_pct || sl.max_pct >= dec!(100) {
            return Err("stop loss bounds out of order".to_string());
        }
        if !sl.tiers.windows(2).all(|w| w[0].min_score > w[1].min_score) {
            return Err("stop loss tiers must be descending by min_score".to_string());
        }
        Ok(())
    }
}
