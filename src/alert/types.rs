//! Alert candidate types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::flat::FlatPeriodResult;

/// Closed set of alert kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    VolumeClimber,
    VolumeNewcomer,
    PriceSpike,
    FlatToSpike,
    PremarketAcceleration,
    NewPremarketMove,
    PremarketVolumeSurge,
    AfterhoursFlatToPremarketSpike,
    SustainedPositive,
}

impl AlertType {
    pub const ALL: [AlertType; 9] = [
        AlertType::VolumeClimber,
        AlertType::VolumeNewcomer,
        AlertType::PriceSpike,
        AlertType::FlatToSpike,
        AlertType::PremarketAcceleration,
        AlertType::NewPremarketMove,
        AlertType::PremarketVolumeSurge,
        AlertType::AfterhoursFlatToPremarketSpike,
        AlertType::SustainedPositive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::VolumeClimber => "volume_climber",
            AlertType::VolumeNewcomer => "volume_newcomer",
            AlertType::PriceSpike => "price_spike",
            AlertType::FlatToSpike => "flat_to_spike",
            AlertType::PremarketAcceleration => "premarket_acceleration",
            AlertType::NewPremarketMove => "new_premarket_move",
            AlertType::PremarketVolumeSurge => "premarket_volume_surge",
            AlertType::AfterhoursFlatToPremarketSpike => "afterhours_flat_to_premarket_spike",
            AlertType::SustainedPositive => "sustained_positive",
        }
    }

    /// Alerts derived from premarket fields
    pub fn is_premarket(&self) -> bool {
        matches!(
            self,
            AlertType::PremarketAcceleration
                | AlertType::NewPremarketMove
                | AlertType::PremarketVolumeSurge
                | AlertType::AfterhoursFlatToPremarketSpike
        )
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quote metrics captured when the candidate was produced
///
/// For premarket alerts `price` is the implied premarket price and
/// `change_pct` the premarket change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertMetrics {
    pub price: Decimal,
    pub change_pct: Decimal,
    pub volume: u64,
    pub relative_volume: Option<Decimal>,
    pub change_from_open: Option<Decimal>,
    pub sector: Option<String>,
    pub float_shares: Option<u64>,
}

/// Rule-specific evidence, one variant per [`AlertType`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "alert_type", rename_all = "snake_case")]
pub enum AlertPayload {
    VolumeClimber {
        previous_rank: usize,
        current_rank: usize,
    },
    VolumeNewcomer {
        current_rank: usize,
    },
    PriceSpike {
        /// Change across the spike window; None on a ticker's first sample
        window_change_pct: Option<Decimal>,
        window_minutes: u64,
    },
    FlatToSpike {
        window_change_pct: Option<Decimal>,
        window_minutes: u64,
        flat: FlatPeriodResult,
    },
    PremarketAcceleration {
        premarket_change: Decimal,
        previous_premarket_change: Decimal,
        acceleration: Decimal,
    },
    NewPremarketMove {
        premarket_change: Decimal,
    },
    PremarketVolumeSurge {
        premarket_volume: u64,
        previous_premarket_volume: Option<u64>,
        /// None on the first scan, when there is nothing to compare with
        volume_change_pct: Option<Decimal>,
    },
    AfterhoursFlatToPremarketSpike {
        premarket_change: Decimal,
        afterhours: FlatPeriodResult,
        /// Implied premarket price versus the after-hours average
        spike_from_afterhours_pct: Decimal,
    },
    SustainedPositive {
        change_from_prev_close: Decimal,
    },
}

impl AlertPayload {
    pub fn alert_type(&self) -> AlertType {
        match self {
            AlertPayload::VolumeClimber { .. } => AlertType::VolumeClimber,
            AlertPayload::VolumeNewcomer { .. } => AlertType::VolumeNewcomer,
            AlertPayload::PriceSpike { .. } => AlertType::PriceSpike,
            AlertPayload::FlatToSpike { .. } => AlertType::FlatToSpike,
            AlertPayload::PremarketAcceleration { .. } => AlertType::PremarketAcceleration,
            AlertPayload::NewPremarketMove { .. } => AlertType::NewPremarketMove,
            AlertPayload::PremarketVolumeSurge { .. } => AlertType::PremarketVolumeSurge,
            AlertPayload::AfterhoursFlatToPremarketSpike { .. } => {
                AlertType::AfterhoursFlatToPremarketSpike
            }
            AlertPayload::SustainedPositive { .. } => AlertType::SustainedPositive,
        }
    }
}

/// A rule match for one symbol in one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCandidate {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub metrics: AlertMetrics,
    pub payload: AlertPayload,
}

impl AlertCandidate {
    pub fn alert_type(&self) -> AlertType {
        self.payload.alert_type()
    }

    /// The rule's own strength measure, used to order candidates of one kind
    pub fn magnitude(&self) -> Decimal {
        match &self.payload {
            AlertPayload::VolumeClimber {
                previous_rank,
                current_rank,
            } => Decimal::from(*previous_rank) - Decimal::from(*current_rank),
            AlertPayload::VolumeNewcomer { .. } => self.metrics.change_pct,
            AlertPayload::PriceSpike {
                window_change_pct, ..
            }
            | AlertPayload::FlatToSpike {
                window_change_pct, ..
            } => window_change_pct
                .map_or(self.metrics.change_pct, |w| w.max(self.metrics.change_pct)),
            AlertPayload::PremarketAcceleration { acceleration, .. } => *acceleration,
            AlertPayload::NewPremarketMove { premarket_change }
            | AlertPayload::AfterhoursFlatToPremarketSpike {
                premarket_change, ..
            } => *premarket_change,
            AlertPayload::PremarketVolumeSurge {
                premarket_volume, ..
            } => Decimal::from(*premarket_volume),
            AlertPayload::SustainedPositive {
                change_from_prev_close,
            } => *change_from_prev_close,
        }
    }
}

/// A rule could not be evaluated for one symbol
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("{symbol}: missing field {field} for {rule}")]
    MissingField {
        rule: &'static str,
        symbol: String,
        field: &'static str,
    },
    #[error("{symbol}: invalid {field} for {rule}: {reason}")]
    InvalidValue {
        rule: &'static str,
        symbol: String,
        field: &'static str,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn metrics(change: Decimal) -> AlertMetrics {
        AlertMetrics {
            price: dec!(2),
            change_pct: change,
            volume: 1000,
            relative_volume: None,
            change_from_open: None,
            sector: None,
            float_shares: None,
        }
    }

    #[test]
    fn test_alert_type_names_match_serde() {
        for alert_type in AlertType::ALL {
            let json = serde_json::to_string(&alert_type).unwrap();
            assert_eq!(json, format!("\"{}\"", alert_type.as_str()));
        }
    }

    #[test]
    fn test_payload_tag() {
        let payload = AlertPayload::VolumeNewcomer { current_rank: 4 };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["alert_type"], "volume_newcomer");
        assert_eq!(payload.alert_type(), AlertType::VolumeNewcomer);
    }

    #[test]
    fn test_magnitude() {
        let climber = AlertCandidate {
            symbol: "AAA".into(),
            timestamp: Utc::now(),
            metrics: metrics(dec!(4)),
            payload: AlertPayload::VolumeClimber {
                previous_rank: 30,
                current_rank: 12,
            },
        };
        assert_eq!(climber.magnitude(), dec!(18));

        let spike = AlertCandidate {
            payload: AlertPayload::PriceSpike {
                window_change_pct: Some(dec!(14)),
                window_minutes: 10,
            },
            metrics: metrics(dec!(22)),
            ..climber
        };
        assert_eq!(spike.magnitude(), dec!(22));
    }

    #[test]
    fn test_premarket_kinds() {
        assert!(AlertType::NewPremarketMove.is_premarket());
        assert!(AlertType::AfterhoursFlatToPremarketSpike.is_premarket());
        assert!(!AlertType::FlatToSpike.is_premarket());
    }
}
