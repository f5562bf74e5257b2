//! Gate decision types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cooldown tier derived from a ticker's recent alert changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformerTier {
    High,
    Regular,
    Poor,
}

/// How an approved candidate got through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalPath {
    /// Score above the bypass threshold; no other check ran
    PriorityBypass,
    /// Passed every check
    Checked,
}

/// Why a candidate was suppressed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// User muted the symbol for this session
    Muted,
    Cooldown {
        tier: PerformerTier,
        remaining_secs: i64,
    },
    BelowThreshold {
        relative_volume: Option<Decimal>,
        required_relative_volume: Decimal,
        change_pct: Decimal,
        required_change_pct: Decimal,
    },
    Concentration {
        share: Decimal,
        cap: Decimal,
    },
}

impl RejectReason {
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::Muted => "muted",
            RejectReason::Cooldown { .. } => "cooldown",
            RejectReason::BelowThreshold { .. } => "below_threshold",
            RejectReason::Concentration { .. } => "concentration",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Muted => write!(f, "muted by user"),
            RejectReason::Cooldown {
                tier,
                remaining_secs,
            } => write!(f, "cooldown ({tier:?} performer, {remaining_secs}s left)"),
            RejectReason::BelowThreshold {
                relative_volume,
                required_relative_volume,
                change_pct,
                required_change_pct,
            } => write!(
                f,
                "below threshold (rvol {relative_volume:?} < {required_relative_volume} or change {change_pct} < {required_change_pct})"
            ),
            RejectReason::Concentration { share, cap } => {
                write!(f, "concentration {share} exceeds {cap}")
            }
        }
    }
}

/// Gate verdict for one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateDecision {
    Approved(ApprovalPath),
    Rejected(RejectReason),
}

impl GateDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, GateDecision::Approved(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            GateDecision::Approved(ApprovalPath::PriorityBypass) => "priority_bypass",
            GateDecision::Approved(ApprovalPath::Checked) => "approved",
            GateDecision::Rejected(reason) => reason.label(),
        }
    }
}
