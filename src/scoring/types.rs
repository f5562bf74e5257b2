//! Score result types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative probability tier, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbabilityCategory {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl fmt::Display for ProbabilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbabilityCategory::VeryLow => "VERY LOW",
            ProbabilityCategory::Low => "LOW",
            ProbabilityCategory::Medium => "MEDIUM",
            ProbabilityCategory::High => "HIGH",
            ProbabilityCategory::VeryHigh => "VERY HIGH",
        };
        f.write_str(s)
    }
}

/// Recommended stop for a candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopLoss {
    /// Distance below the alert price, in percent
    pub percentage: Decimal,
    pub stop_price: Decimal,
    pub rationale: String,
}

/// Outcome of scoring one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: i32,
    /// Tags in the order their contributions were applied
    pub flags: Vec<String>,
    pub probability_category: ProbabilityCategory,
    pub estimated_probability_pct: Decimal,
    pub stop_loss: StopLoss,
}

impl ScoreResult {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}
