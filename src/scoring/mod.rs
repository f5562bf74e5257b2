//! Momentum scoring
//!
//! Pure scoring of alert candidates against versioned lookup tables:
//! composite score, qualitative flags, probability tier and stop-loss.

mod scorer;
mod tables;
mod types;

pub use scorer::MomentumScorer;
pub use tables::{
    AlertTypeWeight, CategoryBreakpoint, Contribution, PriceBand, PriceTable,
    ProbabilityBreakpoint, RelativeVolumeTable, ScoreTables, SectorTable, SectorTier,
    StopLossTable, StopLossTier, Tier,
};
pub use types::{ProbabilityCategory, ScoreResult, StopLoss};
