//! Paper trading
//!
//! Simulated fixed-notional entries on alerts with EMA-based exits and an
//! end-of-day liquidation.

mod ema;
mod trader;
mod types;

pub use ema::{ema, EmaPair};
pub use trader::PaperTrader;
pub use types::{CompletedTrade, EntryBlock, ExitReason, PaperPosition, PerformanceSummary};
