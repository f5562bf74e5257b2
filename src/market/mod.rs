//! Market data model
//!
//! Per-ticker quotes, ranked snapshots, and the exchange session calendar
//! used to normalize timestamps and classify trading phases.

mod session;
mod types;

pub use session::{SessionCalendar, SessionPhase};
pub use types::{MarketSnapshot, TickerQuote};
