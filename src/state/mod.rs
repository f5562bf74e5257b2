//! Ticker state store
//!
//! Per-symbol rolling price windows, alert counters, cooldown timestamps,
//! and session mute flags. Owned exclusively by the engine.

mod store;
mod ticker;
mod window;

pub use store::{TickerStats, TickerStore, WindowSettings};
pub use ticker::{TickerRecord, TickerState};
pub use window::PriceWindow;
