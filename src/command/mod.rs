//! Command channel
//!
//! Listeners post commands to the scan loop, which applies them between
//! cycles and answers over a oneshot reply.

mod handle;
mod parse;
mod types;

pub use handle::{channel, CommandHandle};
pub use parse::{TextCommand, DEFAULT_STATS_ROWS};
pub use types::{Command, CommandError, StatsReport};
