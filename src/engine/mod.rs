//! Scan engine
//!
//! Per-cycle pipeline and the loop that drives it

mod pipeline;
mod scan;
mod types;

pub use pipeline::Engine;
pub use scan::{replay, run_scan_loop, LoopOptions, LoopSummary};
pub use types::{CycleReport, GatedAlert};
