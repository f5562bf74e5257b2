//! momentum-scout: momentum alert scanner for small-cap equities
//!
//! This library provides the core components for:
//! - Ranked snapshot feeds over HTTP or from recorded files
//! - Flat-period detection over rolling price windows
//! - Rule-based alert classification and table-driven scoring
//! - A notification gate with cooldowns, sector thresholds and mutes
//! - Paper trading with EMA exits and end-of-day liquidation
//! - State persistence, an alert journal and webhook dispatch
//! - Structured logging and Prometheus metrics

pub mod alert;
pub mod cli;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod feed;
pub mod flat;
pub mod gate;
pub mod market;
pub mod paper;
pub mod persistence;
pub mod scoring;
pub mod state;
pub mod telemetry;
