//! CLI interface for momentum-scout
//!
//! Provides subcommands for:
//! - `run`: Scan live snapshots, dispatch alerts and paper trade
//! - `replay`: Run recorded snapshots through the engine
//! - `stats`: Show persisted ticker counters and paper performance
//! - `config`: Print the effective configuration

mod replay;
mod run;
mod stats;

pub use replay::ReplayArgs;
pub use run::{respond, RunArgs};
pub use stats::StatsArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "momentum-scout")]
#[command(about = "Momentum alert scanner with paper trading for small-cap equities")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan live snapshots
    Run(RunArgs),
    /// Replay recorded snapshots
    Replay(ReplayArgs),
    /// Show persisted statistics
    Stats(StatsArgs),
    /// Print the effective configuration
    Config,
}
