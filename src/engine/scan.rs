//! Scan loop
//!
//! Drives the engine from a snapshot source on a fixed interval. Commands
//! are applied between cycles, never during one.

use chrono::Utc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::pipeline::Engine;
use super::types::CycleReport;
use crate::command::Command;
use crate::config::{Config, SourceKind};
use crate::feed::{FeedError, SnapshotSource};
use crate::telemetry::{increment_counter, CounterMetric};

/// Scan loop settings
#[derive(Debug, Clone)]
pub struct LoopOptions {
    pub poll_interval: Duration,
    pub snapshot_limit: usize,
    /// Stop after this many completed cycles
    pub max_cycles: Option<u64>,
    /// Stop once the source reports it has nothing left
    pub stop_when_exhausted: bool,
}

impl LoopOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.scanner.poll_interval_secs),
            snapshot_limit: config.scanner.snapshot_limit,
            max_cycles: None,
            stop_when_exhausted: config.source.kind == SourceKind::Replay,
        }
    }
}

/// Totals over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub cycles: u64,
    pub fetch_failures: u64,
    pub alerts: u64,
    pub entries: u64,
    pub exits: u64,
}

impl LoopSummary {
    fn absorb(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.alerts += report.messages.len() as u64;
        self.entries += report.entries.len() as u64;
        self.exits += report.exits.len() as u64;
    }
}

/// Run until shutdown is signalled, the cycle limit is hit, or a replay runs dry.
///
/// Dropping the shutdown sender also stops the loop. The engine is handed
/// back with its state saved.
pub async fn run_scan_loop<S>(
    mut engine: Engine,
    source: &S,
    mut commands: mpsc::Receiver<Command>,
    mut shutdown: watch::Receiver<bool>,
    options: LoopOptions,
) -> (Engine, LoopSummary)
where
    S: SnapshotSource + ?Sized,
{
    let mut summary = LoopSummary::default();
    let mut interval = tokio::time::interval(options.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut commands_open = true;

    info!(
        interval_secs = options.poll_interval.as_secs(),
        limit = options.snapshot_limit,
        "Scan loop started"
    );

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }

            command = commands.recv(), if commands_open => {
                match command {
                    Some(command) => engine.handle_command(command),
                    None => commands_open = false,
                }
            }

            _ = interval.tick() => {
                while let Ok(command) = commands.try_recv() {
                    engine.handle_command(command);
                }

                match source.fetch_snapshot(options.snapshot_limit).await {
                    Ok(snapshot) => {
                        let report = engine.run_cycle(&snapshot);
                        summary.absorb(&report);
                    }
                    Err(FeedError::Exhausted) if options.stop_when_exhausted => {
                        info!("Snapshot source exhausted");
                        break;
                    }
                    Err(e) => {
                        summary.fetch_failures += 1;
                        increment_counter(CounterMetric::FetchFailures, None, 1);
                        warn!(error = %e, "Snapshot fetch failed, skipping cycle");
                    }
                }

                if options.max_cycles.is_some_and(|max| summary.cycles >= max) {
                    break;
                }
            }
        }
    }

    if let Err(e) = engine.save(Utc::now()) {
        warn!(error = %e, "Failed to save state");
    }
    info!(
        cycles = summary.cycles,
        alerts = summary.alerts,
        fetch_failures = summary.fetch_failures,
        "Scan loop stopped"
    );
    (engine, summary)
}

/// Run every remaining snapshot through the engine back to back
pub async fn replay<S>(engine: &mut Engine, source: &S, limit: usize) -> Result<LoopSummary, FeedError>
where
    S: SnapshotSource + ?Sized,
{
    let mut summary = LoopSummary::default();
    loop {
        let snapshot = match source.fetch_snapshot(limit).await {
            Ok(snapshot) => snapshot,
            Err(FeedError::Exhausted) => break,
            Err(e) => return Err(e),
        };
        let report = engine.run_cycle(&snapshot);
        summary.absorb(&report);
    }
    Ok(summary)
}
