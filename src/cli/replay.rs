//! Replay command implementation

use clap::Args;
use std::path::PathBuf;

use crate::config::Config;
use crate::engine::{replay, Engine};
use crate::feed::ReplaySource;
use crate::market::SessionCalendar;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Directory of recorded snapshot files (*.json)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Load and save state like a live run
    #[arg(long)]
    pub persist: bool,

    /// Print every approved alert
    #[arg(short, long)]
    pub verbose: bool,
}

impl ReplayArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let dir = self
            .dir
            .clone()
            .or_else(|| config.source.replay_dir.clone())
            .ok_or_else(|| anyhow::anyhow!("no replay directory given (--dir or source.replay_dir)"))?;
        let calendar = SessionCalendar::from_config(&config.session);
        let source = ReplaySource::from_dir(&dir, calendar)?;
        tracing::info!(dir = %dir.display(), files = source.len(), "Replaying snapshots");

        let limit = config.scanner.snapshot_limit;
        let mut engine = Engine::new(config);
        if self.persist {
            engine = engine.with_persistence();
        }

        let summary = replay(&mut engine, &source, limit).await?;
        if self.verbose {
            for stats in engine.store().stats(usize::MAX) {
                println!(
                    "{:<6} {} alerts {:?}",
                    stats.symbol, stats.lifetime_alert_count, stats.alert_type_histogram
                );
            }
        }

        println!(
            "snapshots: {}  alerts: {}  paper entries: {}  exits: {}",
            summary.cycles, summary.alerts, summary.entries, summary.exits
        );
        println!("{}", engine.paper().summary());
        engine.shutdown().await;
        Ok(())
    }
}
