//! Stats command implementation

use clap::Args;

use crate::config::Config;
use crate::engine::Engine;
use crate::persistence::StateStore;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Number of tickers to list
    #[arg(short, long, default_value = "10")]
    pub top: usize,

    /// Print completed paper trades
    #[arg(long)]
    pub trades: bool,

    /// Output JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl StatsArgs {
    pub fn execute(&self, config: Config) -> anyhow::Result<()> {
        let path = config.persistence.state_path();
        let Some(state) = StateStore::new(&path).try_load()? else {
            println!("No saved state at {}", path.display());
            return Ok(());
        };

        let mut engine = Engine::new(config);
        engine.restore(state);
        let tickers = engine.store().stats(self.top);
        let paper = engine.paper().summary();

        if self.json {
            let out = serde_json::json!({
                "tickers": tickers,
                "paper": paper,
                "open_positions": engine.paper().positions(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }

        println!("Top tickers by alert count:");
        for row in &tickers {
            let last = row
                .last_alert_time
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<6} {:>4} alerts  last {}",
                row.symbol, row.lifetime_alert_count, last
            );
        }

        println!("\nOpen positions:");
        for position in engine.paper().positions().values() {
            println!(
                "  {:<6} {} shares at {} since {}",
                position.symbol,
                position.shares.round_dp(4),
                position.entry_price,
                position.entry_time.to_rfc3339()
            );
        }

        if self.trades {
            println!("\nCompleted trades:");
            for trade in engine.paper().trades() {
                println!(
                    "  {:<6} {} -> {}  {}%  {}",
                    trade.symbol(),
                    trade.position.entry_price,
                    trade.exit_price,
                    trade.pnl_pct.round_dp(2),
                    trade.exit_reason
                );
            }
        }

        println!("\n{paper}");
        Ok(())
    }
}
