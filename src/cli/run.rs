//! Run command implementation

use clap::Args;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::command::{self, CommandHandle, TextCommand};
use crate::config::Config;
use crate::dispatch::{build_dispatcher, DispatchQueue};
use crate::engine::{run_scan_loop, Engine, LoopOptions};
use crate::feed::build_source;
use crate::market::SessionCalendar;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Stop after this many cycles
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Do not read commands from stdin
    #[arg(long)]
    pub no_stdin: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let calendar = SessionCalendar::from_config(&config.session);
        let source = build_source(&config.source, calendar)?;
        let dispatcher = build_dispatcher(&config.dispatch)?;
        tracing::info!(dispatcher = dispatcher.name(), "Dispatcher ready");
        let queue = DispatchQueue::spawn(Arc::clone(&dispatcher), config.dispatch.queue_capacity);

        let engine = Engine::new(config.clone())
            .with_persistence()
            .with_dispatch(queue);

        let (handle, commands) = command::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Interrupt received, shutting down"),
                Err(e) => tracing::error!(error = %e, "Failed to listen for interrupt"),
            }
            let _ = shutdown_tx.send(true);
        });

        if !self.no_stdin {
            tokio::spawn(stdin_listener(handle));
        }

        let mut options = LoopOptions::from_config(&config);
        options.max_cycles = self.max_cycles;

        let (engine, summary) = run_scan_loop(engine, &*source, commands, shutdown_rx, options).await;
        let paper = engine.paper().summary();
        let dispatched = engine.shutdown().await;

        println!(
            "cycles: {}  alerts: {}  fetch failures: {}",
            summary.cycles, summary.alerts, summary.fetch_failures
        );
        if let Some(stats) = dispatched {
            println!("dispatched: {} sent, {} failed", stats.sent, stats.failed);
        }
        println!("{paper}");
        Ok(())
    }
}

async fn stdin_listener(handle: CommandHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => println!("{}", respond(&handle, &line).await),
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stdin");
                break;
            }
        }
    }
    tracing::debug!("Stdin listener stopped");
}

/// Execute one text command and render the reply
pub async fn respond(handle: &CommandHandle, line: &str) -> String {
    let command = match TextCommand::parse(line) {
        Ok(command) => command,
        Err(e) => return format!("{e}\n{}", TextCommand::help()),
    };

    let reply = match command {
        TextCommand::Help => return TextCommand::help().to_string(),
        TextCommand::Mute(symbol) => handle.mute(&symbol).await.map(|newly| {
            if newly {
                format!("{symbol} muted for this session")
            } else {
                format!("{symbol} was already muted")
            }
        }),
        TextCommand::ListMuted => handle.list_muted().await.map(|muted| {
            if muted.is_empty() {
                "no muted symbols".to_string()
            } else {
                muted.join(", ")
            }
        }),
        TextCommand::Stats(n) => handle.stats(n).await.map(|report| {
            let mut out = String::new();
            for row in &report.tickers {
                out.push_str(&format!(
                    "{:<6} lifetime {:>3}  session {:>3}{}\n",
                    row.symbol,
                    row.lifetime_alert_count,
                    row.session_alert_count,
                    if row.disregarded { "  (muted)" } else { "" }
                ));
            }
            if report.tickers.is_empty() {
                out.push_str("no alerts yet\n");
            }
            out.push_str(&report.paper.to_string());
            out
        }),
        TextCommand::Reset => handle
            .reset()
            .await
            .map(|()| "counters, cooldowns and mutes reset".to_string()),
    };

    reply.unwrap_or_else(|e| format!("error: {e}"))
}
