//! Scan loop driven by a replay source, with commands from a listener

use momentum_scout::command;
use momentum_scout::engine::{run_scan_loop, Engine, LoopOptions};
use momentum_scout::feed::ReplaySource;
use momentum_scout::market::{MarketSnapshot, SessionCalendar};
use rust_decimal_macros::dec;
use std::time::Duration;
use tokio::sync::watch;

use crate::common::{config_in, et, spiking, write_snapshots};

fn spaced_snapshots() -> Vec<MarketSnapshot> {
    [0, 12, 24]
        .into_iter()
        .map(|m| MarketSnapshot::new(et(12, 10, m), vec![spiking("ABC", dec!(2.00))]))
        .collect()
}

fn options() -> LoopOptions {
    LoopOptions {
        poll_interval: Duration::from_secs(120),
        snapshot_limit: 100,
        max_cycles: None,
        stop_when_exhausted: true,
    }
}

#[tokio::test(start_paused = true)]
async fn test_muted_before_first_cycle() {
    let recordings = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_snapshots(recordings.path(), &spaced_snapshots());

    let config = config_in(data.path());
    let source =
        ReplaySource::from_dir(recordings.path(), SessionCalendar::from_config(&config.session))
            .unwrap();
    let engine = Engine::new(config).with_persistence();
    let (handle, commands) = command::channel(8);
    let (_shutdown_tx, shutdown) = watch::channel(false);

    let task = tokio::spawn(async move {
        run_scan_loop(engine, &source, commands, shutdown, options()).await
    });

    assert_eq!(handle.mute("abc").await, Ok(true));
    let stats = handle.stats(5).await.unwrap();
    assert!(stats.tickers.is_empty());

    let (engine, summary) = task.await.unwrap();
    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.alerts, 0);
    assert!(engine.store().is_muted("ABC"));
    assert_eq!(engine.store().lifetime_count("ABC"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unmuted_alerts_each_cooldown() {
    let recordings = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_snapshots(recordings.path(), &spaced_snapshots());

    let config = config_in(data.path());
    let source =
        ReplaySource::from_dir(recordings.path(), SessionCalendar::from_config(&config.session))
            .unwrap();
    let (_handle, commands) = command::channel(8);
    let (_shutdown_tx, shutdown) = watch::channel(false);

    let (engine, summary) =
        run_scan_loop(Engine::new(config), &source, commands, shutdown, options()).await;
    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.alerts, 3);
    assert_eq!(engine.store().get("ABC").unwrap().session_alert_count, 3);
}
