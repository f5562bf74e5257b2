//! End-to-end engine scenarios over recorded snapshots

use momentum_scout::alert::{AlertPayload, AlertType};
use momentum_scout::engine::{replay, Engine};
use momentum_scout::feed::ReplaySource;
use momentum_scout::market::{MarketSnapshot, SessionCalendar, TickerQuote};
use momentum_scout::paper::ExitReason;
use rust_decimal_macros::dec;

use crate::common::{config_in, et, rising_minutes, write_snapshots};

#[test]
fn test_flat_afterhours_then_premarket_spike() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::new(config_in(dir.path()));

    // Wednesday after hours: an hour of unchanged prints
    for minute in (30..=59).step_by(5).chain([90]) {
        let ts = et(12, 16, 0) + chrono::Duration::minutes(minute);
        let report = engine.run_cycle(&MarketSnapshot::new(
            ts,
            vec![TickerQuote::new("ABC", dec!(1.00))],
        ));
        assert!(report.messages.is_empty());
    }

    // Thursday premarket: +25% on decent relative volume
    let quote = TickerQuote {
        premarket_change: Some(dec!(25)),
        relative_volume: Some(dec!(4)),
        ..TickerQuote::new("ABC", dec!(1.00))
    };
    let report = engine.run_cycle(&MarketSnapshot::new(et(13, 8, 0), vec![quote]));

    assert!(report.session_started);
    assert_eq!(report.approved_symbols(), vec!["ABC"]);
    let alert = &report.gated[0];
    assert_eq!(alert.candidate.alert_type(), AlertType::AfterhoursFlatToPremarketSpike);
    assert_eq!(alert.candidate.metrics.price, dec!(1.25));
    match &alert.candidate.payload {
        AlertPayload::AfterhoursFlatToPremarketSpike {
            spike_from_afterhours_pct,
            afterhours,
            ..
        } => {
            assert_eq!(*spike_from_afterhours_pct, dec!(25));
            assert!(afterhours.is_flat);
        }
        other => panic!("unexpected payload {other:?}"),
    }
    assert!(report.messages[0].starts_with("MOMENTUM ALERT: ABC"));
}

#[tokio::test]
async fn test_replay_enters_and_liquidates_at_cutoff() {
    let recordings = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_snapshots(recordings.path(), &rising_minutes(12, 15, 30, 46));

    let config = config_in(data.path());
    let source =
        ReplaySource::from_dir(recordings.path(), SessionCalendar::from_config(&config.session))
            .unwrap();
    assert_eq!(source.len(), 17);

    let mut engine = Engine::new(config);
    let summary = replay(&mut engine, &source, 100).await.unwrap();

    assert_eq!(summary.cycles, 17);
    // 15:30 and 15:40; the cooldown blocks the rest
    assert_eq!(summary.alerts, 2);
    assert_eq!(summary.entries, 1);
    assert_eq!(summary.exits, 1);

    let trade = &engine.paper().trades()[0];
    assert_eq!(trade.symbol(), "ABC");
    assert_eq!(trade.position.entry_price, dec!(2.10));
    assert_eq!(trade.position.entry_time, et(12, 15, 40));
    assert_eq!(trade.exit_reason, ExitReason::EodCutoff);
    assert_eq!(trade.exit_price, dec!(2.15));
    assert_eq!(trade.exit_time, et(12, 15, 45));
    assert!(trade.is_win());
    assert!(engine.paper().positions().is_empty());

    let summary = engine.paper().summary();
    assert_eq!(summary.total_trades, 1);
    assert_eq!(summary.winning_trades, 1);
    assert_eq!(summary.total_pnl, trade.pnl_abs);
    assert!(summary.balance > dec!(10000));
}

#[test]
fn test_no_liquidation_on_weekends() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.paper.ema_fast = 2;
    config.paper.ema_slow = 3;
    let mut engine = Engine::new(config);

    // Saturday 15 June, prices rising through what would be the EOD window
    for snapshot in rising_minutes(15, 15, 30, 50) {
        engine.run_cycle(&snapshot);
    }
    assert_eq!(engine.store().lifetime_count("ABC"), 3);
    assert!(engine.paper().position("ABC").is_some());
    assert!(engine.paper().trades().is_empty());
}
