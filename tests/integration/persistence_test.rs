//! State file and alert journal across restarts

use momentum_scout::engine::Engine;
use momentum_scout::persistence::{AlertJournal, StateStore, STATE_VERSION};
use rust_decimal_macros::dec;

use crate::common::{config_in, rising_minutes};

#[tokio::test]
async fn test_open_position_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let mut engine = Engine::new(config.clone()).with_persistence();
    for snapshot in rising_minutes(12, 15, 30, 42) {
        engine.run_cycle(&snapshot);
    }
    assert!(engine.paper().position("ABC").is_some());
    assert!(engine.shutdown().await.is_none());

    let saved = StateStore::new(config.persistence.state_path())
        .try_load()
        .unwrap()
        .unwrap();
    assert_eq!(saved.version, STATE_VERSION);
    assert_eq!(saved.tickers["ABC"].lifetime_alert_count, 2);
    assert_eq!(saved.balance, Some(dec!(9900)));
    assert!(saved.positions.contains_key("ABC"));

    let restored = Engine::new(config.clone()).with_persistence();
    assert_eq!(restored.paper().balance(), dec!(9900));
    assert_eq!(
        restored.paper().position("ABC").map(|p| p.entry_price),
        Some(dec!(2.10))
    );
    assert_eq!(restored.store().lifetime_count("ABC"), 2);

    let journal = AlertJournal::new(config.persistence.journal_path()).read_all().unwrap();
    assert_eq!(journal.len(), 2);
    assert_eq!(journal[0].lifetime_alert_count, 1);
    assert_eq!(journal[1].lifetime_alert_count, 2);
}

#[test]
fn test_corrupt_state_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::write(config.persistence.state_path(), "{ not json").unwrap();

    let engine = Engine::new(config).with_persistence();
    assert!(engine.store().is_empty());
    assert_eq!(engine.paper().balance(), dec!(10000));
}
