//! Shared fixtures

use chrono::{DateTime, TimeZone, Utc};
use momentum_scout::config::Config;
use momentum_scout::market::{MarketSnapshot, TickerQuote};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::Path;

/// Exchange-local (New York, EDT) wall clock on a June 2024 day
pub fn et(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour + 4, minute, 0).unwrap()
}

/// Quote that clears the default gate thresholds
pub fn spiking(symbol: &str, price: Decimal) -> TickerQuote {
    TickerQuote {
        change_pct: Some(dec!(15)),
        relative_volume: Some(dec!(5)),
        volume: 2_500_000,
        ..TickerQuote::new(symbol, price)
    }
}

pub fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.persistence.data_dir = dir.to_path_buf();
    config
}

/// Write snapshots as `NNN.json` files in replay order
pub fn write_snapshots(dir: &Path, snapshots: &[MarketSnapshot]) {
    for (i, snapshot) in snapshots.iter().enumerate() {
        let json = serde_json::to_vec(snapshot).unwrap();
        std::fs::write(dir.join(format!("{i:03}.json")), json).unwrap();
    }
}

/// One spiking ABC quote per minute, price rising a cent each minute
pub fn rising_minutes(day: u32, hour: u32, from: u32, to: u32) -> Vec<MarketSnapshot> {
    (from..=to)
        .map(|minute| {
            let price = dec!(2.00) + Decimal::new((minute - from) as i64, 2);
            MarketSnapshot::new(et(day, hour, minute), vec![spiking("ABC", price)])
        })
        .collect()
}
