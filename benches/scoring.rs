//! Benchmarks for candidate scoring and a full scan cycle

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use momentum_scout::alert::{AlertCandidate, AlertMetrics, AlertPayload};
use momentum_scout::config::Config;
use momentum_scout::engine::Engine;
use momentum_scout::market::{MarketSnapshot, TickerQuote};
use momentum_scout::scoring::MomentumScorer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn candidate() -> AlertCandidate {
    AlertCandidate {
        symbol: "ABCD".to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 6, 12, 14, 0, 0).unwrap(),
        metrics: AlertMetrics {
            price: dec!(2.45),
            change_pct: dec!(62.5),
            volume: 8_400_000,
            relative_volume: Some(dec!(75)),
            change_from_open: Some(dec!(40)),
            sector: Some("Health Technology".to_string()),
            float_shares: Some(12_000_000),
        },
        payload: AlertPayload::PriceSpike {
            window_change_pct: Some(dec!(22)),
            window_minutes: 10,
        },
    }
}

fn benchmark_score(c: &mut Criterion) {
    let scorer = MomentumScorer::default();
    let candidate = candidate();

    c.bench_function("score_price_spike", |b| {
        b.iter(|| scorer.score(black_box(&candidate)))
    });
}

fn benchmark_cycle(c: &mut Criterion) {
    let start = Utc.with_ymd_and_hms(2024, 6, 12, 14, 0, 0).unwrap();
    let snapshots: Vec<MarketSnapshot> = (0..30)
        .map(|minute| {
            let quotes = (0..200)
                .map(|i| TickerQuote {
                    change_pct: Some(Decimal::from(i % 40)),
                    relative_volume: Some(Decimal::from(i % 12)),
                    change_from_prev_close: Some(Decimal::from(i % 25)),
                    ..TickerQuote::new(format!("T{i:03}"), dec!(1) + Decimal::new(i + minute, 2))
                })
                .collect();
            MarketSnapshot::new(start + Duration::minutes(minute), quotes)
        })
        .collect();

    c.bench_function("scan_cycle_200_quotes", |b| {
        b.iter(|| {
            let mut engine = Engine::new(Config::default());
            for snapshot in &snapshots {
                black_box(engine.run_cycle(snapshot));
            }
        })
    });
}

criterion_group!(benches, benchmark_score, benchmark_cycle);
criterion_main!(benches);
