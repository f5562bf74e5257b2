//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMetric {
    /// Classifier candidates, labelled by alert type
    Candidates,
    /// Rule evaluation failures
    RuleErrors,
    /// Gate outcomes, labelled by approval path or reject reason
    GateDecisions,
    /// Failed sends, labelled by dispatcher
    DispatchFailures,
    /// Dispatch messages dropped because the queue was full
    DispatchDropped,
    /// Snapshot fetch failures
    FetchFailures,
    /// Closed paper trades, labelled by exit reason
    PaperTrades,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::Candidates => "scout_candidates_total",
            CounterMetric::RuleErrors => "scout_rule_errors_total",
            CounterMetric::GateDecisions => "scout_gate_decisions_total",
            CounterMetric::DispatchFailures => "scout_dispatch_failures_total",
            CounterMetric::DispatchDropped => "scout_dispatch_dropped_total",
            CounterMetric::FetchFailures => "scout_snapshot_fetch_failures_total",
            CounterMetric::PaperTrades => "scout_paper_trades_total",
        }
    }

    fn label_key(self) -> Option<&'static str> {
        match self {
            CounterMetric::Candidates => Some("alert_type"),
            CounterMetric::GateDecisions => Some("outcome"),
            CounterMetric::DispatchFailures => Some("dispatcher"),
            CounterMetric::PaperTrades => Some("exit_reason"),
            CounterMetric::RuleErrors
            | CounterMetric::DispatchDropped
            | CounterMetric::FetchFailures => None,
        }
    }
}

/// Gauge metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeMetric {
    /// Open paper position count
    OpenPositions,
    /// Paper account cash balance
    PaperBalance,
    /// Realized paper P&L
    RealizedPnl,
    /// Tickers held in the state store
    TrackedTickers,
    /// Quotes in the latest filtered snapshot
    UniverseSize,
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::OpenPositions => "scout_open_positions",
            GaugeMetric::PaperBalance => "scout_paper_balance_usd",
            GaugeMetric::RealizedPnl => "scout_realized_pnl_usd",
            GaugeMetric::TrackedTickers => "scout_tracked_tickers",
            GaugeMetric::UniverseSize => "scout_universe_size",
        }
    }
}

/// Add `value` to a counter; the label is ignored for unlabelled counters
pub fn increment_counter(metric: CounterMetric, label: Option<&'static str>, value: u64) {
    let name = metric.name();
    match (metric.label_key(), label) {
        (Some(key), Some(label)) => metrics::counter!(name, key => label).increment(value),
        _ => metrics::counter!(name).increment(value),
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Record the duration of one scan cycle
pub fn record_cycle_latency(duration: Duration) {
    metrics::histogram!("scout_cycle_latency_ms").record(duration.as_secs_f64() * 1000.0);
}

/// Serve a Prometheus scrape endpoint on all interfaces
pub fn install_prometheus(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_unique() {
        let counters = [
            CounterMetric::Candidates,
            CounterMetric::RuleErrors,
            CounterMetric::GateDecisions,
            CounterMetric::DispatchFailures,
            CounterMetric::DispatchDropped,
            CounterMetric::FetchFailures,
            CounterMetric::PaperTrades,
        ];
        let mut names: Vec<&str> = counters.iter().map(|c| c.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), counters.len());
        assert!(names.iter().all(|n| n.ends_with("_total")));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        increment_counter(CounterMetric::Candidates, Some("price_spike"), 2);
        increment_counter(CounterMetric::FetchFailures, Some("ignored"), 1);
        set_gauge(GaugeMetric::OpenPositions, 3.0);
        record_cycle_latency(Duration::from_millis(12));
    }
}
