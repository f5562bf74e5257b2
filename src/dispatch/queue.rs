//! Background dispatch queue
//!
//! The scan loop hands messages off without awaiting the network; a spawned
//! task sends them one at a time. Failures are logged and counted, never
//! retried.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::Dispatcher;
use crate::telemetry::{increment_counter, CounterMetric};

/// Totals reported when the queue shuts down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub sent: u64,
    pub failed: u64,
}

pub struct DispatchQueue {
    tx: mpsc::Sender<String>,
    handle: JoinHandle<DispatchStats>,
}

impl DispatchQueue {
    /// Spawn the sender task; must be called inside a tokio runtime
    pub fn spawn(dispatcher: Arc<dyn Dispatcher>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(Self::run(dispatcher, rx));
        Self { tx, handle }
    }

    /// Queue a message; returns false if the queue is full or closed
    pub fn enqueue(&self, message: String) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Dispatch queue full, dropping alert");
                increment_counter(CounterMetric::DispatchDropped, None, 1);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::error!("Dispatch queue closed, dropping alert");
                increment_counter(CounterMetric::DispatchDropped, None, 1);
                false
            }
        }
    }

    /// Close the queue and wait for queued messages to be sent
    pub async fn shutdown(self) -> DispatchStats {
        drop(self.tx);
        match self.handle.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, "Dispatch task failed");
                DispatchStats::default()
            }
        }
    }

    async fn run(dispatcher: Arc<dyn Dispatcher>, mut rx: mpsc::Receiver<String>) -> DispatchStats {
        let mut stats = DispatchStats::default();
        while let Some(message) = rx.recv().await {
            match dispatcher.send(&message).await {
                Ok(()) => stats.sent += 1,
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(dispatcher = dispatcher.name(), error = %e, "Alert dispatch failed");
                    increment_counter(CounterMetric::DispatchFailures, Some(dispatcher.name()), 1);
                }
            }
        }
        tracing::info!(sent = stats.sent, failed = stats.failed, "Dispatch queue shutting down");
        stats
    }
}
