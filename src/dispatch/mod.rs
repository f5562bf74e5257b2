//! Alert dispatch
//!
//! Message formatting, dispatch channels and the background send queue

mod format;
mod queue;
mod types;
mod webhook;

pub use format::{AlertMessage, TARGET_PCT};
pub use queue::{DispatchQueue, DispatchStats};
pub use types::DispatchError;
pub use webhook::{LogDispatcher, WebhookDispatcher};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DispatchConfig;

/// Trait for notification channels
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Short name used in logs and metric labels
    fn name(&self) -> &'static str;

    async fn send(&self, message: &str) -> Result<(), DispatchError>;
}

/// Webhook dispatcher when a URL is configured, log dispatcher otherwise
pub fn build_dispatcher(config: &DispatchConfig) -> Result<Arc<dyn Dispatcher>, DispatchError> {
    match &config.webhook_url {
        Some(url) => Ok(Arc::new(WebhookDispatcher::new(
            url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)),
        None => Ok(Arc::new(LogDispatcher)),
    }
}
