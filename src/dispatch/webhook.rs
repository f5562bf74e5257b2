//! Webhook and log dispatchers

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::types::DispatchError;
use super::Dispatcher;

#[derive(Debug, Serialize)]
struct WebhookBody<'a> {
    text: &'a str,
}

/// POSTs `{"text": message}` to a URL
pub struct WebhookDispatcher {
    client: Client,
    url: String,
}

impl WebhookDispatcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Dispatcher for WebhookDispatcher {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, message: &str) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookBody { text: message })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Status { status, body });
        }
        Ok(())
    }
}

/// Emits messages through `tracing`; used when no webhook is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

#[async_trait]
impl Dispatcher for LogDispatcher {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &str) -> Result<(), DispatchError> {
        tracing::info!(target: "momentum_scout::alert", "\n{message}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_body_shape() {
        let json = serde_json::to_value(WebhookBody { text: "hi" }).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hi"}));
    }

    #[tokio::test]
    async fn test_log_dispatcher_never_fails() {
        assert!(LogDispatcher.send("MOMENTUM ALERT: TEST").await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_webhook_errors() {
        let dispatcher =
            WebhookDispatcher::new("http://127.0.0.1:9/hook", Duration::from_millis(200)).unwrap();
        assert!(matches!(
            dispatcher.send("x").await,
            Err(DispatchError::Http(_))
        ));
    }
}
