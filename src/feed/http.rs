//! HTTP JSON snapshot source

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;

use super::types::{decode_snapshot, FeedError};
use super::SnapshotSource;
use crate::config::SourceConfig;
use crate::market::{MarketSnapshot, SessionCalendar};

/// GETs a ranked quote list from a scanner endpoint
pub struct HttpSnapshotSource {
    client: Client,
    url: String,
    calendar: SessionCalendar,
}

impl HttpSnapshotSource {
    pub fn new(config: &SourceConfig, calendar: SessionCalendar) -> Result<Self, FeedError> {
        let url = config
            .url
            .clone()
            .ok_or(FeedError::NotConfigured("source.url"))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url,
            calendar,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch_snapshot(&self, limit: usize) -> Result<MarketSnapshot, FeedError> {
        tracing::debug!(url = %self.url, limit, "Fetching snapshot");

        let response = self
            .client
            .get(&self.url)
            .query(&[("limit", limit)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Status { status, body });
        }

        let body = response.bytes().await?;
        let snapshot = decode_snapshot(&body, limit, &self.calendar, Some(Utc::now()))?;
        tracing::debug!(quotes = snapshot.len(), "Fetched snapshot");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_url() {
        let config = SourceConfig::default();
        assert!(matches!(
            HttpSnapshotSource::new(&config, SessionCalendar::default()),
            Err(FeedError::NotConfigured(_))
        ));

        let config = SourceConfig {
            url: Some("http://localhost:9/scan".into()),
            ..SourceConfig::default()
        };
        let source = HttpSnapshotSource::new(&config, SessionCalendar::default()).unwrap();
        assert_eq!(source.url(), "http://localhost:9/scan");
    }
}
