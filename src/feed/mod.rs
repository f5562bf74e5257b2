//! Snapshot feed module
//!
//! Ranked market snapshots from an HTTP scanner endpoint or recorded files

mod cache;
mod http;
mod replay;
mod types;

pub use cache::{CachedSource, TtlCache};
pub use http::HttpSnapshotSource;
pub use replay::ReplaySource;
pub use types::{decode_snapshot, FeedError};

use async_trait::async_trait;
use std::time::Duration;

use crate::config::{SourceConfig, SourceKind};
use crate::market::{MarketSnapshot, SessionCalendar};

/// Trait for snapshot providers
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the current ranked snapshot, at most `limit` quotes
    async fn fetch_snapshot(&self, limit: usize) -> Result<MarketSnapshot, FeedError>;
}

#[async_trait]
impl<S: SnapshotSource + ?Sized> SnapshotSource for Box<S> {
    async fn fetch_snapshot(&self, limit: usize) -> Result<MarketSnapshot, FeedError> {
        (**self).fetch_snapshot(limit).await
    }
}

/// Build the configured source
pub fn build_source(
    config: &SourceConfig,
    calendar: SessionCalendar,
) -> Result<Box<dyn SnapshotSource>, FeedError> {
    match config.kind {
        SourceKind::Http => {
            let source = HttpSnapshotSource::new(config, calendar)?;
            if config.cache_ttl_secs > 0 {
                let ttl = Duration::from_secs(config.cache_ttl_secs);
                Ok(Box::new(CachedSource::new(source, ttl)))
            } else {
                Ok(Box::new(source))
            }
        }
        SourceKind::Replay => {
            let dir = config
                .replay_dir
                .as_deref()
                .ok_or(FeedError::NotConfigured("source.replay_dir"))?;
            Ok(Box::new(ReplaySource::from_dir(dir, calendar)?))
        }
    }
}
