//! Recorded snapshot replay

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::{decode_snapshot, FeedError};
use super::SnapshotSource;
use crate::market::{MarketSnapshot, SessionCalendar};

/// Serves `*.json` snapshot files from a directory in file-name order
pub struct ReplaySource {
    files: Vec<PathBuf>,
    cursor: AtomicUsize,
    calendar: SessionCalendar,
}

impl ReplaySource {
    pub fn from_dir(dir: &Path, calendar: SessionCalendar) -> Result<Self, FeedError> {
        let io_err = |source| FeedError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(Self::from_files(files, calendar))
    }

    pub fn from_files(files: Vec<PathBuf>, calendar: SessionCalendar) -> Self {
        Self {
            files,
            cursor: AtomicUsize::new(0),
            calendar,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Snapshots not yet served
    pub fn remaining(&self) -> usize {
        self.files.len().saturating_sub(self.cursor.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl SnapshotSource for ReplaySource {
    async fn fetch_snapshot(&self, limit: usize) -> Result<MarketSnapshot, FeedError> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        let path = self.files.get(index).ok_or(FeedError::Exhausted)?;
        let raw = tokio::fs::read(path).await.map_err(|source| FeedError::Io {
            path: path.clone(),
            source,
        })?;
        decode_snapshot(&raw, limit, &self.calendar, None)
    }
}
