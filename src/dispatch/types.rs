//! Dispatch types

use thiserror::Error;

/// Dispatch channel errors
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("dispatch queue closed")]
    Closed,
}
