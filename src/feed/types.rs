//! Snapshot feed types and wire decoding

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::market::{MarketSnapshot, SessionCalendar, TickerQuote};

/// Snapshot source errors
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed snapshot: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unparsable timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("snapshot has no timestamp")]
    MissingTimestamp,
    #[error("source not configured: {0}")]
    NotConfigured(&'static str),
    /// A replay source has no more snapshots
    #[error("no more snapshots")]
    Exhausted,
}

/// Accepted payloads: a bare ranked quote list, or a snapshot object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireSnapshot {
    Quotes(Vec<TickerQuote>),
    Snapshot {
        #[serde(default)]
        timestamp: Option<String>,
        quotes: Vec<TickerQuote>,
    },
}

/// Decode a provider payload into a snapshot of at most `limit` quotes.
///
/// The payload timestamp is normalized through the session calendar; when
/// the payload has none, `fallback` is used.
pub fn decode_snapshot(
    raw: &[u8],
    limit: usize,
    calendar: &SessionCalendar,
    fallback: Option<DateTime<Utc>>,
) -> Result<MarketSnapshot, FeedError> {
    let (timestamp, mut quotes) = match serde_json::from_slice::<WireSnapshot>(raw)? {
        WireSnapshot::Quotes(quotes) => (None, quotes),
        WireSnapshot::Snapshot { timestamp, quotes } => (timestamp, quotes),
    };
    let timestamp = match timestamp {
        Some(raw_ts) => calendar
            .parse_timestamp(&raw_ts)
            .ok_or(FeedError::InvalidTimestamp(raw_ts))?,
        None => fallback.ok_or(FeedError::MissingTimestamp)?,
    };
    quotes.truncate(limit);
    Ok(MarketSnapshot::new(timestamp, quotes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_quote_list() {
        let raw = br#"[
            {"symbol": "AAA", "price": "1.25", "volume": 1000, "change_pct": "12.5"},
            {"symbol": "BBB", "price": 3.1},
            {"symbol": "CCC", "price": "0.5"}
        ]"#;
        let now = Utc.with_ymd_and_hms(2024, 6, 12, 14, 0, 0).unwrap();
        let snap = decode_snapshot(raw, 2, &SessionCalendar::default(), Some(now)).unwrap();

        assert_eq!(snap.timestamp, now);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.quotes[0].change_pct, Some(dec!(12.5)));
        assert_eq!(snap.quotes[1].price, dec!(3.1));
    }

    #[test]
    fn test_decode_naive_timestamp_in_local_zone() {
        let raw = br#"{"timestamp": "2024-06-12 09:31:00", "quotes": []}"#;
        let snap = decode_snapshot(raw, 10, &SessionCalendar::default(), None).unwrap();
        assert_eq!(snap.timestamp, Utc.with_ymd_and_hms(2024, 6, 12, 13, 31, 0).unwrap());

        let aware = br#"{"timestamp": "2024-06-12T09:31:00+08:00", "quotes": []}"#;
        let snap = decode_snapshot(aware, 10, &SessionCalendar::default(), None).unwrap();
        assert_eq!(snap.timestamp, Utc.with_ymd_and_hms(2024, 6, 12, 1, 31, 0).unwrap());
    }

    #[test]
    fn test_decode_errors() {
        let cal = SessionCalendar::default();
        assert!(matches!(
            decode_snapshot(br#"{"quotes": []}"#, 10, &cal, None),
            Err(FeedError::MissingTimestamp)
        ));
        assert!(matches!(
            decode_snapshot(br#"{"timestamp": "yesterday", "quotes": []}"#, 10, &cal, None),
            Err(FeedError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            decode_snapshot(b"not json", 10, &cal, None),
            Err(FeedError::Decode(_))
        ));
    }
}
