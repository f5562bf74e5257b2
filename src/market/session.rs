//! Exchange session calendar
//!
//! Session phases are evaluated in the exchange's own time zone so that
//! premarket/regular/after-hours boundaries stay correct across DST.
//! Timestamps without an offset are localized once, at the boundary.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;

/// Trading phase of the exchange at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Premarket,
    Regular,
    AfterHours,
    Closed,
}

/// Session boundaries bound to concrete time zones
#[derive(Debug, Clone)]
pub struct SessionCalendar {
    exchange_tz: Tz,
    local_tz: Tz,
    premarket_open: NaiveTime,
    regular_open: NaiveTime,
    regular_close: NaiveTime,
    afterhours_close: NaiveTime,
}

impl Default for SessionCalendar {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl SessionCalendar {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            exchange_tz: config.exchange_timezone,
            local_tz: config.local_timezone,
            premarket_open: config.premarket_open,
            regular_open: config.regular_open,
            regular_close: config.regular_close,
            afterhours_close: config.afterhours_close,
        }
    }

    /// Instant expressed in exchange-local time
    pub fn exchange_time(&self, ts: DateTime<Utc>) -> DateTime<Tz> {
        ts.with_timezone(&self.exchange_tz)
    }

    /// Exchange-local calendar date
    pub fn trading_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        self.exchange_time(ts).date_naive()
    }

    /// Monday through Friday in exchange-local time
    pub fn is_trading_day(&self, ts: DateTime<Utc>) -> bool {
        !matches!(
            self.exchange_time(ts).weekday(),
            Weekday::Sat | Weekday::Sun
        )
    }

    pub fn phase(&self, ts: DateTime<Utc>) -> SessionPhase {
        if !self.is_trading_day(ts) {
            return SessionPhase::Closed;
        }
        let t = self.exchange_time(ts).time();
        if t >= self.premarket_open && t < self.regular_open {
            SessionPhase::Premarket
        } else if t >= self.regular_open && t < self.regular_close {
            SessionPhase::Regular
        } else if t >= self.regular_close && t < self.afterhours_close {
            SessionPhase::AfterHours
        } else {
            SessionPhase::Closed
        }
    }

    /// Weekday, inside the regular session, and at or past `cutoff` (exchange-local)
    pub fn is_past_cutoff(&self, ts: DateTime<Utc>, cutoff: NaiveTime) -> bool {
        self.phase(ts) == SessionPhase::Regular && self.exchange_time(ts).time() >= cutoff
    }

    /// Interpret an offset-less timestamp in the configured local zone.
    ///
    /// Times inside a DST gap are shifted forward one hour; ambiguous times
    /// resolve to the earlier instant.
    pub fn normalize_naive(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        localize(self.local_tz, naive)
    }

    /// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DD[T ]HH:MM:SS[.f]` one
    pub fn parse_timestamp(&self, raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
            return Some(aware.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| self.normalize_naive(naive))
    }
}

fn localize(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt.with_timezone(&Utc);
    }
    // nonexistent wall-clock time (spring-forward gap)
    tz.from_local_datetime(&(naive + Duration::hours(1)))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}
