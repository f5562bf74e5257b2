//! Configuration types for momentum-scout

use chrono::NaiveTime;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scoring::ScoreTables;

/// Fatal configuration problems detected at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub source: SourceConfig,
    pub flat: FlatConfig,
    pub classifier: ClassifierConfig,
    pub scoring: ScoreTables,
    pub gate: GateConfig,
    pub paper: PaperConfig,
    pub session: SessionConfig,
    pub persistence: PersistenceConfig,
    pub dispatch: DispatchConfig,
    pub telemetry: TelemetryConfig,
}

/// Scan loop and universe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Seconds between poll cycles
    pub poll_interval_secs: u64,
    /// Maximum quotes requested per snapshot
    pub snapshot_limit: usize,
    /// Quotes at or above this price are ignored
    pub max_price: Decimal,
    /// Exchanges whose listings are ignored (case-insensitive)
    pub excluded_exchanges: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 120,
            snapshot_limit: 200,
            max_price: dec!(20),
            excluded_exchanges: vec!["OTC".to_string()],
        }
    }
}

/// Where snapshots come from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Http,
    Replay,
}

/// Snapshot source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Endpoint returning a JSON array of quotes (http source)
    pub url: Option<String>,
    /// Directory of recorded snapshot files (replay source)
    pub replay_dir: Option<PathBuf>,
    pub timeout_secs: u64,
    /// Read-through cache TTL for fetched snapshots; 0 disables caching
    pub cache_ttl_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Http,
            url: None,
            replay_dir: None,
            timeout_secs: 10,
            cache_ttl_secs: 60,
        }
    }
}

/// Thresholds for one flat-period window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatWindowConfig {
    /// Trailing retention of the window in minutes
    pub window_minutes: u64,
    /// Max (high - low) / avg, in percent, for the window to count as flat
    pub volatility_threshold_pct: Decimal,
    /// Minimum first-to-last span in minutes
    pub min_duration_minutes: u64,
    /// Minimum samples before a verdict is possible
    pub min_samples: usize,
}

/// Flat detection windows: intraday and after-hours are tuned separately
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatConfig {
    pub intraday: FlatWindowConfig,
    pub afterhours: FlatWindowConfig,
}

impl Default for FlatConfig {
    fn default() -> Self {
        Self {
            intraday: FlatWindowConfig {
                window_minutes: 30,
                volatility_threshold_pct: dec!(2.5),
                min_duration_minutes: 6,
                min_samples: 3,
            },
            afterhours: FlatWindowConfig {
                // Long enough to carry the previous evening into the next premarket
                window_minutes: 16 * 60,
                volatility_threshold_pct: dec!(3.0),
                min_duration_minutes: 15,
                min_samples: 3,
            },
        }
    }
}

/// Alert rule thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Rank positions a symbol must climb (strictly more than)
    pub climber_min_rank_change: usize,
    /// Size of the ranked set considered for newcomers
    pub newcomer_top_n: usize,
    /// Trailing window for windowed spike detection
    pub spike_window_minutes: u64,
    /// Windowed price change (percent) that counts as a spike
    pub spike_window_change_pct: Decimal,
    /// Instantaneous change_pct that counts as a spike
    pub spike_instant_change_pct: Decimal,
    /// Premarket change must exceed this for acceleration alerts
    pub premarket_min_change_pct: Decimal,
    /// Premarket change increase (points) versus previous snapshot
    pub premarket_acceleration_delta: Decimal,
    /// Premarket change for a symbol new to the snapshot
    pub new_premarket_move_pct: Decimal,
    /// Premarket jump that, after a flat after-hours session, reclassifies the alert
    pub afterhours_spike_pct: Decimal,
    /// Premarket volume increase (percent) versus previous snapshot
    pub premarket_volume_surge_pct: Decimal,
    /// Change from previous close for sustained positive alerts
    pub sustained_change_pct: Decimal,
    /// First snapshot only: premarket change for a new premarket move
    pub first_scan_premarket_change_pct: Decimal,
    /// First snapshot only: premarket volume for a volume surge
    pub first_scan_premarket_volume: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            climber_min_rank_change: 5,
            newcomer_top_n: 50,
            spike_window_minutes: 10,
            spike_window_change_pct: dec!(10),
            spike_instant_change_pct: dec!(10),
            premarket_min_change_pct: dec!(0),
            premarket_acceleration_delta: dec!(3),
            new_premarket_move_pct: dec!(3),
            afterhours_spike_pct: dec!(10),
            premarket_volume_surge_pct: dec!(50),
            sustained_change_pct: dec!(10),
            first_scan_premarket_change_pct: dec!(5),
            first_scan_premarket_volume: 100_000,
        }
    }
}

/// Cooldown durations per performer tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub high_performer_secs: u64,
    pub regular_secs: u64,
    pub poor_performer_secs: u64,
    /// Average change_pct at or above which a ticker is a high performer
    pub high_performer_avg_change: Decimal,
    /// Average change_pct at or above which a ticker is a regular performer
    pub regular_avg_change: Decimal,
    /// Alerts needed before the average is trusted
    pub min_history: usize,
    /// Dispatched alert changes remembered per ticker
    pub history_len: usize,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            high_performer_secs: 5 * 60,
            regular_secs: 10 * 60,
            poor_performer_secs: 20 * 60,
            high_performer_avg_change: dec!(20),
            regular_avg_change: dec!(5),
            min_history: 3,
            history_len: 10,
        }
    }
}

/// Per-sector threshold multipliers and concentration cap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectorRule {
    pub relative_volume_multiplier: Decimal,
    pub price_change_multiplier: Decimal,
    /// Max share of recent alerts one ticker may hold
    #[serde(default)]
    pub max_ticker_concentration: Option<Decimal>,
}

impl Default for SectorRule {
    fn default() -> Self {
        Self {
            relative_volume_multiplier: dec!(1.0),
            price_change_multiplier: dec!(1.0),
            max_ticker_concentration: None,
        }
    }
}

/// Notification gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Scores strictly above this skip every other check
    pub priority_bypass_score: i32,
    pub cooldown: CooldownConfig,
    /// Relative volume threshold before sector adjustment
    pub base_relative_volume: Decimal,
    /// Price change threshold (percent) before sector adjustment
    pub base_price_change: Decimal,
    /// Rolling period for concentration limits
    pub concentration_window_minutes: u64,
    /// Sector name -> rule; unknown sectors use `SectorRule::default()`
    pub sectors: BTreeMap<String, SectorRule>,
}

impl Default for GateConfig {
    fn default() -> Self {
        let rule = |rv: Decimal, pc: Decimal, cap: Option<Decimal>| SectorRule {
            relative_volume_multiplier: rv,
            price_change_multiplier: pc,
            max_ticker_concentration: cap,
        };
        let mut sectors = BTreeMap::new();
        sectors.insert("Finance".to_string(), rule(dec!(1.5), dec!(1.0), None));
        sectors.insert(
            "Health Technology".to_string(),
            rule(dec!(1.5), dec!(1.0), None),
        );
        sectors.insert(
            "Technology Services".to_string(),
            rule(dec!(0.9), dec!(0.9), None),
        );
        sectors.insert(
            "Electronic Technology".to_string(),
            rule(dec!(0.8), dec!(0.8), None),
        );
        sectors.insert(
            "Utilities".to_string(),
            rule(dec!(1.0), dec!(1.0), Some(dec!(0.3))),
        );

        Self {
            priority_bypass_score: 110,
            cooldown: CooldownConfig::default(),
            base_relative_volume: dec!(3.0),
            base_price_change: dec!(10.0),
            concentration_window_minutes: 60,
            sectors,
        }
    }
}

impl GateConfig {
    /// Rule for a sector, falling back to neutral multipliers
    pub fn sector_rule(&self, sector: Option<&str>) -> SectorRule {
        sector
            .and_then(|s| self.sectors.get(s))
            .cloned()
            .unwrap_or_default()
    }
}

/// Which alerts may open paper positions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryTrigger {
    /// Only alerts approved by the notification gate
    #[default]
    Approved,
    /// Every raw candidate from the classifier
    All,
}

/// Paper trading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperConfig {
    pub enabled: bool,
    pub initial_balance: Decimal,
    /// Fixed notional per trade
    pub notional: Decimal,
    /// Share of the initial balance that may be deployed at once
    pub max_exposure_pct: Decimal,
    pub entry_on: EntryTrigger,
    pub ema_fast: usize,
    pub ema_slow: usize,
    /// Trailing retention of the paper price window
    pub window_minutes: u64,
    pub max_samples: usize,
    /// Exchange-local time at which open positions are liquidated
    #[serde(with = "time_of_day")]
    pub eod_cutoff: NaiveTime,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_balance: dec!(10000),
            notional: dec!(100),
            max_exposure_pct: dec!(0.8),
            entry_on: EntryTrigger::Approved,
            ema_fast: 9,
            ema_slow: 25,
            window_minutes: 120,
            max_samples: 100,
            eod_cutoff: hm(15, 45),
        }
    }
}

/// Exchange session calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Zone in which session boundaries are defined
    pub exchange_timezone: Tz,
    /// Zone assumed for timestamps that carry no offset
    pub local_timezone: Tz,
    #[serde(with = "time_of_day")]
    pub premarket_open: NaiveTime,
    #[serde(with = "time_of_day")]
    pub regular_open: NaiveTime,
    #[serde(with = "time_of_day")]
    pub regular_close: NaiveTime,
    #[serde(with = "time_of_day")]
    pub afterhours_close: NaiveTime,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exchange_timezone: chrono_tz::America::New_York,
            local_timezone: chrono_tz::America::New_York,
            premarket_open: hm(4, 0),
            regular_open: hm(9, 30),
            regular_close: hm(16, 0),
            afterhours_close: hm(20, 0),
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub data_dir: PathBuf,
    pub state_file: String,
    pub journal_file: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./scout_data"),
            state_file: "state.json".to_string(),
            journal_file: "alerts.jsonl".to_string(),
        }
    }
}

impl PersistenceConfig {
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(&self.state_file)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join(&self.journal_file)
    }
}

/// Dispatch channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// POST target for alert messages; logs only when unset
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
    pub queue_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: 10,
            queue_capacity: 256,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    /// Prometheus scrape port; no exporter when unset
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// `HH:MM` or `HH:MM:SS` time-of-day fields
mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .map_err(|e| serde::de::Error::custom(format!("invalid time of day {raw:?}: {e}")))
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scanner.poll_interval_secs == 0 {
            return Err(ConfigError::invalid("scanner.poll_interval_secs", "must be > 0"));
        }
        if self.scanner.snapshot_limit == 0 {
            return Err(ConfigError::invalid("scanner.snapshot_limit", "must be > 0"));
        }
        if self.scanner.max_price <= Decimal::ZERO {
            return Err(ConfigError::invalid("scanner.max_price", "must be > 0"));
        }

        for (field, window) in [
            ("flat.intraday", &self.flat.intraday),
            ("flat.afterhours", &self.flat.afterhours),
        ] {
            if window.window_minutes == 0 {
                return Err(ConfigError::invalid(field, "window_minutes must be > 0"));
            }
            if window.volatility_threshold_pct < Decimal::ZERO {
                return Err(ConfigError::invalid(field, "volatility threshold is negative"));
            }
            if window.min_duration_minutes > window.window_minutes {
                return Err(ConfigError::invalid(
                    field,
                    "min_duration_minutes exceeds window_minutes",
                ));
            }
            if window.min_samples < 2 {
                return Err(ConfigError::invalid(field, "min_samples must be >= 2"));
            }
        }

        let c = &self.classifier;
        if c.spike_window_minutes == 0 {
            return Err(ConfigError::invalid("classifier.spike_window_minutes", "must be > 0"));
        }
        if c.newcomer_top_n == 0 {
            return Err(ConfigError::invalid("classifier.newcomer_top_n", "must be > 0"));
        }
        for (field, value) in [
            ("classifier.spike_window_change_pct", c.spike_window_change_pct),
            ("classifier.spike_instant_change_pct", c.spike_instant_change_pct),
            ("classifier.premarket_min_change_pct", c.premarket_min_change_pct),
            ("classifier.premarket_acceleration_delta", c.premarket_acceleration_delta),
            ("classifier.new_premarket_move_pct", c.new_premarket_move_pct),
            ("classifier.afterhours_spike_pct", c.afterhours_spike_pct),
            ("classifier.premarket_volume_surge_pct", c.premarket_volume_surge_pct),
            ("classifier.sustained_change_pct", c.sustained_change_pct),
            ("classifier.first_scan_premarket_change_pct", c.first_scan_premarket_change_pct),
        ] {
            if value < Decimal::ZERO {
                return Err(ConfigError::invalid(field, "must not be negative"));
            }
        }

        self.scoring
            .validate()
            .map_err(|reason| ConfigError::invalid("scoring", reason))?;

        let cd = &self.gate.cooldown;
        if cd.high_performer_secs == 0 || cd.regular_secs == 0 || cd.poor_performer_secs == 0 {
            return Err(ConfigError::invalid("gate.cooldown", "durations must be > 0"));
        }
        if cd.high_performer_avg_change < cd.regular_avg_change {
            return Err(ConfigError::invalid(
                "gate.cooldown",
                "high_performer_avg_change below regular_avg_change",
            ));
        }
        if cd.history_len == 0 {
            return Err(ConfigError::invalid("gate.cooldown.history_len", "must be > 0"));
        }
        if self.gate.concentration_window_minutes == 0 {
            return Err(ConfigError::invalid(
                "gate.concentration_window_minutes",
                "must be > 0",
            ));
        }
        for (sector, rule) in &self.gate.sectors {
            if rule.relative_volume_multiplier <= Decimal::ZERO
                || rule.price_change_multiplier <= Decimal::ZERO
            {
                return Err(ConfigError::invalid(
                    "gate.sectors",
                    format!("{sector}: multipliers must be > 0"),
                ));
            }
            if let Some(cap) = rule.max_ticker_concentration {
                if cap <= Decimal::ZERO || cap > Decimal::ONE {
                    return Err(ConfigError::invalid(
                        "gate.sectors",
                        format!("{sector}: concentration cap must be in (0, 1]"),
                    ));
                }
            }
        }

        let p = &self.paper;
        if p.notional <= Decimal::ZERO {
            return Err(ConfigError::invalid("paper.notional", "must be > 0"));
        }
        if p.initial_balance < Decimal::ZERO {
            return Err(ConfigError::invalid("paper.initial_balance", "must not be negative"));
        }
        if p.max_exposure_pct <= Decimal::ZERO || p.max_exposure_pct > Decimal::ONE {
            return Err(ConfigError::invalid("paper.max_exposure_pct", "must be in (0, 1]"));
        }
        if p.ema_fast == 0 || p.ema_slow < p.ema_fast {
            return Err(ConfigError::invalid("paper.ema_fast", "need 0 < ema_fast <= ema_slow"));
        }
        if p.max_samples < p.ema_slow {
            return Err(ConfigError::invalid("paper.max_samples", "must hold ema_slow samples"));
        }

        let s = &self.session;
        if !(s.premarket_open < s.regular_open
            && s.regular_open < s.regular_close
            && s.regular_close <= s.afterhours_close)
        {
            return Err(ConfigError::invalid("session", "session boundaries out of order"));
        }
        if p.eod_cutoff < s.regular_open || p.eod_cutoff > s.regular_close {
            return Err(ConfigError::invalid(
                "paper.eod_cutoff",
                "must fall inside the regular session",
            ));
        }

        if self.dispatch.queue_capacity == 0 {
            return Err(ConfigError::invalid("dispatch.queue_capacity", "must be > 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.scanner.poll_interval_secs, 120);
        assert_eq!(config.flat.intraday.volatility_threshold_pct, dec!(2.5));
        assert_eq!(config.paper.eod_cutoff, hm(15, 45));
        assert_eq!(config.session.exchange_timezone, chrono_tz::America::New_York);
    }

    #[test]
    fn test_bundled_example_matches_defaults() {
        let config = Config::from_toml(include_str!("../config.toml.example")).unwrap();
        let defaults = Config::default();
        assert_eq!(config.flat.intraday, defaults.flat.intraday);
        assert_eq!(config.flat.afterhours, defaults.flat.afterhours);
        assert_eq!(config.gate.sectors, defaults.gate.sectors);
        assert_eq!(config.scoring, defaults.scoring);
        assert_eq!(config.paper.eod_cutoff, defaults.paper.eod_cutoff);
        assert_eq!(config.source.kind, SourceKind::Http);
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [scanner]
            poll_interval_secs = 60
            max_price = 15.0

            [flat.intraday]
            window_minutes = 20
            volatility_threshold_pct = 3.0
            min_duration_minutes = 8
            min_samples = 3

            [gate]
            priority_bypass_score = 95

            [gate.sectors.Utilities]
            relative_volume_multiplier = 1.0
            price_change_multiplier = 1.0
            max_ticker_concentration = 0.25

            [paper]
            notional = 250
            eod_cutoff = "15:30"
            entry_on = "all"

            [session]
            local_timezone = "Asia/Kuala_Lumpur"

            [telemetry]
            log_level = "debug"
            log_format = "json"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.scanner.poll_interval_secs, 60);
        assert_eq!(config.scanner.max_price, dec!(15));
        assert_eq!(config.flat.intraday.min_duration_minutes, 8);
        // untouched section keeps its defaults
        assert_eq!(config.flat.afterhours.volatility_threshold_pct, dec!(3.0));
        assert_eq!(config.gate.priority_bypass_score, 95);
        assert_eq!(
            config.gate.sector_rule(Some("Utilities")).max_ticker_concentration,
            Some(dec!(0.25))
        );
        assert_eq!(config.paper.notional, dec!(250));
        assert_eq!(config.paper.eod_cutoff, hm(15, 30));
        assert_eq!(config.paper.entry_on, EntryTrigger::All);
        assert_eq!(config.session.local_timezone, chrono_tz::Asia::Kuala_Lumpur);
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_sector_gets_neutral_rule() {
        let gate = GateConfig::default();
        let rule = gate.sector_rule(Some("Miscellaneous"));
        assert_eq!(rule.relative_volume_multiplier, dec!(1.0));
        assert!(rule.max_ticker_concentration.is_none());
        assert_eq!(gate.sector_rule(None), SectorRule::default());
    }

    #[test]
    fn test_invalid_eod_cutoff_rejected() {
        let err = Config::from_toml("[paper]\neod_cutoff = \"17:00\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "paper.eod_cutoff", .. }));
    }

    #[test]
    fn test_unparsable_time_rejected() {
        let err = Config::from_toml("[paper]\neod_cutoff = \"quarter to four\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let err = Config::from_toml("[scanner]\npoll_interval_secs = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "scanner.poll_interval_secs", .. }
        ));
    }

    #[test]
    fn test_concentration_cap_out_of_range_rejected() {
        let toml = r#"
            [gate.sectors.Utilities]
            relative_volume_multiplier = 1.0
            price_change_multiplier = 1.0
            max_ticker_concentration = 1.5
        "#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn test_flat_duration_longer_than_window_rejected() {
        let toml = r#"
            [flat.intraday]
            window_minutes = 5
            volatility_threshold_pct = 2.5
            min_duration_minutes = 6
            min_samples = 3
        "#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_persistence_paths() {
        let cfg = PersistenceConfig::default();
        assert!(cfg.state_path().ends_with("state.json"));
        assert!(cfg.journal_path().ends_with("alerts.jsonl"));
    }
}
