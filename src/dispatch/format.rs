//! Alert message rendering

use rust_decimal::Decimal;
use std::fmt;

use crate::alert::{AlertCandidate, AlertPayload};
use crate::scoring::ScoreResult;

/// Everything shown in one dispatched alert
#[derive(Debug, Clone)]
pub struct AlertMessage<'a> {
    pub candidate: &'a AlertCandidate,
    pub score: &'a ScoreResult,
    /// Counts including this alert
    pub lifetime_alert_count: u64,
    pub session_alert_count: u64,
    /// Outcome of the paper trade attempt, if one was made
    pub paper_note: Option<String>,
}

/// Target shown with every alert, in percent above the alert price
pub const TARGET_PCT: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

impl AlertMessage<'_> {
    pub fn target_price(&self) -> Decimal {
        self.candidate.metrics.price * (Decimal::ONE + TARGET_PCT / Decimal::ONE_HUNDRED)
    }
}

impl fmt::Display for AlertMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.candidate;
        let m = &c.metrics;
        let s = self.score;

        writeln!(f, "MOMENTUM ALERT: {} ({})", c.symbol, c.alert_type())?;
        writeln!(f, "Price: ${} ({}%)", m.price.round_dp(2), signed(m.change_pct.round_dp(1)))?;
        writeln!(
            f,
            "Volume: {} | Relative volume: {}",
            group_thousands(m.volume),
            m.relative_volume
                .map_or_else(|| "N/A".to_string(), |rv| format!("{}x", rv.round_dp(1)))
        )?;
        writeln!(
            f,
            "Float: {} | Sector: {}",
            m.float_shares.map_or_else(|| "N/A".to_string(), group_thousands),
            m.sector.as_deref().unwrap_or("Unknown")
        )?;
        if let Some(detail) = payload_detail(&c.payload) {
            writeln!(f, "{detail}")?;
        }
        writeln!(
            f,
            "Score: {} | Win probability: {} ({}%)",
            s.score, s.probability_category, s.estimated_probability_pct
        )?;
        if s.flags.is_empty() {
            writeln!(f, "Flags: standard alert")?;
        } else {
            writeln!(f, "Flags: {}", s.flags.join(", "))?;
        }
        writeln!(
            f,
            "Stop: {}% (${}) | Target: {}% (${})",
            s.stop_loss.percentage.round_dp(1),
            s.stop_loss.stop_price.round_dp(2),
            TARGET_PCT.round_dp(1),
            self.target_price().round_dp(2)
        )?;
        write!(
            f,
            "Alerts: {} lifetime, {} this session",
            self.lifetime_alert_count, self.session_alert_count
        )?;
        if let Some(note) = &self.paper_note {
            write!(f, "\nPaper trade: {note}")?;
        }
        Ok(())
    }
}

fn payload_detail(payload: &AlertPayload) -> Option<String> {
    let line = match payload {
        AlertPayload::VolumeClimber {
            previous_rank,
            current_rank,
        } => format!("Volume rank #{previous_rank} -> #{current_rank}"),
        AlertPayload::VolumeNewcomer { current_rank } => {
            format!("New to the volume leaders at #{current_rank}")
        }
        AlertPayload::PriceSpike {
            window_change_pct: Some(w),
            window_minutes,
        } => format!("{}% in {window_minutes} min", signed(w.round_dp(1))),
        AlertPayload::PriceSpike { .. } => return None,
        AlertPayload::FlatToSpike { flat, .. } => format!(
            "Flat {} min (range {}%) before the spike",
            flat.duration_minutes(),
            flat.volatility_pct.round_dp(2)
        ),
        AlertPayload::PremarketAcceleration {
            premarket_change,
            previous_premarket_change,
            ..
        } => format!(
            "Premarket {}% -> {}%",
            signed(previous_premarket_change.round_dp(1)),
            signed(premarket_change.round_dp(1))
        ),
        AlertPayload::NewPremarketMove { premarket_change } => {
            format!("Premarket move {}%", signed(premarket_change.round_dp(1)))
        }
        AlertPayload::PremarketVolumeSurge {
            premarket_volume,
            volume_change_pct,
            ..
        } => match volume_change_pct {
            Some(pct) => format!(
                "Premarket volume {} ({}%)",
                group_thousands(*premarket_volume),
                signed(pct.round_dp(1))
            ),
            None => format!("Premarket volume {}", group_thousands(*premarket_volume)),
        },
        AlertPayload::AfterhoursFlatToPremarketSpike {
            afterhours,
            spike_from_afterhours_pct,
            ..
        } => format!(
            "Flat after hours for {} min, {}% since",
            afterhours.duration_minutes(),
            signed(spike_from_afterhours_pct.round_dp(1))
        ),
        AlertPayload::SustainedPositive {
            change_from_prev_close,
        } => format!(
            "{}% from previous close",
            signed(change_from_prev_close.round_dp(1))
        ),
    };
    Some(line)
}

fn signed(value: Decimal) -> String {
    if value.is_sign_negative() {
        value.to_string()
    } else {
        format!("+{value}")
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertMetrics;
    use crate::scoring::MomentumScorer;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn candidate() -> AlertCandidate {
        AlertCandidate {
            symbol: "ABCD".into(),
            timestamp: Utc::now(),
            metrics: AlertMetrics {
                price: dec!(2.00),
                change_pct: dec!(18.44),
                volume: 1_234_567,
                relative_volume: Some(dec!(12)),
                change_from_open: None,
                sector: Some("Finance".into()),
                float_shares: None,
            },
            payload: AlertPayload::VolumeClimber {
                previous_rank: 30,
                current_rank: 12,
            },
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_message_contents() {
        let c = candidate();
        let score = MomentumScorer::default().score(&c);
        let message = AlertMessage {
            candidate: &c,
            score: &score,
            lifetime_alert_count: 3,
            session_alert_count: 1,
            paper_note: Some("BOUGHT at $2.0000".into()),
        };
        assert_eq!(message.target_price(), dec!(2.6));

        let text = message.to_string();
        assert!(text.starts_with("MOMENTUM ALERT: ABCD (volume_climber)"));
        assert!(text.contains("Price: $2.00 (+18.4%)"));
        assert!(text.contains("Volume: 1,234,567 | Relative volume: 12x"));
        assert!(text.contains("Float: N/A | Sector: Finance"));
        assert!(text.contains("Volume rank #30 -> #12"));
        assert!(text.contains("Target: 30% ($2.60)"));
        assert!(text.contains("Alerts: 3 lifetime, 1 this session"));
        assert!(text.ends_with("Paper trade: BOUGHT at $2.0000"));
    }

    #[test]
    fn test_signed() {
        assert_eq!(signed(dec!(4.2)), "+4.2");
        assert_eq!(signed(dec!(-4.2)), "-4.2");
    }
}
