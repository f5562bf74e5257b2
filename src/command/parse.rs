//! Text command parsing for interactive listeners

use super::types::CommandError;

/// Default row count for `/stats`
pub const DEFAULT_STATS_ROWS: usize = 10;

/// A parsed text command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextCommand {
    Mute(String),
    ListMuted,
    Stats(usize),
    Reset,
    Help,
}

impl TextCommand {
    /// Parse `/disregard SYMBOL`, `/list_disregarded`, `/stats [n]`, `/reset` or `/help`
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(CommandError::Usage("/help"));
        };
        let arg = parts.next();

        match head.trim_start_matches('/').to_ascii_lowercase().as_str() {
            "disregard" | "mute" => match arg {
                Some(symbol) => Ok(TextCommand::Mute(symbol.to_ascii_uppercase())),
                None => Err(CommandError::Usage("/disregard SYMBOL")),
            },
            "list_disregarded" | "muted" => Ok(TextCommand::ListMuted),
            "stats" => match arg {
                None => Ok(TextCommand::Stats(DEFAULT_STATS_ROWS)),
                Some(n) => n
                    .parse()
                    .map(TextCommand::Stats)
                    .map_err(|_| CommandError::Usage("/stats [n]")),
            },
            "reset" => Ok(TextCommand::Reset),
            "help" | "start" => Ok(TextCommand::Help),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    pub fn help() -> &'static str {
        "/disregard SYMBOL  mute alerts for SYMBOL this session\n\
         /list_disregarded  list muted symbols\n\
         /stats [n]         top tickers by alert count and paper summary\n\
         /reset             clear counters, cooldowns and mutes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(TextCommand::parse("/disregard abcd"), Ok(TextCommand::Mute("ABCD".into())));
        assert_eq!(TextCommand::parse("mute XYZ extra"), Ok(TextCommand::Mute("XYZ".into())));
        assert_eq!(TextCommand::parse("/list_disregarded"), Ok(TextCommand::ListMuted));
        assert_eq!(TextCommand::parse("/stats"), Ok(TextCommand::Stats(10)));
        assert_eq!(TextCommand::parse("/stats 3"), Ok(TextCommand::Stats(3)));
        assert_eq!(TextCommand::parse("/RESET"), Ok(TextCommand::Reset));
        assert_eq!(TextCommand::parse("/help"), Ok(TextCommand::Help));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            TextCommand::parse("/disregard"),
            Err(CommandError::Usage("/disregard SYMBOL"))
        );
        assert!(matches!(TextCommand::parse("/stats many"), Err(CommandError::Usage(_))));
        assert_eq!(
            TextCommand::parse("/buy ABCD"),
            Err(CommandError::Unknown("buy".into()))
        );
        assert!(TextCommand::parse("   ").is_err());
    }
}
