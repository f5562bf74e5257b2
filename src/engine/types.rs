//! Engine report types

use chrono::{DateTime, Utc};

use crate::alert::AlertCandidate;
use crate::gate::GateDecision;
use crate::paper::{CompletedTrade, PaperPosition};
use crate::scoring::ScoreResult;

/// A scored candidate and what the gate made of it
#[derive(Debug, Clone)]
pub struct GatedAlert {
    pub candidate: AlertCandidate,
    pub score: ScoreResult,
    pub decision: GateDecision,
}

/// Outcome of one scan cycle
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub timestamp: Option<DateTime<Utc>>,
    /// Quotes left after the universe filter
    pub universe: usize,
    /// A new trading date began with this cycle
    pub session_started: bool,
    /// Raw classifier output, before deduplication
    pub candidates: usize,
    pub rule_errors: usize,
    /// Gated candidates in descending score order
    pub gated: Vec<GatedAlert>,
    /// Rendered messages for approved alerts, in dispatch order
    pub messages: Vec<String>,
    pub entries: Vec<PaperPosition>,
    pub exits: Vec<CompletedTrade>,
}

impl CycleReport {
    pub fn approved(&self) -> impl Iterator<Item = &GatedAlert> {
        self.gated.iter().filter(|g| g.decision.is_approved())
    }

    pub fn approved_symbols(&self) -> Vec<&str> {
        self.approved().map(|g| g.candidate.symbol.as_str()).collect()
    }
}
