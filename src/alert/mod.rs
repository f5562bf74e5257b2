//! Alert candidates and the rule-based classifier

mod classifier;
mod types;

pub use classifier::{AlertClassifier, Classification};
pub use types::{AlertCandidate, AlertMetrics, AlertPayload, AlertType, RuleError};
