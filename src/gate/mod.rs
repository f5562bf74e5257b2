//! Notification gate
//!
//! Decides per scored candidate whether it is dispatched now, suppressed
//! (mute, cooldown, sector thresholds, concentration), or force-dispatched
//! on a priority score. Approval updates the ticker's counters.

mod notification;
mod types;

pub use notification::NotificationGate;
pub use types::{ApprovalPath, GateDecision, PerformerTier, RejectReason};
