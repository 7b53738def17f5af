//! Feedback domain module.
//!
//! - `model`: `FeedbackRecord` and its sub-scores
//! - `escalation`: negative-outcome signal and the notifier trait

mod escalation;
mod model;

pub use escalation::{Escalation, EscalationNotifier, EscalationReason};
pub use model::{FeedbackRecord, FeedbackScores, NEGATIVE_RATING_THRESHOLD, SwitchOutcome};
