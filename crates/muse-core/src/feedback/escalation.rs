//! Out-of-band "urgent review" signal for negative outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{FeedbackRecord, NEGATIVE_RATING_THRESHOLD};
use crate::error::Result;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    LowRating,
    NotHelpful,
    LowRatingAndNotHelpful,
}

/// Raised when feedback is negative. A notification, never a retry.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Escalation {
    pub feedback_id: String,
    pub persona_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    pub rating_value: u8,
    pub helpful: bool,
    pub reason: EscalationReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub raised_at: DateTime<Utc>,
}

impl Escalation {
    /// Returns an escalation when the record is a negative outcome.
    pub fn from_feedback(record: &FeedbackRecord, raised_at: DateTime<Utc>) -> Option<Self> {
        let low = record.rating_value <= NEGATIVE_RATING_THRESHOLD;
        let reason = match (low, record.helpful) {
            (true, false) => EscalationReason::LowRatingAndNotHelpful,
            (true, true) => EscalationReason::LowRating,
            (false, false) => EscalationReason::NotHelpful,
            (false, true) => return None,
        };
        Some(Self {
            feedback_id: record.id.clone(),
            persona_id: record.persona_id.clone(),
            question_id: record.question_id.clone(),
            rating_value: record.rating_value,
            helpful: record.helpful,
            reason,
            comment: record.comment.clone(),
            raised_at,
        })
    }
}

/// Receives escalations. Must not block the turn.
pub trait EscalationNotifier: Send + Sync {
    fn notify(&self, escalation: Escalation) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_feedback_is_not_escalated() {
        let now = Utc::now();
        let record = FeedbackRecord::new("f1", "p1", 4, true, now);
        assert!(Escalation::from_feedback(&record, now).is_none());
    }

    #[test]
    fn test_reason_combines_both_signals() {
        let now = Utc::now();
        let record = FeedbackRecord::new("f1", "p1", 1, false, now);
        let escalation = Escalation::from_feedback(&record, now).unwrap();
        assert_eq!(escalation.reason, EscalationReason::LowRatingAndNotHelpful);

        let record = FeedbackRecord::new("f2", "p1", 4, false, now);
        let escalation = Escalation::from_feedback(&record, now).unwrap();
        assert_eq!(escalation.reason, EscalationReason::NotHelpful);
    }
}
