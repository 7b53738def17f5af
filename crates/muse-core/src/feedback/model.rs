//! Feedback domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MuseError, Result};

/// Ratings at or below this count as a negative outcome.
pub const NEGATIVE_RATING_THRESHOLD: u8 = 2;

/// Optional 1..5 sub-scores of a rating.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarity: Option<u8>,
}

/// What the user did with an automatic persona switch.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwitchOutcome {
    Accepted,
    Rejected,
}

/// An explicit rating, or one inferred from a thumbs reaction.
///
/// Immutable once created. The `id` is what callers deduplicate on.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FeedbackRecord {
    pub id: String,
    /// 1..=5
    pub rating_value: u8,
    pub helpful: bool,
    #[serde(default)]
    pub scores: FeedbackScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub persona_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    /// Set when the rated turn followed an automatic persona switch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_outcome: Option<SwitchOutcome>,
    /// The admin's answer to the proactive question, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    /// Ledger id of the rated turn, as returned by turn planning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(
        id: impl Into<String>,
        persona_id: impl Into<String>,
        rating_value: u8,
        helpful: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            rating_value,
            helpful,
            scores: FeedbackScores::default(),
            comment: None,
            persona_id: persona_id.into(),
            question_id: None,
            switch_outcome: None,
            response_text: None,
            interaction_id: None,
            timestamp,
        }
    }

    /// Builds a record from a thumbs reaction (up = 5, down = 1).
    pub fn from_thumbs(
        id: impl Into<String>,
        persona_id: impl Into<String>,
        thumbs_up: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let rating = if thumbs_up { 5 } else { 1 };
        Self::new(id, persona_id, rating, thumbs_up, timestamp)
    }

    pub fn with_question(
        mut self,
        question_id: impl Into<String>,
        response_text: impl Into<String>,
    ) -> Self {
        self.question_id = Some(question_id.into());
        self.response_text = Some(response_text.into());
        self
    }

    pub fn for_interaction(mut self, interaction_id: impl Into<String>) -> Self {
        self.interaction_id = Some(interaction_id.into());
        self
    }

    pub fn with_switch_outcome(mut self, outcome: SwitchOutcome) -> Self {
        self.switch_outcome = Some(outcome);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating_value) {
            return Err(MuseError::validation(format!(
                "rating_value must be within 1..=5, got {}",
                self.rating_value
            )));
        }
        let subs = [
            ("accuracy", self.scores.accuracy),
            ("relevance", self.scores.relevance),
            ("clarity", self.scores.clarity),
        ];
        for (name, value) in subs {
            if let Some(v) = value.filter(|v| !(1..=5).contains(v)) {
                return Err(MuseError::validation(format!(
                    "{} must be within 1..=5, got {}",
                    name, v
                )));
            }
        }
        if self.persona_id.trim().is_empty() {
            return Err(MuseError::validation("persona_id is required"));
        }
        Ok(())
    }

    /// Rating mapped onto [0, 1]: `(rating - 1) / 4`.
    pub fn normalized_rating(&self) -> f64 {
        f64::from(self.rating_value.clamp(1, 5) - 1) / 4.0
    }

    pub fn is_negative(&self) -> bool {
        self.rating_value <= NEGATIVE_RATING_THRESHOLD || !self.helpful
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_rating() {
        let now = Utc::now();
        assert_eq!(FeedbackRecord::new("f", "p", 1, true, now).normalized_rating(), 0.0);
        assert_eq!(FeedbackRecord::new("f", "p", 3, true, now).normalized_rating(), 0.5);
        assert_eq!(FeedbackRecord::new("f", "p", 5, true, now).normalized_rating(), 1.0);
    }

    #[test]
    fn test_is_negative() {
        let now = Utc::now();
        assert!(FeedbackRecord::new("f", "p", 2, true, now).is_negative());
        assert!(FeedbackRecord::new("f", "p", 5, false, now).is_negative());
        assert!(!FeedbackRecord::new("f", "p", 3, true, now).is_negative());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let now = Utc::now();
        assert!(FeedbackRecord::new("f", "p", 0, true, now).validate().is_err());
        assert!(FeedbackRecord::new("f", "p", 6, true, now).validate().is_err());

        let mut record = FeedbackRecord::new("f", "p", 4, true, now);
        record.scores.clarity = Some(9);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_from_thumbs() {
        let down = FeedbackRecord::from_thumbs("f", "p", false, Utc::now());
        assert_eq!(down.rating_value, 1);
        assert!(down.is_negative());
    }

    #[test]
    fn test_interaction_id_is_optional_on_the_wire() {
        let json = r#"{"id":"f","rating_value":4,"helpful":true,"persona_id":"p","timestamp":"2026-01-01T00:00:00Z"}"#;
        let record: FeedbackRecord = serde_json::from_str(json).unwrap();
        assert!(record.interaction_id.is_none());

        let linked = record.for_interaction("turn-1");
        let json = serde_json::to_string(&linked).unwrap();
        assert!(json.contains("\"interaction_id\":\"turn-1\""));
    }
}
