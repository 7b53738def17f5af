//! Feedback-driven recalibration of persona and question ranking signals.
//!
//! This module holds the math only. Reading and writing the catalogs, and
//! raising escalations, happens in `muse_application::PersonaEngine`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::QualityHeuristics;
use crate::feedback::{FeedbackRecord, SwitchOutcome};
use crate::heuristics::{ResponseQualityScorer, ResponseScorer};
use crate::persona::{PersonaDefinition, PersonaMetadata};

/// What a feedback record changed on a persona.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaAdjustment {
    pub persona_id: String,
    pub satisfaction_before: f64,
    pub satisfaction_after: f64,
    /// Set when the record carried a switch outcome
    pub switch_success_rate_after: Option<f64>,
}

/// Folds a normalized rating into the running satisfaction average.
pub fn fold_rating(meta: &mut PersonaMetadata, normalized: f64, now: DateTime<Utc>) {
    let n = meta.rating_count as f64;
    let value = normalized.clamp(0.0, 1.0);
    meta.satisfaction = ((meta.satisfaction * n + value) / (n + 1.0)).clamp(0.0, 1.0);
    meta.rating_count += 1;
    meta.updated_at = now;
}

/// Counts an accepted or rejected switch and recomputes the success rate.
pub fn fold_switch_outcome(meta: &mut PersonaMetadata, outcome: SwitchOutcome, now: DateTime<Utc>) {
    meta.switch_attempts += 1;
    if outcome == SwitchOutcome::Accepted {
        meta.switch_accepts += 1;
    }
    meta.switch_success_rate = meta.switch_accepts as f64 / meta.switch_attempts as f64;
    meta.updated_at = now;
}

/// Applies feedback to ranking signals.
pub struct Recalibrator {
    scorer: Box<dyn ResponseScorer>,
}

impl Recalibrator {
    pub fn new(quality: QualityHeuristics) -> Self {
        Self {
            scorer: Box::new(ResponseQualityScorer::new(quality)),
        }
    }

    pub fn with_scorer(scorer: Box<dyn ResponseScorer>) -> Self {
        Self { scorer }
    }

    /// Updates satisfaction and, for switch events, the switch success rate.
    pub fn recalibrate_persona(
        &self,
        persona: &mut PersonaDefinition,
        record: &FeedbackRecord,
        now: DateTime<Utc>,
    ) -> PersonaAdjustment {
        let satisfaction_before = persona.metadata.satisfaction;
        fold_rating(&mut persona.metadata, record.normalized_rating(), now);

        let switch_success_rate_after = record.switch_outcome.map(|outcome| {
            fold_switch_outcome(&mut persona.metadata, outcome, now);
            persona.metadata.switch_success_rate
        });

        PersonaAdjustment {
            persona_id: persona.id.clone(),
            satisfaction_before,
            satisfaction_after: persona.metadata.satisfaction,
            switch_success_rate_after,
        }
    }

    /// Quality score of the admin's answer, when the record refers to a
    /// question and carries the answer text.
    pub fn question_success_rate(&self, record: &FeedbackRecord) -> Option<f64> {
        record.question_id.as_ref()?;
        record
            .response_text
            .as_deref()
            .map(|text| self.scorer.score(text))
    }
}

impl Default for Recalibrator {
    fn default() -> Self {
        Self::new(QualityHeuristics::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::{CommunicationStyle, PersonaKind};

    fn persona(satisfaction: f64, rating_count: u64) -> PersonaDefinition {
        let mut metadata = PersonaMetadata::new(1, Utc::now());
        metadata.satisfaction = satisfaction;
        metadata.rating_count = rating_count;
        PersonaDefinition {
            id: "p1".to_string(),
            display_identifier: PersonaKind::MomentRyan,
            name: "Ryan".to_string(),
            expertise_keywords: Default::default(),
            communication_style: CommunicationStyle::default(),
            metadata,
            real_person_info: None,
        }
    }

    #[test]
    fn test_first_rating_sets_satisfaction() {
        let mut p = persona(0.0, 0);
        let record = FeedbackRecord::new("f1", "p1", 4, true, Utc::now());
        let adjustment = Recalibrator::default().recalibrate_persona(&mut p, &record, Utc::now());
        assert_eq!(adjustment.satisfaction_after, 0.75);
        assert_eq!(p.metadata.rating_count, 1);
    }

    #[test]
    fn test_low_rating_moves_satisfaction_down() {
        let mut p = persona(0.8, 4);
        let record = FeedbackRecord::new("f1", "p1", 1, false, Utc::now());
        let adjustment = Recalibrator::default().recalibrate_persona(&mut p, &record, Utc::now());
        assert!(adjustment.satisfaction_after < adjustment.satisfaction_before);
        assert!((p.metadata.satisfaction - 0.64).abs() < 1e-9);
    }

    #[test]
    fn test_switch_outcomes_update_rate() {
        let now = Utc::now();
        let mut p = persona(0.5, 0);
        let recalibrator = Recalibrator::default();

        let accepted = FeedbackRecord::new("f1", "p1", 5, true, now).with_switch_outcome(SwitchOutcome::Accepted);
        let rejected = FeedbackRecord::new("f2", "p1", 3, true, now).with_switch_outcome(SwitchOutcome::Rejected);
        recalibrator.recalibrate_persona(&mut p, &accepted, now);
        let adjustment = recalibrator.recalibrate_persona(&mut p, &rejected, now);

        assert_eq!(adjustment.switch_success_rate_after, Some(0.5));
        assert_eq!(p.metadata.switch_attempts, 2);
    }

    #[test]
    fn test_plain_rating_leaves_switch_rate_alone() {
        let mut p = persona(0.5, 1);
        p.metadata.switch_success_rate = 0.7;
        let record = FeedbackRecord::new("f1", "p1", 5, true, Utc::now());
        let adjustment = Recalibrator::default().recalibrate_persona(&mut p, &record, Utc::now());
        assert!(adjustment.switch_success_rate_after.is_none());
        assert_eq!(p.metadata.switch_success_rate, 0.7);
    }

    #[test]
    fn test_question_success_rate_requires_question_and_text() {
        let now = Utc::now();
        let recalibrator = Recalibrator::default();
        let plain = FeedbackRecord::new("f1", "p1", 5, true, now);
        assert!(recalibrator.question_success_rate(&plain).is_none());

        let answered = plain.with_question(
            "q1",
            "For example, I always start with the customer interview before the brand strategy.",
        );
        let rate = recalibrator.question_success_rate(&answered).unwrap();
        assert!(rate > 0.0 && rate <= 1.0);
    }
}
