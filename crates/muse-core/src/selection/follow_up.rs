//! Context-aware follow-up once the admin's answer is observed.

use crate::heuristics::{MarkerClassifier, TextClassifier, count_markers};
use crate::question::ProactiveQuestionTemplate;

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Picks a follow-up from the template's list based on what the answer contained.
pub struct FollowUpGenerator {
    has_example: Box<dyn TextClassifier>,
    has_personal_experience: Box<dyn TextClassifier>,
    detail_cues: Vec<String>,
    experience_cues: Vec<String>,
}

impl Default for FollowUpGenerator {
    fn default() -> Self {
        Self {
            has_example: Box::new(MarkerClassifier::example_markers()),
            has_personal_experience: Box::new(MarkerClassifier::personal_experience_markers()),
            detail_cues: owned(&["how", "specifically", "구체적", "어떻게"]),
            experience_cues: owned(&["experience", "actual", "경험", "실제"]),
        }
    }
}

impl FollowUpGenerator {
    pub fn with_classifiers(
        has_example: Box<dyn TextClassifier>,
        has_personal_experience: Box<dyn TextClassifier>,
    ) -> Self {
        Self {
            has_example,
            has_personal_experience,
            ..Self::default()
        }
    }

    /// Returns `None` only when the template has no follow-ups.
    ///
    /// An answer with an example gets a "how / specifically" follow-up, an
    /// answer from personal experience gets an "experience / actual" one,
    /// anything else the first entry.
    pub fn generate(&self, original: &ProactiveQuestionTemplate, response_text: &str) -> Option<String> {
        let candidates = &original.follow_up_questions;
        let first = candidates.first()?;

        let cues = if self.has_example.classify(response_text) {
            Some(&self.detail_cues)
        } else if self.has_personal_experience.classify(response_text) {
            Some(&self.experience_cues)
        } else {
            None
        };

        let preferred = cues.and_then(|cues| {
            candidates
                .iter()
                .find(|candidate| count_markers(candidate, cues) > 0)
        });
        Some(preferred.unwrap_or(first).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{QuestionCategory, TriggerConditions};
    use chrono::Utc;

    fn template(follow_ups: &[&str]) -> ProactiveQuestionTemplate {
        ProactiveQuestionTemplate {
            id: "q1".to_string(),
            persona_id: "p1".to_string(),
            category: QuestionCategory::Methodology,
            question_text: "How do you plan a reel?".to_string(),
            follow_up_questions: owned(follow_ups),
            trigger_conditions: TriggerConditions {
                context_keywords: Default::default(),
                min_session_length: 0,
                cooldown_minutes: 0,
                priority: 1,
            },
            usage_count: 0,
            last_used_at: None,
            success_rate: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    const FOLLOW_UPS: &[&str] = &[
        "Why does that matter?",
        "What was your actual experience with it?",
        "How specifically did you test it?",
    ];

    #[test]
    fn test_example_answer_gets_detail_follow_up() {
        let generator = FollowUpGenerator::default();
        let follow_up = generator.generate(&template(FOLLOW_UPS), "For example, a cafe reel with a question hook");
        assert_eq!(follow_up.unwrap(), "How specifically did you test it?");
    }

    #[test]
    fn test_personal_answer_gets_experience_follow_up() {
        let generator = FollowUpGenerator::default();
        let follow_up = generator.generate(&template(FOLLOW_UPS), "When I started, my reels were too long");
        assert_eq!(follow_up.unwrap(), "What was your actual experience with it?");
    }

    #[test]
    fn test_plain_answer_gets_first_follow_up() {
        let generator = FollowUpGenerator::default();
        let follow_up = generator.generate(&template(FOLLOW_UPS), "Short hooks work best");
        assert_eq!(follow_up.unwrap(), "Why does that matter?");
    }

    #[test]
    fn test_missing_preferred_falls_back_to_first() {
        let generator = FollowUpGenerator::default();
        let follow_up = generator.generate(&template(&["Anything else?"]), "For example, this");
        assert_eq!(follow_up.unwrap(), "Anything else?");
    }

    #[test]
    fn test_no_follow_ups() {
        let generator = FollowUpGenerator::default();
        assert!(generator.generate(&template(&[]), "For example").is_none());
    }
}
