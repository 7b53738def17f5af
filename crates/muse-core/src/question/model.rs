//! Proactive question domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// What kind of knowledge a proactive question tries to draw out.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Expertise,
    Personality,
    Business,
    Methodology,
    Experience,
    WritingStyle,
}

impl QuestionCategory {
    pub const ALL: [QuestionCategory; 6] = [
        QuestionCategory::Expertise,
        QuestionCategory::Personality,
        QuestionCategory::Business,
        QuestionCategory::Methodology,
        QuestionCategory::Experience,
        QuestionCategory::WritingStyle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Expertise => "expertise",
            QuestionCategory::Personality => "personality",
            QuestionCategory::Business => "business",
            QuestionCategory::Methodology => "methodology",
            QuestionCategory::Experience => "experience",
            QuestionCategory::WritingStyle => "writing_style",
        }
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a template may fire.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TriggerConditions {
    /// At least one must loosely match a recent topic
    #[serde(default)]
    pub context_keywords: BTreeSet<String>,
    /// Minimum messages in the session before the question may be asked
    #[serde(default)]
    pub min_session_length: u32,
    /// Per-template cooldown after the question was last asked
    #[serde(default)]
    pub cooldown_minutes: u32,
    /// 1 = highest
    pub priority: u32,
}

/// A question the engine may inject into an admin training session.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ProactiveQuestionTemplate {
    pub id: String,
    /// Persona whose profile the answer enriches
    pub persona_id: String,
    pub category: QuestionCategory,
    pub question_text: String,
    /// Ordered candidates for a follow-up once the answer is seen
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
    pub trigger_conditions: TriggerConditions,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    /// Response quality of the last observed answer, within [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ProactiveQuestionTemplate {
    /// Whether the cooldown window has elapsed at `now`.
    pub fn cooldown_elapsed(&self, now: DateTime<Utc>) -> bool {
        match self.last_used_at {
            None => true,
            Some(last) => {
                let cooldown = i64::from(self.trigger_conditions.cooldown_minutes);
                now - last >= chrono::Duration::minutes(cooldown)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn template(cooldown_minutes: u32) -> ProactiveQuestionTemplate {
        ProactiveQuestionTemplate {
            id: "q1".to_string(),
            persona_id: "p1".to_string(),
            category: QuestionCategory::Expertise,
            question_text: "What is your branding process?".to_string(),
            follow_up_questions: Vec::new(),
            trigger_conditions: TriggerConditions {
                context_keywords: BTreeSet::new(),
                min_session_length: 0,
                cooldown_minutes,
                priority: 1,
            },
            usage_count: 0,
            last_used_at: None,
            success_rate: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cooldown_elapsed_when_never_used() {
        assert!(template(30).cooldown_elapsed(Utc::now()));
    }

    #[test]
    fn test_cooldown_boundary_is_inclusive() {
        let now = Utc::now();
        let mut t = template(30);
        t.last_used_at = Some(now - Duration::minutes(30));
        assert!(t.cooldown_elapsed(now));

        t.last_used_at = Some(now - Duration::minutes(29));
        assert!(!t.cooldown_elapsed(now));
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&QuestionCategory::WritingStyle).unwrap();
        assert_eq!(json, "\"writing_style\"");
        assert_eq!(QuestionCategory::WritingStyle.to_string(), "writing_style");
    }
}
