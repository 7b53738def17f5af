//! Question template DTOs
//!
//! ## Version History
//! - **1.0.0**: Initial schema, trigger conditions inlined

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

use muse_core::question::{ProactiveQuestionTemplate, QuestionCategory, TriggerConditions};

/// Question record V1.0.0.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct QuestionRecordV1_0_0 {
    pub id: String,
    pub persona_id: String,
    pub category: QuestionCategory,
    pub question_text: String,
    pub is_active: bool,
    pub priority: u32,
    #[serde(default)]
    pub min_session_length: u32,
    #[serde(default)]
    pub cooldown_minutes: u32,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub context_keywords: Vec<String>,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
}

impl IntoDomain<ProactiveQuestionTemplate> for QuestionRecordV1_0_0 {
    fn into_domain(self) -> ProactiveQuestionTemplate {
        ProactiveQuestionTemplate {
            id: self.id,
            persona_id: self.persona_id,
            category: self.category,
            question_text: self.question_text,
            follow_up_questions: self.follow_up_questions,
            trigger_conditions: TriggerConditions {
                context_keywords: self.context_keywords.into_iter().collect(),
                min_session_length: self.min_session_length,
                cooldown_minutes: self.cooldown_minutes,
                priority: self.priority.max(1),
            },
            usage_count: self.usage_count,
            last_used_at: self.last_used_at,
            success_rate: self.success_rate,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

impl FromDomain<ProactiveQuestionTemplate> for QuestionRecordV1_0_0 {
    fn from_domain(template: ProactiveQuestionTemplate) -> Self {
        let trigger = template.trigger_conditions;
        QuestionRecordV1_0_0 {
            id: template.id,
            persona_id: template.persona_id,
            category: template.category,
            question_text: template.question_text,
            is_active: template.is_active,
            priority: trigger.priority,
            min_session_length: trigger.min_session_length,
            cooldown_minutes: trigger.cooldown_minutes,
            usage_count: template.usage_count,
            last_used_at: template.last_used_at,
            success_rate: template.success_rate,
            created_at: template.created_at,
            context_keywords: trigger.context_keywords.into_iter().collect(),
            follow_up_questions: template.follow_up_questions,
        }
    }
}
