//! Per-turn input of proactive question selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FlowThresholds;

/// Stage of the conversation, derived purely from the message count.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationFlow {
    #[default]
    Initial,
    Deepening,
    Exploration,
    Synthesis,
}

impl ConversationFlow {
    pub fn from_message_count(message_count: u32, thresholds: &FlowThresholds) -> Self {
        if message_count <= thresholds.initial_max {
            ConversationFlow::Initial
        } else if message_count <= thresholds.deepening_max {
            ConversationFlow::Deepening
        } else if message_count <= thresholds.exploration_max {
            ConversationFlow::Exploration
        } else {
            ConversationFlow::Synthesis
        }
    }
}

/// Deserialized contexts ignore any stored `conversation_flow` and derive it
/// from `message_count` with the default thresholds.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(from = "StoredQuestionContext")]
pub struct QuestionContext {
    pub session_id: String,
    pub subject_id: String,
    pub message_count: u32,
    pub recent_topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_question_at: Option<DateTime<Utc>>,
    pub conversation_flow: ConversationFlow,
}

#[derive(Deserialize)]
struct StoredQuestionContext {
    session_id: String,
    subject_id: String,
    #[serde(default)]
    message_count: u32,
    #[serde(default)]
    recent_topics: Vec<String>,
    #[serde(default)]
    last_question_at: Option<DateTime<Utc>>,
}

impl From<StoredQuestionContext> for QuestionContext {
    fn from(stored: StoredQuestionContext) -> Self {
        QuestionContext::new(
            stored.session_id,
            stored.subject_id,
            stored.message_count,
            stored.recent_topics,
            &FlowThresholds::default(),
        )
        .with_last_question_at(stored.last_question_at)
    }
}

impl QuestionContext {
    /// Builds a context, deriving `conversation_flow` from `message_count`.
    pub fn new(
        session_id: impl Into<String>,
        subject_id: impl Into<String>,
        message_count: u32,
        recent_topics: Vec<String>,
        thresholds: &FlowThresholds,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            subject_id: subject_id.into(),
            message_count,
            recent_topics,
            last_question_at: None,
            conversation_flow: ConversationFlow::from_message_count(message_count, thresholds),
        }
    }

    pub fn with_last_question_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.last_question_at = at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_thresholds() {
        let t = FlowThresholds::default();
        assert_eq!(ConversationFlow::from_message_count(0, &t), ConversationFlow::Initial);
        assert_eq!(ConversationFlow::from_message_count(5, &t), ConversationFlow::Initial);
        assert_eq!(ConversationFlow::from_message_count(6, &t), ConversationFlow::Deepening);
        assert_eq!(ConversationFlow::from_message_count(15, &t), ConversationFlow::Deepening);
        assert_eq!(ConversationFlow::from_message_count(30, &t), ConversationFlow::Exploration);
        assert_eq!(ConversationFlow::from_message_count(31, &t), ConversationFlow::Synthesis);
    }

    #[test]
    fn test_new_derives_flow() {
        let ctx = QuestionContext::new("s1", "admin", 12, vec![], &FlowThresholds::default());
        assert_eq!(ctx.conversation_flow, ConversationFlow::Deepening);
    }

    #[test]
    fn test_deserialized_flow_follows_message_count() {
        let json = r#"{"session_id":"s1","subject_id":"admin","message_count":20,"conversation_flow":"initial"}"#;
        let ctx: QuestionContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.conversation_flow, ConversationFlow::Exploration);

        let json = r#"{"session_id":"s1","subject_id":"admin"}"#;
        let ctx: QuestionContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.conversation_flow, ConversationFlow::Initial);
        assert!(ctx.recent_topics.is_empty());
    }
}
