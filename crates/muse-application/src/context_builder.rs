//! Derives selection contexts from a raw turn.
//!
//! The host hands over what it already has (subject, session, the session's
//! user messages); topics, sentiment and conversation flow are derived here.

use chrono::{DateTime, Utc};
use muse_core::config::FlowThresholds;
use muse_core::heuristics::{count_markers, tokenize};
use muse_core::interaction::InteractionRecord;
use muse_core::persona::{PersonaContext, Sentiment};
use muse_core::question::QuestionContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Messages from the end of the session that topics are taken from.
const TOPIC_WINDOW: usize = 3;
const MAX_TOPICS: usize = 8;
/// Shorter words carry too little meaning to count as a topic.
const MIN_CONTENT_WORD_CHARS: usize = 4;

const STOPWORDS: &[&str] = &[
    "about", "after", "again", "also", "been", "before", "being", "could", "does", "doing",
    "from", "have", "having", "here", "into", "just", "like", "make", "more", "most", "much",
    "only", "other", "over", "really", "should", "some", "such", "than", "that", "their",
    "them", "then", "there", "these", "they", "thing", "things", "this", "those", "very",
    "want", "what", "when", "where", "which", "while", "will", "with", "would", "your",
];

/// One turn as the host sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnInput {
    pub subject_id: String,
    pub session_id: String,
    /// User messages of the session, oldest first, including this turn's
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_question_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_persona_id: Option<String>,
    /// The subject is an administrator
    #[serde(default)]
    pub is_admin: bool,
}

impl TurnInput {
    pub fn new(
        subject_id: impl Into<String>,
        session_id: impl Into<String>,
        messages: Vec<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            session_id: session_id.into(),
            messages,
            ..Self::default()
        }
    }

    pub fn as_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    pub fn pinned(mut self, persona_id: impl Into<String>) -> Self {
        self.pinned_persona_id = Some(persona_id.into());
        self
    }

    pub fn with_last_question_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.last_question_at = at;
        self
    }

    pub fn message_count(&self) -> u32 {
        u32::try_from(self.messages.len()).unwrap_or(u32::MAX)
    }
}

/// Builds `PersonaContext` and `QuestionContext` for a turn.
pub struct ContextBuilder {
    flow: FlowThresholds,
    positive_markers: Vec<String>,
    negative_markers: Vec<String>,
}

impl ContextBuilder {
    pub fn new(flow: FlowThresholds) -> Self {
        Self {
            flow,
            positive_markers: owned(&[
                "thanks", "thank", "great", "awesome", "love", "perfect", "nice",
                "고마워", "감사", "좋아", "최고",
            ]),
            negative_markers: owned(&[
                "wrong", "bad", "useless", "confusing", "confused", "frustrated", "annoying",
                "hate", "not helpful", "doesn't help", "별로", "싫어", "틀렸",
            ]),
        }
    }

    /// Topic tags of the last few messages.
    ///
    /// Catalog vocabulary found in the messages comes first, in vocabulary
    /// order, then remaining content words in order of appearance.
    pub fn extract_topics(&self, messages: &[String], vocabulary: &BTreeSet<String>) -> Vec<String> {
        let start = messages.len().saturating_sub(TOPIC_WINDOW);
        let window = messages[start..].join(" ");
        if window.trim().is_empty() {
            return Vec::new();
        }
        let lowered = window.to_lowercase();

        let mut topics: Vec<String> = vocabulary
            .iter()
            .filter(|term| !term.is_empty() && lowered.contains(term.as_str()))
            .cloned()
            .collect();

        for word in tokenize(&window) {
            if topics.len() >= MAX_TOPICS {
                break;
            }
            if word.chars().count() < MIN_CONTENT_WORD_CHARS
                || STOPWORDS.contains(&word.as_str())
                || word.chars().all(|c| c.is_ascii_digit())
                || topics.contains(&word)
            {
                continue;
            }
            topics.push(word);
        }
        topics.truncate(MAX_TOPICS);
        topics
    }

    /// Sentiment of the latest message by marker counts.
    pub fn detect_sentiment(&self, text: &str) -> Sentiment {
        let positive = count_markers(text, &self.positive_markers);
        let negative = count_markers(text, &self.negative_markers);
        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }

    pub fn persona_context(
        &self,
        input: &TurnInput,
        topics: &[String],
        recent: &[InteractionRecord],
    ) -> PersonaContext {
        let sentiment = input
            .messages
            .last()
            .map(|m| self.detect_sentiment(m))
            .unwrap_or_default();

        let mut context = PersonaContext::new(input.subject_id.clone())
            .with_topics(topics.iter().cloned())
            .with_recent(recent.iter().map(InteractionRecord::to_recent).collect());
        context.message_count = input.message_count();
        context.sentiment = sentiment;
        context.pinned_persona_id = input.pinned_persona_id.clone();
        context
    }

    pub fn question_context(&self, input: &TurnInput, topics: &[String]) -> QuestionContext {
        QuestionContext::new(
            input.session_id.clone(),
            input.subject_id.clone(),
            input.message_count(),
            topics.to_vec(),
            &self.flow,
        )
        .with_last_question_at(input.last_question_at)
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(FlowThresholds::default())
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use muse_core::question::ConversationFlow;

    fn vocabulary(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_topics_prefer_catalog_vocabulary() {
        let builder = ContextBuilder::default();
        let messages = vec![
            "old message about cooking".to_string(),
            "hi".to_string(),
            "How do I fix my branding?".to_string(),
            "My reels get no views".to_string(),
        ];
        let topics = builder.extract_topics(&messages, &vocabulary(&["branding", "reels", "seo"]));

        assert_eq!(topics[0], "branding");
        assert_eq!(topics[1], "reels");
        assert!(topics.contains(&"views".to_string()));
        assert!(!topics.contains(&"cooking".to_string()));
        assert!(!topics.contains(&"seo".to_string()));
    }

    #[test]
    fn test_empty_messages_have_no_topics() {
        let builder = ContextBuilder::default();
        assert!(builder.extract_topics(&[], &vocabulary(&["branding"])).is_empty());
        assert!(builder
            .extract_topics(&["   ".to_string()], &vocabulary(&["branding"]))
            .is_empty());
    }

    #[test]
    fn test_topics_are_capped() {
        let builder = ContextBuilder::default();
        let messages = vec![
            "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo".to_string(),
        ];
        assert_eq!(builder.extract_topics(&messages, &BTreeSet::new()).len(), MAX_TOPICS);
    }

    #[test]
    fn test_sentiment() {
        let builder = ContextBuilder::default();
        assert_eq!(builder.detect_sentiment("Thanks, that was great"), Sentiment::Positive);
        assert_eq!(builder.detect_sentiment("This is wrong and useless"), Sentiment::Negative);
        assert_eq!(builder.detect_sentiment("Tell me about pricing"), Sentiment::Neutral);
    }

    #[test]
    fn test_contexts_from_turn() {
        let builder = ContextBuilder::default();
        let now = Utc::now();
        let messages: Vec<String> = (0..7).map(|i| format!("message {}", i)).collect();
        let input = TurnInput::new("alice", "s1", messages)
            .pinned("p1")
            .with_last_question_at(Some(now));
        let recent = vec![InteractionRecord::new("alice", "s1", "p2", now)];
        let topics = vec!["branding".to_string()];

        let persona_ctx = builder.persona_context(&input, &topics, &recent);
        assert_eq!(persona_ctx.message_count, 7);
        assert_eq!(persona_ctx.pinned_persona_id.as_deref(), Some("p1"));
        assert_eq!(persona_ctx.recent_interactions[0].persona_id, "p2");
        assert_eq!(persona_ctx.session_topics, topics);

        let question_ctx = builder.question_context(&input, &topics);
        assert_eq!(question_ctx.conversation_flow, ConversationFlow::Deepening);
        assert_eq!(question_ctx.last_question_at, Some(now));
    }
}
