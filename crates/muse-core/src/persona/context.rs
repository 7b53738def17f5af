//! Per-turn input of persona selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// One of the subject's recent turns, newest first in `PersonaContext`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RecentInteraction {
    pub persona_id: String,
    /// Explicit satisfaction in [0, 1], if the turn was rated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Everything the persona selector knows about the current turn.
///
/// Ephemeral, never persisted.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct PersonaContext {
    /// User or admin the turn belongs to
    pub subject_id: String,
    /// Topic tags derived from recent messages, oldest first
    #[serde(default)]
    pub session_topics: Vec<String>,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub sentiment: Sentiment,
    /// Newest first
    #[serde(default)]
    pub recent_interactions: Vec<RecentInteraction>,
    /// A persona the user picked by hand; bypasses scoring while active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_persona_id: Option<String>,
}

impl PersonaContext {
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            ..Self::default()
        }
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.session_topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_recent(mut self, recent: Vec<RecentInteraction>) -> Self {
        self.recent_interactions = recent;
        self
    }

    pub fn pinned(mut self, persona_id: impl Into<String>) -> Self {
        self.pinned_persona_id = Some(persona_id.into());
        self
    }
}
