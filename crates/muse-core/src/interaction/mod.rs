//! Interaction ledger: append-only history of which persona answered whom.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::Result;
use crate::persona::RecentInteraction;

/// One answered turn.
///
/// A turn rated after the fact is appended again under the same `id`; the
/// later entry supersedes the earlier one.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct InteractionRecord {
    pub id: String,
    pub subject_id: String,
    pub session_id: String,
    pub persona_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    /// Explicit satisfaction in [0, 1], when the turn was rated inline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl InteractionRecord {
    pub fn new(
        subject_id: impl Into<String>,
        session_id: impl Into<String>,
        persona_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject_id: subject_id.into(),
            session_id: session_id.into(),
            persona_id: persona_id.into(),
            question_id: None,
            satisfaction: None,
            timestamp,
        }
    }

    /// The same turn carrying an explicit satisfaction, clamped to [0, 1].
    pub fn rated(&self, satisfaction: f64) -> Self {
        Self {
            satisfaction: Some(satisfaction.clamp(0.0, 1.0)),
            ..self.clone()
        }
    }

    pub fn to_recent(&self) -> RecentInteraction {
        RecentInteraction {
            persona_id: self.persona_id.clone(),
            satisfaction: self.satisfaction,
            timestamp: self.timestamp,
        }
    }
}

/// Collapses entries given in append order to the latest entry per turn id,
/// newest turn first, at most `limit` of them.
pub fn latest_per_turn<I>(appended: I, limit: usize) -> Vec<InteractionRecord>
where
    I: IntoIterator<Item = InteractionRecord>,
    I::IntoIter: DoubleEndedIterator,
{
    let mut seen = HashSet::new();
    let mut records: Vec<InteractionRecord> = appended
        .into_iter()
        .rev()
        .filter(|record| seen.insert(record.id.clone()))
        .collect();
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records.truncate(limit);
    records
}

/// Append-only store of interactions.
#[async_trait::async_trait]
pub trait InteractionLedger: Send + Sync {
    async fn append(&self, record: &InteractionRecord) -> Result<()>;

    /// Returns at most `limit` turns of the subject, newest first. Each turn
    /// appears once, as its latest appended entry.
    async fn recent(&self, subject_id: &str, limit: usize) -> Result<Vec<InteractionRecord>>;

    /// Latest entry of the turn with this id.
    async fn find(&self, id: &str) -> Result<Option<InteractionRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_rating_supersedes_the_unrated_turn() {
        let start = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap();
        let first = InteractionRecord::new("alice", "s1", "p1", start);
        let second = InteractionRecord::new("alice", "s1", "p2", start + Duration::minutes(1));
        let rated = first.rated(1.4);

        let latest = latest_per_turn(vec![first.clone(), second.clone(), rated], 5);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].id, second.id);
        assert_eq!(latest[1].id, first.id);
        assert_eq!(latest[1].satisfaction, Some(1.0));
        assert_eq!(latest[1].timestamp, start);
    }

    #[test]
    fn test_limit_counts_turns_not_entries() {
        let start = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap();
        let turns: Vec<_> = (0..3)
            .map(|i| InteractionRecord::new("alice", "s1", "p1", start + Duration::minutes(i)))
            .collect();
        let mut appended = turns.clone();
        appended.push(turns[2].rated(0.5));
        appended.push(turns[1].rated(0.75));

        let latest = latest_per_turn(appended, 2);
        let ids: Vec<_> = latest.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![turns[2].id.as_str(), turns[1].id.as_str()]);
        assert_eq!(latest[1].satisfaction, Some(0.75));
    }
}
