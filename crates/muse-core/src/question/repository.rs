//! Question bank repository trait.

use chrono::{DateTime, Utc};

use super::model::ProactiveQuestionTemplate;
use crate::error::Result;

/// An abstract repository for proactive question templates.
#[async_trait::async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Retrieves every template, active or not.
    async fn get_all(&self) -> Result<Vec<ProactiveQuestionTemplate>>;

    /// Retrieves the templates that enrich the given persona.
    async fn get_for_persona(&self, persona_id: &str) -> Result<Vec<ProactiveQuestionTemplate>>;

    async fn get_by_id(&self, id: &str) -> Result<Option<ProactiveQuestionTemplate>>;

    /// Inserts the template or replaces the stored one with the same id.
    async fn upsert(&self, template: &ProactiveQuestionTemplate) -> Result<()>;

    /// Soft-deletes a template (`is_active = false`).
    async fn deactivate(&self, id: &str) -> Result<()>;

    /// Records that the template was offered at `at`
    /// (`last_used_at = at`, `usage_count += 1`).
    async fn record_asked(&self, id: &str, at: DateTime<Utc>) -> Result<()>;

    /// Stores the latest response-quality score of the template.
    async fn record_success_rate(&self, id: &str, success_rate: f64) -> Result<()>;
}
