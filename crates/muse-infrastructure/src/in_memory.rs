//! In-memory adapters.
//!
//! Used by tests and by embedders that keep the catalog elsewhere and only
//! hand the engine a snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use muse_core::interaction::{InteractionLedger, InteractionRecord, latest_per_turn};
use muse_core::persona::{PersonaDefinition, PersonaRepository};
use muse_core::question::{ProactiveQuestionTemplate, QuestionRepository};
use muse_core::{MuseError, Result};
use tokio::sync::RwLock;

/// Personas kept in insertion order.
#[derive(Default)]
pub struct InMemoryPersonaRepository {
    personas: RwLock<Vec<PersonaDefinition>>,
}

impl InMemoryPersonaRepository {
    pub fn new(personas: Vec<PersonaDefinition>) -> Self {
        Self {
            personas: RwLock::new(personas),
        }
    }
}

#[async_trait]
impl PersonaRepository for InMemoryPersonaRepository {
    async fn get_all(&self) -> Result<Vec<PersonaDefinition>> {
        Ok(self.personas.read().await.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<PersonaDefinition>> {
        Ok(self.personas.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn upsert(&self, persona: &PersonaDefinition) -> Result<()> {
        let mut personas = self.personas.write().await;
        match personas.iter_mut().find(|p| p.id == persona.id) {
            Some(existing) => *existing = persona.clone(),
            None => personas.push(persona.clone()),
        }
        Ok(())
    }

    async fn deactivate(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let mut personas = self.personas.write().await;
        let persona = personas
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| MuseError::not_found("persona", id))?;
        persona.metadata.is_active = false;
        persona.metadata.updated_at = at;
        Ok(())
    }

    async fn increment_usage(&self, id: &str) -> Result<u64> {
        let mut personas = self.personas.write().await;
        let persona = personas
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| MuseError::not_found("persona", id))?;
        persona.metadata.usage_count += 1;
        Ok(persona.metadata.usage_count)
    }
}

#[derive(Default)]
pub struct InMemoryQuestionRepository {
    questions: RwLock<Vec<ProactiveQuestionTemplate>>,
}

impl InMemoryQuestionRepository {
    pub fn new(questions: Vec<ProactiveQuestionTemplate>) -> Self {
        Self {
            questions: RwLock::new(questions),
        }
    }

    async fn update<F>(&self, id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut ProactiveQuestionTemplate),
    {
        let mut questions = self.questions.write().await;
        let question = questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| MuseError::not_found("question", id))?;
        f(question);
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn get_all(&self) -> Result<Vec<ProactiveQuestionTemplate>> {
        Ok(self.questions.read().await.clone())
    }

    async fn get_for_persona(&self, persona_id: &str) -> Result<Vec<ProactiveQuestionTemplate>> {
        Ok(self
            .questions
            .read()
            .await
            .iter()
            .filter(|q| q.persona_id == persona_id)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<ProactiveQuestionTemplate>> {
        Ok(self.questions.read().await.iter().find(|q| q.id == id).cloned())
    }

    async fn upsert(&self, template: &ProactiveQuestionTemplate) -> Result<()> {
        let mut questions = self.questions.write().await;
        match questions.iter_mut().find(|q| q.id == template.id) {
            Some(existing) => *existing = template.clone(),
            None => questions.push(template.clone()),
        }
        Ok(())
    }

    async fn deactivate(&self, id: &str) -> Result<()> {
        self.update(id, |q| q.is_active = false).await
    }

    async fn record_asked(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        self.update(id, |q| muse_core::selection::mark_asked(q, at))
            .await
    }

    async fn record_success_rate(&self, id: &str, success_rate: f64) -> Result<()> {
        self.update(id, |q| q.success_rate = Some(success_rate.clamp(0.0, 1.0)))
            .await
    }
}

#[derive(Default)]
pub struct InMemoryInteractionLedger {
    records: RwLock<Vec<InteractionRecord>>,
}

impl InMemoryInteractionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl InteractionLedger for InMemoryInteractionLedger {
    async fn append(&self, record: &InteractionRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn recent(&self, subject_id: &str, limit: usize) -> Result<Vec<InteractionRecord>> {
        let records: Vec<_> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.subject_id == subject_id)
            .cloned()
            .collect();
        Ok(latest_per_turn(records, limit))
    }

    async fn find(&self, id: &str) -> Result<Option<InteractionRecord>> {
        Ok(self.records.read().await.iter().rev().find(|r| r.id == id).cloned())
    }
}
