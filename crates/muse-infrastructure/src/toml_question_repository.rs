//! TOML-based QuestionRepository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use muse_core::question::{ProactiveQuestionTemplate, QuestionRepository};
use muse_core::selection::mark_asked;
use muse_core::{MuseError, Result};
use std::path::PathBuf;

use crate::catalog_storage::{Catalog, CatalogStorage};
use crate::paths::MusePaths;

/// Stores question templates as `[[question]]` tables in `catalog.toml`.
#[derive(Clone)]
pub struct TomlQuestionRepository {
    storage: CatalogStorage,
}

impl TomlQuestionRepository {
    pub fn new(paths: &MusePaths) -> Self {
        Self::with_path(paths.catalog_file())
    }

    pub fn with_path(catalog_path: PathBuf) -> Self {
        Self {
            storage: CatalogStorage::new(catalog_path),
        }
    }

    async fn update_record<F>(&self, id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut ProactiveQuestionTemplate) + Send + 'static,
    {
        let id = id.to_string();
        self.storage
            .modify(move |catalog: &mut Catalog| {
                let template = catalog
                    .questions
                    .iter_mut()
                    .find(|q| q.id == id)
                    .ok_or_else(|| MuseError::not_found("question", id.clone()))?;
                f(template);
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl QuestionRepository for TomlQuestionRepository {
    async fn get_all(&self) -> Result<Vec<ProactiveQuestionTemplate>> {
        Ok(self.storage.read().await?.questions)
    }

    async fn get_for_persona(&self, persona_id: &str) -> Result<Vec<ProactiveQuestionTemplate>> {
        let catalog = self.storage.read().await?;
        Ok(catalog
            .questions
            .into_iter()
            .filter(|q| q.persona_id == persona_id)
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<ProactiveQuestionTemplate>> {
        let catalog = self.storage.read().await?;
        Ok(catalog
            .questions
            .into_iter()
            .find(|q| q.id == id))
    }

    async fn upsert(&self, template: &ProactiveQuestionTemplate) -> Result<()> {
        let template = template.clone();
        self.storage
            .modify(move |catalog| {
                match catalog.questions.iter_mut().find(|q| q.id == template.id) {
                    Some(existing) => *existing = template,
                    None => catalog.questions.push(template),
                }
                Ok(())
            })
            .await
    }

    async fn deactivate(&self, id: &str) -> Result<()> {
        self.update_record(id, |template| template.is_active = false)
            .await
    }

    async fn record_asked(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        self.update_record(id, move |template| mark_asked(template, at))
        .await
    }

    async fn record_success_rate(&self, id: &str, success_rate: f64) -> Result<()> {
        let rate = success_rate.clamp(0.0, 1.0);
        self.update_record(id, move |template| template.success_rate = Some(rate))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muse_core::persona::{ATOZIT_UUID, PersonaRepository, get_default_presets};
    use muse_core::question::get_default_questions;
    use tempfile::TempDir;

    use crate::TomlPersonaRepository;

    #[tokio::test]
    async fn test_questions_and_personas_share_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.toml");
        let personas = TomlPersonaRepository::with_path(path.clone());
        let questions = TomlQuestionRepository::with_path(path);
        let now = Utc::now();

        for persona in get_default_presets(now) {
            personas.upsert(&persona).await.unwrap();
        }
        for question in get_default_questions(now) {
            questions.upsert(&question).await.unwrap();
        }

        assert_eq!(personas.get_all().await.unwrap().len(), 3);
        assert_eq!(questions.get_all().await.unwrap().len(), get_default_questions(now).len());
        let atozit = questions.get_for_persona(ATOZIT_UUID).await.unwrap();
        assert!(!atozit.is_empty());
        assert!(atozit.iter().all(|q| q.persona_id == ATOZIT_UUID));
    }

    #[tokio::test]
    async fn test_record_asked_and_success_rate() {
        let temp_dir = TempDir::new().unwrap();
        let questions = TomlQuestionRepository::with_path(temp_dir.path().join("catalog.toml"));
        let now = Utc::now();
        let template = get_default_questions(now).remove(0);
        questions.upsert(&template).await.unwrap();

        questions.record_asked(&template.id, now).await.unwrap();
        questions.record_success_rate(&template.id, 1.7).await.unwrap();

        let stored = questions.get_by_id(&template.id).await.unwrap().unwrap();
        assert_eq!(stored.usage_count, 1);
        assert_eq!(stored.last_used_at.map(|t| t.timestamp()), Some(now.timestamp()));
        assert_eq!(stored.success_rate, Some(1.0));
        assert_eq!(stored.trigger_conditions, template.trigger_conditions);
    }

    #[tokio::test]
    async fn test_unknown_schema_version_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "[[question]]\nversion = \"2.0.0\"\nid = \"q-future\"\n",
        )
        .unwrap();

        let questions = TomlQuestionRepository::with_path(path);
        let err = questions.get_all().await.unwrap_err();
        assert!(err.is_store_failure());
    }
}
