//! TOML-based PersonaRepository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use muse_core::persona::{PersonaDefinition, PersonaRepository};
use muse_core::{MuseError, Result};
use std::path::PathBuf;

use crate::catalog_storage::CatalogStorage;
use crate::paths::MusePaths;

/// Stores personas as `[[persona]]` tables in `catalog.toml`.
///
/// Shares the file with `TomlQuestionRepository`; every write is a locked
/// read-modify-write so the two never clobber each other.
#[derive(Clone)]
pub struct TomlPersonaRepository {
    storage: CatalogStorage,
}

impl TomlPersonaRepository {
    pub fn new(paths: &MusePaths) -> Self {
        Self::with_path(paths.catalog_file())
    }

    /// Creates a repository on a custom catalog path (for testing)
    pub fn with_path(catalog_path: PathBuf) -> Self {
        Self {
            storage: CatalogStorage::new(catalog_path),
        }
    }
}

#[async_trait]
impl PersonaRepository for TomlPersonaRepository {
    async fn get_all(&self) -> Result<Vec<PersonaDefinition>> {
        Ok(self.storage.read().await?.personas)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<PersonaDefinition>> {
        let catalog = self.storage.read().await?;
        Ok(catalog.personas.into_iter().find(|p| p.id == id))
    }

    async fn upsert(&self, persona: &PersonaDefinition) -> Result<()> {
        let persona = persona.clone();
        self.storage
            .modify(move |catalog| {
                match catalog.personas.iter_mut().find(|p| p.id == persona.id) {
                    Some(existing) => *existing = persona,
                    None => catalog.personas.push(persona),
                }
                Ok(())
            })
            .await
    }

    async fn deactivate(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let id = id.to_string();
        self.storage
            .modify(move |catalog| {
                let persona = catalog
                    .personas
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or_else(|| MuseError::not_found("persona", id.clone()))?;
                persona.metadata.is_active = false;
                persona.metadata.updated_at = at;
                Ok(())
            })
            .await
    }

    async fn increment_usage(&self, id: &str) -> Result<u64> {
        let id = id.to_string();
        self.storage
            .modify(move |catalog| {
                let persona = catalog
                    .personas
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or_else(|| MuseError::not_found("persona", id.clone()))?;
                persona.metadata.usage_count += 1;
                Ok(persona.metadata.usage_count)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muse_core::persona::{GENERIC_UUID, MOMENT_RYAN_UUID, PersonaKind, get_default_presets};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_empty_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlPersonaRepository::with_path(temp_dir.path().join("catalog.toml"));
        assert!(repo.get_all().await.unwrap().is_empty());
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlPersonaRepository::with_path(temp_dir.path().join("catalog.toml"));
        for persona in get_default_presets(Utc::now()) {
            repo.upsert(&persona).await.unwrap();
        }

        let reopened = TomlPersonaRepository::with_path(temp_dir.path().join("catalog.toml"));
        let personas = reopened.get_all().await.unwrap();
        assert_eq!(personas.len(), 3);

        let ryan = reopened.get_by_id(MOMENT_RYAN_UUID).await.unwrap().unwrap();
        assert_eq!(ryan.display_identifier, PersonaKind::MomentRyan);
        assert!(ryan.expertise_keywords.contains("branding"));
        assert_eq!(ryan.communication_style.signature.as_deref(), Some("- Ryan"));
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlPersonaRepository::with_path(temp_dir.path().join("catalog.toml"));
        let mut generic = get_default_presets(Utc::now()).pop().unwrap();
        repo.upsert(&generic).await.unwrap();

        generic.name = "Helper".to_string();
        repo.upsert(&generic).await.unwrap();

        let personas = repo.get_all().await.unwrap();
        assert_eq!(personas.len(), 1);
        assert_eq!(personas[0].name, "Helper");
    }

    #[tokio::test]
    async fn test_increment_usage_and_deactivate() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlPersonaRepository::with_path(temp_dir.path().join("catalog.toml"));
        for persona in get_default_presets(Utc::now()) {
            repo.upsert(&persona).await.unwrap();
        }

        assert_eq!(repo.increment_usage(GENERIC_UUID).await.unwrap(), 1);
        assert_eq!(repo.increment_usage(GENERIC_UUID).await.unwrap(), 2);

        let at = "2026-03-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        repo.deactivate(MOMENT_RYAN_UUID, at).await.unwrap();
        let ryan = repo.get_by_id(MOMENT_RYAN_UUID).await.unwrap().unwrap();
        assert!(!ryan.is_active());
        assert_eq!(ryan.metadata.updated_at, at);

        let err = repo.increment_usage("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
