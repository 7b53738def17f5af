//! Shared access to `catalog.toml`.
//!
//! Responsibilities:
//! - Run blocking file I/O off the async executor
//! - Migrate every entry to the latest schema on read
//! - Hold the file lock for read-modify-write cycles
//!
//! Entries are always written back in the latest schema.

use muse_core::persona::PersonaDefinition;
use muse_core::question::ProactiveQuestionTemplate;
use muse_core::{MuseError, Result};
use std::path::PathBuf;
use version_migrate::Migrator;

use crate::dto::{
    CatalogFile, PERSONA_ENTITY, QUESTION_ENTITY, create_catalog_migrator, load_entry, save_entry,
};
use crate::storage::AtomicTomlFile;

/// Decoded catalog contents.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub personas: Vec<PersonaDefinition>,
    pub questions: Vec<ProactiveQuestionTemplate>,
}

impl Catalog {
    fn decode(file: CatalogFile, migrator: &Migrator) -> Result<Self> {
        let personas = file
            .personas
            .into_iter()
            .map(|entry| load_entry(migrator, PERSONA_ENTITY, entry))
            .collect::<Result<Vec<PersonaDefinition>>>()?;
        let questions = file
            .questions
            .into_iter()
            .map(|entry| load_entry(migrator, QUESTION_ENTITY, entry))
            .collect::<Result<Vec<ProactiveQuestionTemplate>>>()?;
        Ok(Self {
            personas,
            questions,
        })
    }

    fn encode(&self, migrator: &Migrator) -> Result<CatalogFile> {
        let personas = self
            .personas
            .iter()
            .map(|persona| save_entry(migrator, PERSONA_ENTITY, persona))
            .collect::<Result<Vec<_>>>()?;
        let questions = self
            .questions
            .iter()
            .map(|template| save_entry(migrator, QUESTION_ENTITY, template))
            .collect::<Result<Vec<_>>>()?;
        Ok(CatalogFile {
            personas,
            questions,
        })
    }
}

#[derive(Clone)]
pub struct CatalogStorage {
    file: AtomicTomlFile<CatalogFile>,
}

impl CatalogStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Loads the catalog; a missing file reads as an empty catalog.
    pub async fn read(&self) -> Result<Catalog> {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || -> Result<Catalog> {
            let migrator = create_catalog_migrator()?;
            let stored = file.load()?.unwrap_or_default();
            Catalog::decode(stored, &migrator)
        })
        .await
        .map_err(|e| MuseError::internal(format!("catalog read task failed: {}", e)))?
    }

    /// Applies `f` under the file lock and writes the result back.
    ///
    /// Nothing is written when `f` or decoding fails.
    pub async fn modify<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Catalog) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || -> Result<R> {
            let migrator = create_catalog_migrator()?;
            let result = file.update(CatalogFile::default, |stored| {
                let mut catalog = Catalog::decode(std::mem::take(stored), &migrator)?;
                let result = f(&mut catalog)?;
                *stored = catalog.encode(&migrator)?;
                Ok(result)
            })?;
            Ok(result)
        })
        .await
        .map_err(|e| MuseError::internal(format!("catalog write task failed: {}", e)))?
    }
}
