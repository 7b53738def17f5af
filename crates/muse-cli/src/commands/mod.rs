pub mod catalog;
pub mod turn;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use muse_application::{CatalogService, PersonaEngine, QueuedEscalationNotifier};
use muse_core::feedback::Escalation;
use muse_core::{Clock, EngineConfig, ManualClock, SystemClock};
use muse_infrastructure::{
    JsonlInteractionLedger, MusePaths, TomlPersonaRepository, TomlQuestionRepository,
    load_engine_config,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Stores and settings resolved from the command line.
pub struct App {
    pub paths: MusePaths,
    pub config: EngineConfig,
    pub clock: Arc<dyn Clock>,
    pub personas: Arc<TomlPersonaRepository>,
    pub questions: Arc<TomlQuestionRepository>,
    pub ledger: Arc<JsonlInteractionLedger>,
}

impl App {
    pub fn open(dir: Option<&Path>, at: Option<&str>) -> Result<Self> {
        let paths = MusePaths::new(dir)?;
        let config = load_engine_config(&paths.engine_config_file())
            .with_context(|| format!("invalid {}", paths.engine_config_file().display()))?;

        let clock: Arc<dyn Clock> = match at {
            Some(at) => {
                let instant = DateTime::parse_from_rfc3339(at)
                    .with_context(|| format!("--at expects an RFC 3339 timestamp, got '{}'", at))?
                    .with_timezone(&Utc);
                Arc::new(ManualClock::new(instant))
            }
            None => Arc::new(SystemClock),
        };

        tracing::debug!("Using data directory {}", paths.base_dir().display());
        Ok(Self {
            personas: Arc::new(TomlPersonaRepository::new(&paths)),
            questions: Arc::new(TomlQuestionRepository::new(&paths)),
            ledger: Arc::new(JsonlInteractionLedger::new(&paths)),
            paths,
            config,
            clock,
        })
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(self.personas.clone(), self.questions.clone()).with_clock(self.clock.clone())
    }

    /// Starts an engine whose escalations are queued for the caller to print.
    pub async fn engine(&self) -> Result<(PersonaEngine, UnboundedReceiver<Escalation>)> {
        let (notifier, escalations) = QueuedEscalationNotifier::channel();
        let engine = PersonaEngine::builder(
            self.personas.clone(),
            self.questions.clone(),
            self.ledger.clone(),
        )
        .clock(self.clock.clone())
        .notifier(Arc::new(notifier))
        .config(self.config.clone())
        .start()
        .await
        .context("engine failed to start (run `muse seed` on a fresh directory)")?;
        Ok((engine, escalations))
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
