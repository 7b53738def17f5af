//! Administrative catalog operations.
//!
//! Keeps the catalog invariants the selectors rely on: one active persona per
//! display identifier, and an active generic fallback at all times.

use muse_core::persona::{
    CreatePersonaRequest, PersonaDefinition, PersonaRepository, get_default_presets,
};
use muse_core::question::{ProactiveQuestionTemplate, QuestionRepository, get_default_questions};
use muse_core::{Clock, MuseError, Result, SystemClock};
use std::sync::Arc;

/// How many entries `seed_defaults` installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub personas: usize,
    pub questions: usize,
}

/// Service for curating personas and the question bank
pub struct CatalogService {
    personas: Arc<dyn PersonaRepository>,
    questions: Arc<dyn QuestionRepository>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(personas: Arc<dyn PersonaRepository>, questions: Arc<dyn QuestionRepository>) -> Self {
        Self {
            personas,
            questions,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn list_personas(&self) -> Result<Vec<PersonaDefinition>> {
        self.personas.get_all().await
    }

    pub async fn list_questions(&self, persona_id: Option<&str>) -> Result<Vec<ProactiveQuestionTemplate>> {
        match persona_id {
            Some(id) => self.questions.get_for_persona(id).await,
            None => self.questions.get_all().await,
        }
    }

    /// Creates a persona; an active persona with the same display
    /// identifier is deactivated in its favor.
    pub async fn create_persona(&self, request: CreatePersonaRequest) -> Result<PersonaDefinition> {
        request.validate()?;
        let persona = request.into_persona(self.clock.now());

        self.retire_same_identifier(&persona).await?;
        self.personas.upsert(&persona).await?;
        tracing::info!(
            persona_id = %persona.id,
            display_identifier = %persona.display_identifier.as_str(),
            "Persona created"
        );
        Ok(persona)
    }

    /// Edits name, identifier, keywords, style, priority and binding.
    /// Ranking counters are kept.
    pub async fn update_persona(
        &self,
        id: &str,
        request: CreatePersonaRequest,
    ) -> Result<PersonaDefinition> {
        request.validate()?;
        let mut persona = self
            .personas
            .get_by_id(id)
            .await?
            .ok_or_else(|| MuseError::not_found("persona", id))?;

        let was_fallback = persona.is_active() && persona.is_fallback();
        request.apply_to(&mut persona, self.clock.now());
        if was_fallback && !persona.is_fallback() && !self.has_other_fallback(&persona.id).await? {
            return Err(MuseError::validation(
                "cannot change the identifier of the last active generic persona",
            ));
        }

        if persona.is_active() {
            self.retire_same_identifier(&persona).await?;
        }
        self.personas.upsert(&persona).await?;
        tracing::info!(
            persona_id = %persona.id,
            version = persona.metadata.version,
            "Persona updated"
        );
        Ok(persona)
    }

    /// Soft-deletes a persona. The last active generic persona stays.
    pub async fn deactivate_persona(&self, id: &str) -> Result<()> {
        let persona = self
            .personas
            .get_by_id(id)
            .await?
            .ok_or_else(|| MuseError::not_found("persona", id))?;

        if persona.is_active() && persona.is_fallback() && !self.has_other_fallback(id).await? {
            return Err(MuseError::validation(
                "cannot deactivate the last active generic persona",
            ));
        }

        self.personas.deactivate(id, self.clock.now()).await?;
        tracing::info!(persona_id = id, "Persona deactivated");
        Ok(())
    }

    /// Adds or replaces a question template.
    pub async fn upsert_question(&self, template: ProactiveQuestionTemplate) -> Result<ProactiveQuestionTemplate> {
        if template.id.trim().is_empty() {
            return Err(MuseError::validation("Question id cannot be empty"));
        }
        if template.question_text.trim().is_empty() {
            return Err(MuseError::validation("Question text cannot be empty"));
        }
        if !(1..=10).contains(&template.trigger_conditions.priority) {
            return Err(MuseError::validation(format!(
                "Question priority must be within 1..=10, got {}",
                template.trigger_conditions.priority
            )));
        }
        if self.personas.get_by_id(&template.persona_id).await?.is_none() {
            return Err(MuseError::not_found("persona", template.persona_id.clone()));
        }

        self.questions.upsert(&template).await?;
        tracing::info!(
            question_id = %template.id,
            persona_id = %template.persona_id,
            category = %template.category,
            "Question saved"
        );
        Ok(template)
    }

    pub async fn deactivate_question(&self, id: &str) -> Result<()> {
        self.questions.deactivate(id).await?;
        tracing::info!(question_id = id, "Question deactivated");
        Ok(())
    }

    /// Installs the preset personas and question bank into empty catalogs.
    pub async fn seed_defaults(&self) -> Result<SeedReport> {
        let now = self.clock.now();
        let mut report = SeedReport::default();

        if self.personas.get_all().await?.is_empty() {
            for persona in get_default_presets(now) {
                self.personas.upsert(&persona).await?;
                report.personas += 1;
            }
        }
        if self.questions.get_all().await?.is_empty() {
            for question in get_default_questions(now) {
                self.questions.upsert(&question).await?;
                report.questions += 1;
            }
        }

        tracing::info!(
            personas = report.personas,
            questions = report.questions,
            "Seeded default catalog"
        );
        Ok(report)
    }

    async fn retire_same_identifier(&self, persona: &PersonaDefinition) -> Result<()> {
        let now = self.clock.now();
        for mut other in self.personas.get_all().await? {
            if other.id != persona.id
                && other.is_active()
                && other.display_identifier == persona.display_identifier
            {
                other.metadata.is_active = false;
                other.metadata.updated_at = now;
                self.personas.upsert(&other).await?;
                tracing::info!(
                    persona_id = %other.id,
                    replaced_by = %persona.id,
                    "Persona superseded"
                );
            }
        }
        Ok(())
    }

    async fn has_other_fallback(&self, id: &str) -> Result<bool> {
        Ok(self
            .personas
            .get_all()
            .await?
            .iter()
            .any(|p| p.id != id && p.is_active() && p.is_fallback()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use muse_core::ManualClock;
    use muse_core::persona::{
        ATOZIT_UUID, CommunicationStyle, GENERIC_UUID, MOMENT_RYAN_UUID, PersonaKind,
    };
    use muse_core::question::{QuestionCategory, TriggerConditions};
    use muse_infrastructure::{InMemoryPersonaRepository, InMemoryQuestionRepository};

    fn service() -> (CatalogService, Arc<InMemoryPersonaRepository>, Arc<InMemoryQuestionRepository>) {
        let personas = Arc::new(InMemoryPersonaRepository::default());
        let questions = Arc::new(InMemoryQuestionRepository::default());
        let service = CatalogService::new(personas.clone(), questions.clone());
        (service, personas, questions)
    }

    fn request(kind: PersonaKind) -> CreatePersonaRequest {
        CreatePersonaRequest {
            name: "Ryan v2".to_string(),
            display_identifier: kind,
            expertise_keywords: vec!["branding".to_string()],
            communication_style: CommunicationStyle::default(),
            priority: 1,
            real_person_info: None,
        }
    }

    #[tokio::test]
    async fn test_seed_defaults_only_fills_empty_catalogs() {
        let (service, _, _) = service();
        let first = service.seed_defaults().await.unwrap();
        assert_eq!(first.personas, 3);
        assert!(first.questions > 0);

        let second = service.seed_defaults().await.unwrap();
        assert_eq!(second, SeedReport::default());
    }

    #[tokio::test]
    async fn test_create_supersedes_same_identifier() {
        let (service, personas, _) = service();
        service.seed_defaults().await.unwrap();

        let created = service.create_persona(request(PersonaKind::MomentRyan)).await.unwrap();

        let old = personas.get_by_id(MOMENT_RYAN_UUID).await.unwrap().unwrap();
        assert!(!old.is_active());
        let active_ryans: Vec<_> = personas
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|p| p.is_active() && p.display_identifier == PersonaKind::MomentRyan)
            .collect();
        assert_eq!(active_ryans.len(), 1);
        assert_eq!(active_ryans[0].id, created.id);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_request() {
        let (service, _, _) = service();
        let mut invalid = request(PersonaKind::MomentRyan);
        invalid.expertise_keywords.clear();
        let err = service.create_persona(invalid).await.unwrap_err();
        assert!(matches!(err, MuseError::Validation(_)));
    }

    #[tokio::test]
    async fn test_last_generic_cannot_be_deactivated() {
        let (service, personas, _) = service();
        service.seed_defaults().await.unwrap();

        let err = service.deactivate_persona(GENERIC_UUID).await.unwrap_err();
        assert!(matches!(err, MuseError::Validation(_)));
        assert!(personas.get_by_id(GENERIC_UUID).await.unwrap().unwrap().is_active());

        service.deactivate_persona(ATOZIT_UUID).await.unwrap();
        assert!(!personas.get_by_id(ATOZIT_UUID).await.unwrap().unwrap().is_active());
    }

    #[tokio::test]
    async fn test_deactivate_stamps_the_service_clock() {
        let (service, personas, _) = service();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let service = service.with_clock(Arc::new(ManualClock::new(at)));
        service.seed_defaults().await.unwrap();

        service.deactivate_persona(ATOZIT_UUID).await.unwrap();
        let atozit = personas.get_by_id(ATOZIT_UUID).await.unwrap().unwrap();
        assert_eq!(atozit.metadata.updated_at, at);
    }

    #[tokio::test]
    async fn test_update_keeps_counters() {
        let (service, personas, _) = service();
        service.seed_defaults().await.unwrap();
        personas.increment_usage(MOMENT_RYAN_UUID).await.unwrap();

        let mut edit = request(PersonaKind::MomentRyan);
        edit.expertise_keywords = vec!["positioning".to_string()];
        let updated = service.update_persona(MOMENT_RYAN_UUID, edit).await.unwrap();

        assert_eq!(updated.metadata.usage_count, 1);
        assert_eq!(updated.metadata.version, 2);
        assert!(updated.expertise_keywords.contains("positioning"));
        assert!(updated.is_active());
    }

    #[tokio::test]
    async fn test_upsert_question_requires_known_persona() {
        let (service, _, questions) = service();
        service.seed_defaults().await.unwrap();

        let mut template = ProactiveQuestionTemplate {
            id: "q-custom".to_string(),
            persona_id: "missing".to_string(),
            category: QuestionCategory::Business,
            question_text: "How do you price a brand audit?".to_string(),
            follow_up_questions: vec![],
            trigger_conditions: TriggerConditions {
                context_keywords: ["pricing".to_string()].into_iter().collect(),
                min_session_length: 2,
                cooldown_minutes: 60,
                priority: 3,
            },
            usage_count: 0,
            last_used_at: None,
            success_rate: None,
            is_active: true,
            created_at: Utc::now(),
        };
        let err = service.upsert_question(template.clone()).await.unwrap_err();
        assert!(err.is_not_found());

        template.persona_id = MOMENT_RYAN_UUID.to_string();
        service.upsert_question(template).await.unwrap();
        assert!(questions.get_by_id("q-custom").await.unwrap().is_some());

        service.deactivate_question("q-custom").await.unwrap();
        assert!(!questions.get_by_id("q-custom").await.unwrap().unwrap().is_active);
    }
}
