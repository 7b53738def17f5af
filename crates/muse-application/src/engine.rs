//! Persona engine use case.
//!
//! `PersonaEngine` runs the per-turn flow on top of the pure selectors in
//! `muse_core::selection`: it reads the catalogs, persists the side effects
//! of a selection, and feeds feedback back into the catalog counters.
//!
//! # Degradation
//!
//! A turn always gets a persona voice. When the persona store cannot be read
//! the last successfully loaded catalog is used, and when there is none the
//! built-in generic persona answers. Counter writes that fail are logged and
//! dropped. Only configuration errors reach the caller of a selection.

use chrono::{DateTime, Utc};
use muse_core::feedback::{Escalation, EscalationNotifier, FeedbackRecord};
use muse_core::interaction::{InteractionLedger, InteractionRecord};
use muse_core::persona::{
    GENERIC_UUID, PersonaContext, PersonaDefinition, PersonaRepository, Sentiment,
    get_default_presets,
};
use muse_core::question::{
    ConversationFlow, ProactiveQuestionTemplate, QuestionContext, QuestionRepository,
};
use muse_core::recalibration::{PersonaAdjustment, Recalibrator};
use muse_core::selection::{
    FollowUpGenerator, PersonaSelection, PersonaSelector, QuestionSelector, SelectionReason,
    mark_asked,
};
use muse_core::{Clock, EngineConfig, MuseError, Result, SystemClock};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::context_builder::{ContextBuilder, TurnInput};
use crate::escalation::LoggingEscalationNotifier;

/// What applying one feedback record changed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackOutcome {
    pub persona: PersonaAdjustment,
    /// Quality score written to the question template, if any
    pub question_success_rate: Option<f64>,
    pub escalation: Option<Escalation>,
}

/// Result of [`PersonaEngine::plan_turn`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnPlan {
    pub persona: PersonaDefinition,
    pub reason: SelectionReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<ProactiveQuestionTemplate>,
    pub conversation_flow: ConversationFlow,
    pub topics: Vec<String>,
    pub sentiment: Sentiment,
    /// Id of the ledger entry, absent when the append failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_id: Option<String>,
}

/// Builder for [`PersonaEngine`].
pub struct PersonaEngineBuilder {
    personas: Arc<dyn PersonaRepository>,
    questions: Arc<dyn QuestionRepository>,
    ledger: Arc<dyn InteractionLedger>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn EscalationNotifier>,
    config: EngineConfig,
}

impl PersonaEngineBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn EscalationNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the configuration and the catalog, then starts the engine.
    ///
    /// Fails with a `Configuration` error when no persona is active or no
    /// active generic fallback exists. Store errors at start propagate.
    pub async fn start(self) -> Result<PersonaEngine> {
        self.config.validate()?;

        let catalog = self.personas.get_all().await?;
        let active = catalog.iter().filter(|p| p.is_active()).count();
        if active == 0 {
            return Err(MuseError::configuration("no persona is active"));
        }
        if !catalog.iter().any(|p| p.is_active() && p.is_fallback()) {
            return Err(MuseError::configuration(
                "no active generic fallback persona",
            ));
        }
        tracing::info!(
            personas = catalog.len(),
            active,
            "Persona engine started"
        );

        Ok(PersonaEngine {
            persona_selector: PersonaSelector::new(self.config.persona.clone()),
            question_selector: QuestionSelector::new(self.config.question.clone()),
            follow_ups: FollowUpGenerator::default(),
            recalibrator: Recalibrator::new(self.config.quality.clone()),
            context_builder: ContextBuilder::new(self.config.flow.clone()),
            personas: self.personas,
            questions: self.questions,
            ledger: self.ledger,
            clock: self.clock,
            notifier: self.notifier,
            config: self.config,
            snapshot: RwLock::new(catalog),
        })
    }
}

/// Per-turn persona and proactive question selection.
pub struct PersonaEngine {
    personas: Arc<dyn PersonaRepository>,
    questions: Arc<dyn QuestionRepository>,
    ledger: Arc<dyn InteractionLedger>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn EscalationNotifier>,
    config: EngineConfig,
    persona_selector: PersonaSelector,
    question_selector: QuestionSelector,
    follow_ups: FollowUpGenerator,
    recalibrator: Recalibrator,
    context_builder: ContextBuilder,
    /// Last persona catalog read successfully
    snapshot: RwLock<Vec<PersonaDefinition>>,
}

impl PersonaEngine {
    /// Starts building an engine with the system clock, default
    /// configuration and a logging escalation notifier.
    pub fn builder(
        personas: Arc<dyn PersonaRepository>,
        questions: Arc<dyn QuestionRepository>,
        ledger: Arc<dyn InteractionLedger>,
    ) -> PersonaEngineBuilder {
        PersonaEngineBuilder {
            personas,
            questions,
            ledger,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(LoggingEscalationNotifier),
            config: EngineConfig::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context_builder(&self) -> &ContextBuilder {
        &self.context_builder
    }

    /// Picks the persona that answers this turn and records its usage.
    ///
    /// The returned persona already carries the incremented usage count.
    pub async fn select_best_persona(&self, context: &PersonaContext) -> Result<PersonaSelection> {
        let catalog = self.load_personas().await;
        self.select_from(&catalog, context).await
    }

    /// Picks a proactive question for `persona_id`, if one is due.
    ///
    /// Question store failures yield no question.
    pub async fn select_proactive_question(
        &self,
        context: &QuestionContext,
        persona_id: &str,
    ) -> Option<ProactiveQuestionTemplate> {
        let templates = match self.questions.get_for_persona(persona_id).await {
            Ok(templates) => templates,
            Err(e) => {
                tracing::warn!(persona_id, "Question store unavailable, skipping question: {}", e);
                return None;
            }
        };

        let now = self.clock.now();
        let mut chosen = self
            .question_selector
            .select(&templates, context, persona_id, now)?
            .clone();
        mark_asked(&mut chosen, now);

        if let Err(e) = self.questions.record_asked(&chosen.id, now).await {
            tracing::warn!(question_id = %chosen.id, "Failed to record question usage: {}", e);
        }
        tracing::info!(
            question_id = %chosen.id,
            persona_id,
            category = %chosen.category,
            "Proactive question selected"
        );
        Some(chosen)
    }

    /// Follow-up for an answered proactive question.
    pub fn generate_follow_up(
        &self,
        original: &ProactiveQuestionTemplate,
        response_text: &str,
    ) -> Option<String> {
        self.follow_ups.generate(original, response_text)
    }

    /// Folds one feedback record into the catalog.
    ///
    /// Negative outcomes are escalated before the counters are touched, so a
    /// failing store never suppresses the review signal. Deduplication is
    /// the caller's responsibility.
    ///
    /// The persona and the rated question are resolved before anything is
    /// written. Once the persona counters are saved the call succeeds: the
    /// question quality and the ledger rating are logged and dropped on
    /// failure, so a retry never folds the rating twice.
    pub async fn apply_feedback(&self, record: &FeedbackRecord) -> Result<FeedbackOutcome> {
        record.validate()?;
        let now = self.clock.now();

        let escalation = Escalation::from_feedback(record, now);
        if let Some(escalation) = &escalation {
            if let Err(e) = self.notifier.notify(escalation.clone()) {
                tracing::error!(feedback_id = %record.id, "Failed to escalate feedback: {}", e);
            }
        }

        let mut persona = self
            .personas
            .get_by_id(&record.persona_id)
            .await?
            .ok_or_else(|| MuseError::not_found("persona", record.persona_id.clone()))?;
        if let Some(question_id) = record.question_id.as_deref() {
            self.questions
                .get_by_id(question_id)
                .await?
                .ok_or_else(|| MuseError::not_found("question", question_id))?;
        }

        let adjustment = self.recalibrator.recalibrate_persona(&mut persona, record, now);
        self.personas.upsert(&persona).await?;
        self.refresh_snapshot(&persona).await;
        tracing::info!(
            persona_id = %persona.id,
            before = adjustment.satisfaction_before,
            after = adjustment.satisfaction_after,
            switch_success = ?adjustment.switch_success_rate_after,
            "Persona recalibrated"
        );

        let question_success_rate = self.record_question_quality(record).await;
        self.rate_interaction(record).await;

        Ok(FeedbackOutcome {
            persona: adjustment,
            question_success_rate,
            escalation,
        })
    }

    async fn record_question_quality(&self, record: &FeedbackRecord) -> Option<f64> {
        let question_id = record.question_id.as_deref()?;
        let rate = self.recalibrator.question_success_rate(record)?;
        match self.questions.record_success_rate(question_id, rate).await {
            Ok(()) => {
                tracing::info!(question_id, success_rate = rate, "Question success rate updated");
                Some(rate)
            }
            Err(e) => {
                tracing::warn!(question_id, "Failed to record question success rate: {}", e);
                None
            }
        }
    }

    /// Appends the rated version of the turn the feedback refers to.
    async fn rate_interaction(&self, record: &FeedbackRecord) {
        let Some(interaction_id) = record.interaction_id.as_deref() else {
            return;
        };
        let turn = match self.ledger.find(interaction_id).await {
            Ok(Some(turn)) => turn,
            Ok(None) => {
                tracing::warn!(interaction_id, "Rated interaction is not in the ledger");
                return;
            }
            Err(e) => {
                tracing::warn!(interaction_id, "Ledger unavailable: {}", e);
                return;
            }
        };
        let rated = turn.rated(record.normalized_rating());
        if let Err(e) = self.ledger.append(&rated).await {
            tracing::warn!(interaction_id, "Failed to append interaction rating: {}", e);
        }
    }

    /// Runs the whole turn: contexts, persona, optional question, ledger.
    ///
    /// A question is only considered when an administrator talks to the
    /// persona bound to their own identity.
    pub async fn plan_turn(&self, input: &TurnInput) -> Result<TurnPlan> {
        let catalog = self.load_personas().await;
        let vocabulary = self.vocabulary(&catalog).await;
        let topics = self.context_builder.extract_topics(&input.messages, &vocabulary);

        let recent = match self
            .ledger
            .recent(&input.subject_id, self.config.persona.recency_window)
            .await
        {
            Ok(recent) => recent,
            Err(e) => {
                tracing::warn!(subject_id = %input.subject_id, "Ledger unavailable: {}", e);
                Vec::new()
            }
        };

        let persona_context = self.context_builder.persona_context(input, &topics, &recent);
        let question_context = self.context_builder.question_context(input, &topics);
        let selection = self.select_from(&catalog, &persona_context).await?;

        let training = input.is_admin && selection.persona.is_bound_to(&input.subject_id);
        let question = if training {
            self.select_proactive_question(&question_context, &selection.persona.id)
                .await
        } else {
            None
        };

        let mut record = InteractionRecord::new(
            input.subject_id.clone(),
            input.session_id.clone(),
            selection.persona.id.clone(),
            self.clock.now(),
        );
        record.question_id = question.as_ref().map(|q| q.id.clone());
        let interaction_id = match self.ledger.append(&record).await {
            Ok(()) => Some(record.id),
            Err(e) => {
                tracing::warn!(subject_id = %input.subject_id, "Failed to append interaction: {}", e);
                None
            }
        };

        Ok(TurnPlan {
            score: selection.score.as_ref().map(|s| s.total),
            persona: selection.persona,
            reason: selection.reason,
            question,
            conversation_flow: question_context.conversation_flow,
            topics,
            sentiment: persona_context.sentiment,
            interaction_id,
        })
    }

    /// Appends a turn the host handled itself, e.g. one rated inline.
    pub async fn record_interaction(&self, record: &InteractionRecord) -> Result<()> {
        self.ledger.append(record).await
    }

    async fn select_from(
        &self,
        catalog: &[PersonaDefinition],
        context: &PersonaContext,
    ) -> Result<PersonaSelection> {
        let mut selection = self
            .persona_selector
            .select(catalog, context)
            .ok_or_else(|| MuseError::configuration("no persona is active"))?;

        match self.personas.increment_usage(&selection.persona.id).await {
            Ok(count) => selection.persona.metadata.usage_count = count,
            Err(e) => {
                tracing::warn!(
                    persona_id = %selection.persona.id,
                    "Failed to record persona usage: {}",
                    e
                );
                selection.persona.metadata.usage_count += 1;
            }
        }
        self.refresh_snapshot(&selection.persona).await;

        tracing::info!(
            persona_id = %selection.persona.id,
            display_identifier = %selection.persona.display_identifier.as_str(),
            reason = ?selection.reason,
            score = ?selection.score.as_ref().map(|s| s.total),
            "Persona selected"
        );
        Ok(selection)
    }

    /// Current catalog, or the best stand-in when the store is down.
    async fn load_personas(&self) -> Vec<PersonaDefinition> {
        match self.personas.get_all().await {
            Ok(catalog) => {
                *self.snapshot.write().await = catalog.clone();
                catalog
            }
            Err(e) => {
                let snapshot = self.snapshot.read().await.clone();
                if snapshot.iter().any(|p| p.is_active()) {
                    tracing::warn!("Persona store unavailable, using last known catalog: {}", e);
                    snapshot
                } else {
                    tracing::warn!("Persona store unavailable, using built-in generic persona: {}", e);
                    builtin_fallback(self.clock.now())
                }
            }
        }
    }

    async fn refresh_snapshot(&self, persona: &PersonaDefinition) {
        let mut snapshot = self.snapshot.write().await;
        if let Some(existing) = snapshot.iter_mut().find(|p| p.id == persona.id) {
            *existing = persona.clone();
        }
    }

    /// Lowercased persona and question keywords used to tag topics.
    async fn vocabulary(&self, catalog: &[PersonaDefinition]) -> BTreeSet<String> {
        let mut vocabulary: BTreeSet<String> = catalog
            .iter()
            .filter(|p| p.is_active())
            .flat_map(|p| p.expertise_keywords.iter().map(|k| k.to_lowercase()))
            .collect();
        match self.questions.get_all().await {
            Ok(templates) => vocabulary.extend(
                templates
                    .iter()
                    .filter(|t| t.is_active)
                    .flat_map(|t| t.trigger_conditions.context_keywords.iter())
                    .map(|k| k.to_lowercase()),
            ),
            Err(e) => tracing::debug!("Question keywords unavailable: {}", e),
        }
        vocabulary
    }
}

fn builtin_fallback(now: DateTime<Utc>) -> Vec<PersonaDefinition> {
    get_default_presets(now)
        .into_iter()
        .filter(|p| p.id == GENERIC_UUID)
        .collect()
}
