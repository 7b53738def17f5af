//! Weighted multi-factor persona scoring.

use serde::Serialize;
use std::cmp::Ordering;

use crate::config::PersonaWeights;
use crate::heuristics::loosely_matches;
use crate::persona::{PersonaContext, PersonaDefinition, RecentInteraction};

/// Per-factor breakdown of a persona's score for one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaScore {
    pub persona_id: String,
    pub keyword_relevance: f64,
    pub satisfaction: f64,
    pub switch_success: f64,
    pub priority: f64,
    pub recency_adjustment: f64,
    pub total: f64,
}

/// Why a persona was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// The context pinned an active persona by hand
    Pinned,
    /// Highest score above the relevance floor
    Scored,
    /// Nothing cleared the floor; the generic persona answers
    Fallback,
    /// Nothing cleared the floor and no generic persona is active
    BelowFloor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonaSelection {
    pub persona: PersonaDefinition,
    pub reason: SelectionReason,
    /// Score of the chosen persona, absent when pinned
    pub score: Option<PersonaScore>,
}

/// Scores active personas against a `PersonaContext` and picks one.
#[derive(Debug, Clone, Default)]
pub struct PersonaSelector {
    weights: PersonaWeights,
}

impl PersonaSelector {
    pub fn new(weights: PersonaWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &PersonaWeights {
        &self.weights
    }

    /// Fraction of the persona's keywords found in the session topics.
    ///
    /// A keyword counts when it appears in the joined topics, or when one of
    /// the topics appears inside the keyword.
    pub fn keyword_relevance(persona: &PersonaDefinition, topics: &[String]) -> f64 {
        if persona.expertise_keywords.is_empty() {
            return 0.0;
        }
        let joined = topics.join(" ");
        if joined.trim().is_empty() {
            return 0.0;
        }
        let matched = persona
            .expertise_keywords
            .iter()
            .filter(|keyword| {
                loosely_contains(&joined, keyword)
                    || topics.iter().any(|topic| loosely_matches(keyword, topic))
            })
            .count();
        matched as f64 / persona.expertise_keywords.len() as f64
    }

    /// Bonus for recent high satisfaction, penalty for overuse.
    ///
    /// Looks at the newest `recency_window` interactions of the subject and
    /// only counts the ones answered by this persona.
    pub fn recency_adjustment(&self, persona_id: &str, recent: &[RecentInteraction]) -> f64 {
        let w = &self.weights;
        let window: Vec<&RecentInteraction> = recent
            .iter()
            .take(w.recency_window)
            .filter(|i| i.persona_id == persona_id)
            .collect();

        let mut adjustment = 0.0;
        let rated: Vec<f64> = window.iter().filter_map(|i| i.satisfaction).collect();
        if !rated.is_empty() {
            let average = rated.iter().sum::<f64>() / rated.len() as f64;
            if average > w.recency_bonus_threshold {
                adjustment += w.recency_bonus;
            }
        }
        if window.len() >= w.fatigue_threshold {
            adjustment -= w.fatigue_penalty;
        }
        adjustment
    }

    pub fn score(&self, persona: &PersonaDefinition, context: &PersonaContext) -> PersonaScore {
        let w = &self.weights;
        let meta = &persona.metadata;

        let keyword_relevance = Self::keyword_relevance(persona, &context.session_topics);
        let satisfaction = meta.satisfaction.clamp(0.0, 1.0);
        let switch_success = meta.switch_success_rate.clamp(0.0, 1.0);
        let priority = 1.0 / f64::from(meta.priority.max(1));
        let recency_adjustment = self.recency_adjustment(&persona.id, &context.recent_interactions);

        let total = keyword_relevance * w.keyword_relevance
            + satisfaction * w.satisfaction
            + switch_success * w.switch_success
            + priority * w.priority
            + recency_adjustment;

        PersonaScore {
            persona_id: persona.id.clone(),
            keyword_relevance,
            satisfaction,
            switch_success,
            priority,
            recency_adjustment,
            total,
        }
    }

    /// Picks the persona for this turn.
    ///
    /// Returns `None` only when no persona is active.
    pub fn select(
        &self,
        personas: &[PersonaDefinition],
        context: &PersonaContext,
    ) -> Option<PersonaSelection> {
        let active: Vec<&PersonaDefinition> = personas.iter().filter(|p| p.is_active()).collect();
        if active.is_empty() {
            return None;
        }

        if let Some(pinned_id) = context.pinned_persona_id.as_deref() {
            match active.iter().find(|p| p.id == pinned_id) {
                Some(pinned) => {
                    return Some(PersonaSelection {
                        persona: (*pinned).clone(),
                        reason: SelectionReason::Pinned,
                        score: None,
                    });
                }
                None => tracing::debug!(
                    persona_id = pinned_id,
                    "Pinned persona is not active, scoring instead"
                ),
            }
        }

        let mut ranked: Vec<(&PersonaDefinition, PersonaScore)> = active
            .iter()
            .map(|p| (*p, self.score(p, context)))
            .collect();
        ranked.sort_by(|a, b| rank(a, b));

        for (persona, score) in &ranked {
            tracing::debug!(
                persona_id = %persona.id,
                keyword = score.keyword_relevance,
                satisfaction = score.satisfaction,
                switch = score.switch_success,
                priority = score.priority,
                recency = score.recency_adjustment,
                total = score.total,
                "Persona scored"
            );
        }

        if let Some((persona, score)) = ranked
            .iter()
            .find(|(_, score)| score.total > self.weights.min_score)
        {
            return Some(PersonaSelection {
                persona: (*persona).clone(),
                reason: SelectionReason::Scored,
                score: Some(score.clone()),
            });
        }

        if let Some((persona, score)) = ranked.iter().find(|(p, _)| p.is_fallback()) {
            return Some(PersonaSelection {
                persona: (*persona).clone(),
                reason: SelectionReason::Fallback,
                score: Some(score.clone()),
            });
        }

        tracing::warn!("No persona cleared the floor and no generic fallback is active");
        ranked.into_iter().next().map(|(persona, score)| PersonaSelection {
            persona: persona.clone(),
            reason: SelectionReason::BelowFloor,
            score: Some(score),
        })
    }
}

/// Case-insensitive substring test.
fn loosely_contains(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    !needle.is_empty() && haystack.to_lowercase().contains(&needle)
}

/// Best first: higher total, then lower priority value, then lower usage.
fn rank(
    a: &(&PersonaDefinition, PersonaScore),
    b: &(&PersonaDefinition, PersonaScore),
) -> Ordering {
    b.1.total
        .partial_cmp(&a.1.total)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.metadata.priority.cmp(&b.0.metadata.priority))
        .then_with(|| a.0.metadata.usage_count.cmp(&b.0.metadata.usage_count))
        .then_with(|| a.0.id.cmp(&b.0.id))
}
