//! Tunable weights and thresholds of the engine.
//!
//! Every number the selectors and the recalibrator use lives here so it can be
//! adjusted from `engine.toml` without touching the algorithms.

use serde::{Deserialize, Serialize};

use crate::error::{MuseError, Result};
use crate::question::QuestionCategory;

/// Root engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub persona: PersonaWeights,
    pub question: QuestionScoring,
    pub flow: FlowThresholds,
    pub quality: QualityHeuristics,
}

impl EngineConfig {
    /// Rejects configurations the selectors cannot work with.
    pub fn validate(&self) -> Result<()> {
        let p = &self.persona;
        let weights = [
            ("keyword_relevance", p.keyword_relevance),
            ("satisfaction", p.satisfaction),
            ("switch_success", p.switch_success),
            ("priority", p.priority),
            ("recency_bonus", p.recency_bonus),
            ("fatigue_penalty", p.fatigue_penalty),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(MuseError::configuration(format!(
                    "persona weight '{}' must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&p.min_score) {
            return Err(MuseError::configuration(format!(
                "persona min_score must be within [0, 1], got {}",
                p.min_score
            )));
        }
        if p.recency_window == 0 {
            return Err(MuseError::configuration(
                "persona recency_window must be at least 1",
            ));
        }

        let f = &self.flow;
        if !(f.initial_max <= f.deepening_max && f.deepening_max <= f.exploration_max) {
            return Err(MuseError::configuration(format!(
                "flow thresholds must be ascending, got {}/{}/{}",
                f.initial_max, f.deepening_max, f.exploration_max
            )));
        }

        let q = &self.quality;
        if q.ideal_min_chars > q.ideal_max_chars {
            return Err(MuseError::configuration(
                "quality ideal_min_chars must not exceed ideal_max_chars",
            ));
        }
        Ok(())
    }
}

/// Weights of the linear persona score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaWeights {
    pub keyword_relevance: f64,
    pub satisfaction: f64,
    pub switch_success: f64,
    pub priority: f64,
    /// Personas scoring at or below this are discarded.
    pub min_score: f64,
    /// How many recent interactions the recency adjustment inspects.
    pub recency_window: usize,
    pub recency_bonus_threshold: f64,
    pub recency_bonus: f64,
    /// Appearances in the recency window that trigger the fatigue penalty.
    pub fatigue_threshold: usize,
    pub fatigue_penalty: f64,
}

impl Default for PersonaWeights {
    fn default() -> Self {
        Self {
            keyword_relevance: 0.4,
            satisfaction: 0.3,
            switch_success: 0.2,
            priority: 0.1,
            min_score: 0.3,
            recency_window: 5,
            recency_bonus_threshold: 0.8,
            recency_bonus: 0.1,
            fatigue_threshold: 3,
            fatigue_penalty: 0.05,
        }
    }
}

/// Point table for proactive question ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionScoring {
    /// `(priority_base - priority) * priority_multiplier`
    pub priority_base: i64,
    pub priority_multiplier: i64,
    /// `max(0, usage_base - usage_count * usage_step)`
    pub usage_base: i64,
    pub usage_step: i64,
    pub category_weights: CategoryWeights,
}

impl Default for QuestionScoring {
    fn default() -> Self {
        Self {
            priority_base: 11,
            priority_multiplier: 10,
            usage_base: 50,
            usage_step: 5,
            category_weights: CategoryWeights::default(),
        }
    }
}

/// Static per-category bonus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub expertise: i64,
    pub business: i64,
    pub personality: i64,
    pub experience: i64,
    pub methodology: i64,
    pub writing_style: i64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            expertise: 10,
            business: 9,
            personality: 8,
            experience: 8,
            methodology: 7,
            writing_style: 6,
        }
    }
}

impl CategoryWeights {
    pub fn weight(&self, category: QuestionCategory) -> i64 {
        match category {
            QuestionCategory::Expertise => self.expertise,
            QuestionCategory::Business => self.business,
            QuestionCategory::Personality => self.personality,
            QuestionCategory::Experience => self.experience,
            QuestionCategory::Methodology => self.methodology,
            QuestionCategory::WritingStyle => self.writing_style,
        }
    }
}

/// Message-count boundaries of the conversation flow stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowThresholds {
    pub initial_max: u32,
    pub deepening_max: u32,
    pub exploration_max: u32,
}

impl Default for FlowThresholds {
    fn default() -> Self {
        Self {
            initial_max: 5,
            deepening_max: 15,
            exploration_max: 30,
        }
    }
}

/// Parameters of the admin response quality heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityHeuristics {
    pub ideal_min_chars: usize,
    pub ideal_max_chars: usize,
    /// Score for a response inside the ideal length band.
    pub length_score: f64,
    /// Score for a response shorter than the band, and the floor for longer ones.
    pub short_score: f64,
    pub example_bonus: f64,
    pub professional_term_bonus: f64,
    pub professional_term_cap: f64,
    pub first_person_bonus: f64,
    pub first_person_cap: f64,
}

impl Default for QualityHeuristics {
    fn default() -> Self {
        Self {
            ideal_min_chars: 50,
            ideal_max_chars: 300,
            length_score: 0.3,
            short_score: 0.1,
            example_bonus: 0.2,
            professional_term_bonus: 0.05,
            professional_term_cap: 0.2,
            first_person_bonus: 0.05,
            first_person_cap: 0.2,
        }
    }
}
