//! Two-phase proactive question selection: eligibility filter, then scoring.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::config::QuestionScoring;
use crate::heuristics::loosely_matches;
use crate::question::{ProactiveQuestionTemplate, QuestionContext};

/// Why a template was filtered out in phase A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    Inactive,
    OtherPersona,
    SessionTooShort,
    CoolingDown,
    NoTopicMatch,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionSelector {
    scoring: QuestionScoring,
}

impl QuestionSelector {
    pub fn new(scoring: QuestionScoring) -> Self {
        Self { scoring }
    }

    /// Phase A. `Ok(())` when the template may be asked for `persona_id` at `now`.
    pub fn check_eligibility(
        &self,
        template: &ProactiveQuestionTemplate,
        context: &QuestionContext,
        persona_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), Ineligibility> {
        if !template.is_active {
            return Err(Ineligibility::Inactive);
        }
        if template.persona_id != persona_id {
            return Err(Ineligibility::OtherPersona);
        }
        if context.message_count < template.trigger_conditions.min_session_length {
            return Err(Ineligibility::SessionTooShort);
        }
        if !template.cooldown_elapsed(now) {
            return Err(Ineligibility::CoolingDown);
        }
        let topic_match = template
            .trigger_conditions
            .context_keywords
            .iter()
            .any(|keyword| context.recent_topics.iter().any(|topic| loosely_matches(keyword, topic)));
        if !topic_match {
            return Err(Ineligibility::NoTopicMatch);
        }
        Ok(())
    }

    pub fn is_eligible(
        &self,
        template: &ProactiveQuestionTemplate,
        context: &QuestionContext,
        persona_id: &str,
        now: DateTime<Utc>,
    ) -> bool {
        self.check_eligibility(template, context, persona_id, now).is_ok()
    }

    /// Phase B: `priority + usage + category` points.
    pub fn score(&self, template: &ProactiveQuestionTemplate) -> i64 {
        let s = &self.scoring;
        let priority = i64::from(template.trigger_conditions.priority);
        let priority_score = (s.priority_base - priority) * s.priority_multiplier;
        let usage = i64::try_from(template.usage_count).unwrap_or(i64::MAX / s.usage_step.max(1));
        let usage_score = (s.usage_base - usage.saturating_mul(s.usage_step)).max(0);
        let category_score = s.category_weights.weight(template.category);
        priority_score + usage_score + category_score
    }

    /// Picks the best eligible template, or `None` when nothing qualifies.
    ///
    /// Pure: the caller records the selection with [`mark_asked`].
    pub fn select<'t>(
        &self,
        templates: &'t [ProactiveQuestionTemplate],
        context: &QuestionContext,
        persona_id: &str,
        now: DateTime<Utc>,
    ) -> Option<&'t ProactiveQuestionTemplate> {
        let mut eligible: Vec<(&ProactiveQuestionTemplate, i64)> = Vec::new();
        for template in templates {
            match self.check_eligibility(template, context, persona_id, now) {
                Ok(()) => eligible.push((template, self.score(template))),
                Err(Ineligibility::OtherPersona) => {}
                Err(reason) => tracing::debug!(
                    question_id = %template.id,
                    ?reason,
                    "Question not eligible"
                ),
            }
        }

        eligible.sort_by(|a, b| rank(a, b));
        eligible.first().map(|(template, score)| {
            tracing::debug!(question_id = %template.id, score, "Question selected");
            *template
        })
    }
}

/// Records that a template was offered at `now`.
pub fn mark_asked(template: &mut ProactiveQuestionTemplate, now: DateTime<Utc>) {
    template.last_used_at = Some(now);
    template.usage_count += 1;
}

/// Best first: higher score, then lower usage, then id.
fn rank(a: &(&ProactiveQuestionTemplate, i64), b: &(&ProactiveQuestionTemplate, i64)) -> Ordering {
    b.1.cmp(&a.1)
        .then_with(|| a.0.usage_count.cmp(&b.0.usage_count))
        .then_with(|| a.0.id.cmp(&b.0.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowThresholds;
    use crate::question::{QuestionCategory, TriggerConditions};
    use chrono::Duration;

    fn template(id: &str, priority: u32, min_session_length: u32, cooldown_minutes: u32) -> ProactiveQuestionTemplate {
        ProactiveQuestionTemplate {
            id: id.to_string(),
            persona_id: "p1".to_string(),
            category: QuestionCategory::Expertise,
            question_text: format!("question {}", id),
            follow_up_questions: Vec::new(),
            trigger_conditions: TriggerConditions {
                context_keywords: ["branding".to_string()].into_iter().collect(),
                min_session_length,
                cooldown_minutes,
                priority,
            },
            usage_count: 0,
            last_used_at: None,
            success_rate: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn context(message_count: u32, topics: &[&str]) -> QuestionContext {
        QuestionContext::new(
            "s1",
            "admin@example.com",
            message_count,
            topics.iter().map(|t| t.to_string()).collect(),
            &FlowThresholds::default(),
        )
    }

    #[test]
    fn test_short_session_is_ineligible_regardless_of_keywords() {
        let selector = QuestionSelector::default();
        let templates = vec![template("q1", 1, 5, 0)];
        let ctx = context(3, &["branding"]);

        assert!(selector.select(&templates, &ctx, "p1", Utc::now()).is_none());
        assert_eq!(
            selector.check_eligibility(&templates[0], &ctx, "p1", Utc::now()),
            Err(Ineligibility::SessionTooShort)
        );
    }

    #[test]
    fn test_cooldown_excludes_until_elapsed() {
        let selector = QuestionSelector::default();
        let now = Utc::now();
        let mut q = template("q1", 1, 0, 30);
        q.last_used_at = Some(now - Duration::minutes(10));
        let templates = vec![q];
        let ctx = context(10, &["branding"]);

        assert!(selector.select(&templates, &ctx, "p1", now).is_none());
        let later = now + Duration::minutes(31);
        assert_eq!(selector.select(&templates, &ctx, "p1", later).unwrap().id, "q1");
    }

    #[test]
    fn test_cooldown_is_per_template() {
        let selector = QuestionSelector::default();
        let now = Utc::now();
        let mut asked = template("q1", 1, 0, 30);
        asked.last_used_at = Some(now);
        let fresh = template("q2", 5, 0, 30);
        let templates = vec![asked, fresh];

        let selected = selector.select(&templates, &context(10, &["branding"]), "p1", now);
        assert_eq!(selected.unwrap().id, "q2");
    }

    #[test]
    fn test_higher_priority_wins() {
        let selector = QuestionSelector::default();
        let templates = vec![template("low", 5, 0, 0), template("high", 2, 0, 0)];
        assert_eq!(selector.score(&templates[1]), 90 + 50 + 10);
        assert_eq!(selector.score(&templates[0]), 60 + 50 + 10);

        let selected = selector.select(&templates, &context(10, &["branding"]), "p1", Utc::now());
        assert_eq!(selected.unwrap().id, "high");
    }

    #[test]
    fn test_usage_score_floors_at_zero() {
        let selector = QuestionSelector::default();
        let mut q = template("q1", 10, 0, 0);
        q.usage_count = 25;
        assert_eq!(selector.score(&q), 10 + 10);
    }

    #[test]
    fn test_ties_prefer_lower_usage() {
        let selector = QuestionSelector::default();
        let mut a = template("a", 1, 0, 0);
        let mut b = template("b", 1, 0, 0);
        // Both usage scores floor at zero, so the totals tie.
        a.usage_count = 20;
        b.usage_count = 12;
        let templates = vec![a, b];

        let selected = selector.select(&templates, &context(10, &["branding"]), "p1", Utc::now());
        assert_eq!(selected.unwrap().id, "b");
    }

    #[test]
    fn test_topics_are_required() {
        let selector = QuestionSelector::default();
        let templates = vec![template("q1", 1, 0, 0)];
        assert!(selector.select(&templates, &context(10, &[]), "p1", Utc::now()).is_none());
        assert!(selector.select(&templates, &context(10, &["reels"]), "p1", Utc::now()).is_none());
        assert!(selector.select(&templates, &context(10, &["brand"]), "p1", Utc::now()).is_some());
    }

    #[test]
    fn test_other_persona_templates_are_skipped() {
        let selector = QuestionSelector::default();
        let templates = vec![template("q1", 1, 0, 0)];
        assert!(selector.select(&templates, &context(10, &["branding"]), "p2", Utc::now()).is_none());
    }

    #[test]
    fn test_mark_asked_increments_once() {
        let now = Utc::now();
        let mut q = template("q1", 1, 0, 0);
        mark_asked(&mut q, now);
        assert_eq!(q.usage_count, 1);
        assert_eq!(q.last_used_at, Some(now));
    }
}
