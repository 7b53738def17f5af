//! Default question bank.

use chrono::{DateTime, Utc};

use super::model::{ProactiveQuestionTemplate, QuestionCategory, TriggerConditions};
use crate::persona::{ATOZIT_UUID, MOMENT_RYAN_UUID};

struct Seed {
    id: &'static str,
    persona_id: &'static str,
    category: QuestionCategory,
    text: &'static str,
    follow_ups: &'static [&'static str],
    keywords: &'static [&'static str],
    min_session_length: u32,
    cooldown_minutes: u32,
    priority: u32,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "q-ryan-branding-process",
        persona_id: MOMENT_RYAN_UUID,
        category: QuestionCategory::Expertise,
        text: "When you start a branding project, what is the very first thing you look at?",
        follow_ups: &[
            "How specifically did that first step change the final brand?",
            "Was there an actual client where that approach failed?",
        ],
        keywords: &["branding", "brand", "positioning"],
        min_session_length: 3,
        cooldown_minutes: 60,
        priority: 2,
    },
    Seed {
        id: "q-ryan-positioning-mistake",
        persona_id: MOMENT_RYAN_UUID,
        category: QuestionCategory::Experience,
        text: "What is the most common positioning mistake you see small businesses make?",
        follow_ups: &[
            "Could you share an actual experience where you fixed that mistake?",
            "How would you explain the fix to a first-time founder?",
        ],
        keywords: &["positioning", "marketing", "strategy"],
        min_session_length: 5,
        cooldown_minutes: 120,
        priority: 3,
    },
    Seed {
        id: "q-ryan-writing-voice",
        persona_id: MOMENT_RYAN_UUID,
        category: QuestionCategory::WritingStyle,
        text: "How do you decide the tone of a newsletter issue before you write it?",
        follow_ups: &["What specifically makes a sentence sound like you?"],
        keywords: &["newsletter", "writing", "storytelling"],
        min_session_length: 8,
        cooldown_minutes: 240,
        priority: 5,
    },
    Seed {
        id: "q-atozit-reels-hook",
        persona_id: ATOZIT_UUID,
        category: QuestionCategory::Methodology,
        text: "How do you plan the first three seconds of a reel?",
        follow_ups: &[
            "How specifically do you test which hook works?",
            "What was your actual experience with a hook that flopped?",
        ],
        keywords: &["reels", "video", "hook"],
        min_session_length: 3,
        cooldown_minutes: 60,
        priority: 2,
    },
    Seed {
        id: "q-atozit-monetization",
        persona_id: ATOZIT_UUID,
        category: QuestionCategory::Business,
        text: "At what follower count did monetization start to make sense for you?",
        follow_ups: &["What actual revenue streams came first?"],
        keywords: &["growth", "creator", "instagram", "monetization"],
        min_session_length: 6,
        cooldown_minutes: 180,
        priority: 4,
    },
];

/// Returns the preset proactive questions for the preset personas.
pub fn get_default_questions(now: DateTime<Utc>) -> Vec<ProactiveQuestionTemplate> {
    SEEDS
        .iter()
        .map(|seed| ProactiveQuestionTemplate {
            id: seed.id.to_string(),
            persona_id: seed.persona_id.to_string(),
            category: seed.category,
            question_text: seed.text.to_string(),
            follow_up_questions: seed.follow_ups.iter().map(|s| s.to_string()).collect(),
            trigger_conditions: TriggerConditions {
                context_keywords: seed.keywords.iter().map(|s| s.to_string()).collect(),
                min_session_length: seed.min_session_length,
                cooldown_minutes: seed.cooldown_minutes,
                priority: seed.priority,
            },
            usage_count: 0,
            last_used_at: None,
            success_rate: None,
            is_active: true,
            created_at: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_questions_have_unique_ids() {
        let questions = get_default_questions(Utc::now());
        let mut ids: Vec<_> = questions.iter().map(|q| q.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), questions.len());
        assert!(questions.iter().all(|q| !q.trigger_conditions.context_keywords.is_empty()));
    }
}
