//! Default persona presets.
//!
//! Installed into an empty catalog so the engine always has a generic fallback.

use chrono::{DateTime, Utc};

use super::model::{
    CommunicationStyle, Formality, PersonaDefinition, PersonaKind, PersonaMetadata,
    RealPersonInfo, ResponseLength,
};

/// UUID for the moment.ryan persona (deterministic UUID v5 from "moment.ryan")
pub const MOMENT_RYAN_UUID: &str = "5b0c9d1e-3f7a-5c2b-8e4d-1a6f9b3c7d20";

/// UUID for the atozit persona (deterministic UUID v5 from "atozit")
pub const ATOZIT_UUID: &str = "9e2a4c6b-8d1f-5a3e-b7c9-2f4d6e8a0b13";

/// UUID for the generic fallback persona
pub const GENERIC_UUID: &str = "0f1e2d3c-4b5a-5968-8776-a5b4c3d2e1f0";

fn keywords(words: &[&str]) -> std::collections::BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Returns the preset personas shipped with the engine.
///
/// - **moment.ryan**: brand strategist, branding and positioning topics
/// - **atozit**: content creator, short-form video and social growth topics
/// - **generic**: neutral assistant, always active, used as fallback
pub fn get_default_presets(now: DateTime<Utc>) -> Vec<PersonaDefinition> {
    vec![
        PersonaDefinition {
            id: MOMENT_RYAN_UUID.to_string(),
            display_identifier: PersonaKind::MomentRyan,
            name: "Moment Ryan".to_string(),
            expertise_keywords: keywords(&[
                "branding",
                "brand",
                "positioning",
                "marketing",
                "storytelling",
                "identity",
                "strategy",
            ]),
            communication_style: CommunicationStyle {
                tone: "Warm and reflective, grounds advice in stories from real brands".to_string(),
                formality: Formality::Balanced,
                response_length: ResponseLength::Medium,
                signature: Some("- Ryan".to_string()),
            },
            metadata: PersonaMetadata::new(1, now),
            real_person_info: Some(RealPersonInfo {
                name: "Ryan".to_string(),
                email: None,
                profile_url: None,
            }),
        },
        PersonaDefinition {
            id: ATOZIT_UUID.to_string(),
            display_identifier: PersonaKind::AtoZit,
            name: "AtoZit".to_string(),
            expertise_keywords: keywords(&[
                "content",
                "reels",
                "instagram",
                "creator",
                "video",
                "growth",
                "sns",
            ]),
            communication_style: CommunicationStyle {
                tone: "Energetic and practical, step-by-step playbooks".to_string(),
                formality: Formality::Casual,
                response_length: ResponseLength::Short,
                signature: None,
            },
            metadata: PersonaMetadata::new(1, now),
            real_person_info: None,
        },
        PersonaDefinition {
            id: GENERIC_UUID.to_string(),
            display_identifier: PersonaKind::Generic,
            name: "Assistant".to_string(),
            expertise_keywords: Default::default(),
            communication_style: CommunicationStyle {
                tone: "Neutral, helpful and concise".to_string(),
                formality: Formality::Balanced,
                response_length: ResponseLength::Medium,
                signature: None,
            },
            metadata: PersonaMetadata::new(5, now),
            real_person_info: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_have_single_active_fallback() {
        let presets = get_default_presets(Utc::now());
        let fallbacks: Vec<_> = presets
            .iter()
            .filter(|p| p.is_fallback() && p.is_active())
            .collect();
        assert_eq!(fallbacks.len(), 1);
        assert_eq!(fallbacks[0].id, GENERIC_UUID);
    }
}
