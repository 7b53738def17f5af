//! Persona domain model.
//!
//! A persona is a named response voice with its own expertise vocabulary and
//! tone. The metadata block carries the ranking signals the selector reads and
//! the recalibrator writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a supported persona voice.
///
/// Serialized as the plain string used by the chat product
/// (`"moment.ryan"`, `"atozit"`, `"generic"`); anything else is a custom persona.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PersonaKind {
    MomentRyan,
    AtoZit,
    /// The default voice used when nothing else qualifies
    Generic,
    Custom(String),
}

impl PersonaKind {
    pub fn as_str(&self) -> &str {
        match self {
            PersonaKind::MomentRyan => "moment.ryan",
            PersonaKind::AtoZit => "atozit",
            PersonaKind::Generic => "generic",
            PersonaKind::Custom(name) => name,
        }
    }

    /// Whether this identifier marks the designated fallback persona.
    pub fn is_fallback(&self) -> bool {
        matches!(self, PersonaKind::Generic)
    }
}

impl From<String> for PersonaKind {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "moment.ryan" => PersonaKind::MomentRyan,
            "atozit" => PersonaKind::AtoZit,
            "generic" | "default" => PersonaKind::Generic,
            _ => PersonaKind::Custom(value),
        }
    }
}

impl From<&str> for PersonaKind {
    fn from(value: &str) -> Self {
        PersonaKind::from(value.to_string())
    }
}

impl From<PersonaKind> for String {
    fn from(kind: PersonaKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for PersonaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Formality {
    Casual,
    #[default]
    Balanced,
    Formal,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// How a persona sounds. Consumed by prompt construction only.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct CommunicationStyle {
    pub tone: String,
    #[serde(default)]
    pub formality: Formality,
    #[serde(default)]
    pub response_length: ResponseLength,
    /// Sign-off phrase appended by the prompt layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Ranking signals and lifecycle data of a persona.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PersonaMetadata {
    pub is_active: bool,
    /// 1 = highest
    pub priority: u32,
    #[serde(default)]
    pub usage_count: u64,
    /// Running average of normalized ratings, within [0, 1]
    #[serde(default)]
    pub satisfaction: f64,
    /// Accepted share of automatic switches, within [0, 1]
    #[serde(default)]
    pub switch_success_rate: f64,
    /// Ratings folded into `satisfaction`
    #[serde(default)]
    pub rating_count: u64,
    #[serde(default)]
    pub switch_attempts: u64,
    #[serde(default)]
    pub switch_accepts: u64,
    #[serde(default = "default_version")]
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

impl PersonaMetadata {
    /// Fresh metadata for a newly created persona.
    pub fn new(priority: u32, now: DateTime<Utc>) -> Self {
        Self {
            is_active: true,
            priority,
            usage_count: 0,
            satisfaction: 0.0,
            switch_success_rate: 0.0,
            rating_count: 0,
            switch_attempts: 0,
            switch_accepts: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Binding of a persona to the real person behind it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RealPersonInfo {
    pub name: String,
    /// Admin account allowed to run training sessions for this persona
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
}

/// A curated persona the engine can answer with.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PersonaDefinition {
    /// Unique identifier (UUID format)
    pub id: String,
    pub display_identifier: PersonaKind,
    /// Display name of the persona
    pub name: String,
    /// Vocabulary matched against session topics
    #[serde(default)]
    pub expertise_keywords: BTreeSet<String>,
    #[serde(default)]
    pub communication_style: CommunicationStyle,
    pub metadata: PersonaMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_person_info: Option<RealPersonInfo>,
}

impl PersonaDefinition {
    pub fn is_active(&self) -> bool {
        self.metadata.is_active
    }

    pub fn is_fallback(&self) -> bool {
        self.display_identifier.is_fallback()
    }

    /// Whether `subject_id` is the admin bound to this persona.
    pub fn is_bound_to(&self, subject_id: &str) -> bool {
        self.real_person_info
            .as_ref()
            .and_then(|info| info.email.as_deref())
            .is_some_and(|email| email.eq_ignore_ascii_case(subject_id.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_kind_round_trips_through_strings() {
        assert_eq!(PersonaKind::from("moment.ryan"), PersonaKind::MomentRyan);
        assert_eq!(PersonaKind::from("AtoZit"), PersonaKind::AtoZit);
        assert_eq!(PersonaKind::from("default"), PersonaKind::Generic);
        assert_eq!(
            PersonaKind::from("coach.kim"),
            PersonaKind::Custom("coach.kim".to_string())
        );
        assert_eq!(String::from(PersonaKind::MomentRyan), "moment.ryan");
    }

    #[test]
    fn test_persona_kind_serde() {
        let json = serde_json::to_string(&PersonaKind::AtoZit).unwrap();
        assert_eq!(json, "\"atozit\"");
        let kind: PersonaKind = serde_json::from_str("\"generic\"").unwrap();
        assert!(kind.is_fallback());
    }

    #[test]
    fn test_is_bound_to_ignores_case() {
        let now = Utc::now();
        let persona = PersonaDefinition {
            id: "p1".to_string(),
            display_identifier: PersonaKind::MomentRyan,
            name: "Ryan".to_string(),
            expertise_keywords: BTreeSet::new(),
            communication_style: CommunicationStyle::default(),
            metadata: PersonaMetadata::new(1, now),
            real_person_info: Some(RealPersonInfo {
                name: "Ryan".to_string(),
                email: Some("Ryan@Example.com".to_string()),
                profile_url: None,
            }),
        };

        assert!(persona.is_bound_to("ryan@example.com"));
        assert!(!persona.is_bound_to("someone@example.com"));
    }
}
