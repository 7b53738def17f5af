//! Persona DTOs and migrations
//!
//! ## Version History
//! - **1.0.0**: Satisfaction and switch success stored as bare rates
//! - **1.1.0**: Adds `rating_count`, `switch_attempts` and `switch_accepts`
//!   so the rates can be folded as running averages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use muse_core::persona::{
    CommunicationStyle, PersonaDefinition, PersonaKind, PersonaMetadata, RealPersonInfo,
};

/// Persona record V1.0.0.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct PersonaRecordV1_0_0 {
    pub id: String,
    pub display_identifier: String,
    pub name: String,
    pub is_active: bool,
    pub priority: u32,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub satisfaction: f64,
    #[serde(default)]
    pub switch_success_rate: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub expertise_keywords: Vec<String>,
    #[serde(default)]
    pub communication_style: CommunicationStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_person_info: Option<RealPersonInfo>,
}

/// Persona record V1.1.0.
///
/// `revision` is the persona's own edit counter; the top-level `version`
/// key belongs to the schema.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
pub struct PersonaRecordV1_1_0 {
    pub id: String,
    pub display_identifier: String,
    pub name: String,
    pub is_active: bool,
    pub priority: u32,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub satisfaction: f64,
    #[serde(default)]
    pub switch_success_rate: f64,
    #[serde(default)]
    pub rating_count: u64,
    #[serde(default)]
    pub switch_attempts: u64,
    #[serde(default)]
    pub switch_accepts: u64,
    #[serde(default = "default_revision")]
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub expertise_keywords: Vec<String>,
    #[serde(default)]
    pub communication_style: CommunicationStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_person_info: Option<RealPersonInfo>,
}

/// Type alias for the latest persona record version.
pub type PersonaRecord = PersonaRecordV1_1_0;

fn default_revision() -> u32 {
    1
}

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from V1.0.0 to V1.1.0.
///
/// The old rates are kept as they are; the counters start from zero, so the
/// first new rating or switch outcome replaces them.
impl MigratesTo<PersonaRecordV1_1_0> for PersonaRecordV1_0_0 {
    fn migrate(self) -> PersonaRecordV1_1_0 {
        PersonaRecordV1_1_0 {
            id: self.id,
            display_identifier: self.display_identifier,
            name: self.name,
            is_active: self.is_active,
            priority: self.priority,
            usage_count: self.usage_count,
            satisfaction: self.satisfaction,
            switch_success_rate: self.switch_success_rate,
            rating_count: 0,
            switch_attempts: 0,
            switch_accepts: 0,
            revision: default_revision(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            expertise_keywords: self.expertise_keywords,
            communication_style: self.communication_style,
            real_person_info: self.real_person_info,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<PersonaDefinition> for PersonaRecordV1_1_0 {
    fn into_domain(self) -> PersonaDefinition {
        PersonaDefinition {
            id: self.id,
            display_identifier: PersonaKind::from(self.display_identifier),
            name: self.name,
            expertise_keywords: self
                .expertise_keywords
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            communication_style: self.communication_style,
            metadata: PersonaMetadata {
                is_active: self.is_active,
                priority: self.priority.max(1),
                usage_count: self.usage_count,
                satisfaction: self.satisfaction.clamp(0.0, 1.0),
                switch_success_rate: self.switch_success_rate.clamp(0.0, 1.0),
                rating_count: self.rating_count,
                switch_attempts: self.switch_attempts,
                switch_accepts: self.switch_accepts,
                version: self.revision,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            real_person_info: self.real_person_info,
        }
    }
}

impl FromDomain<PersonaDefinition> for PersonaRecordV1_1_0 {
    fn from_domain(persona: PersonaDefinition) -> Self {
        let meta = persona.metadata;
        PersonaRecordV1_1_0 {
            id: persona.id,
            display_identifier: persona.display_identifier.to_string(),
            name: persona.name,
            is_active: meta.is_active,
            priority: meta.priority,
            usage_count: meta.usage_count,
            satisfaction: meta.satisfaction,
            switch_success_rate: meta.switch_success_rate,
            rating_count: meta.rating_count,
            switch_attempts: meta.switch_attempts,
            switch_accepts: meta.switch_accepts,
            revision: meta.version,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
            expertise_keywords: persona.expertise_keywords.into_iter().collect(),
            communication_style: persona.communication_style,
            real_person_info: persona.real_person_info,
        }
    }
}
