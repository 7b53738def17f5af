//! Persona creation and update request models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::{CommunicationStyle, PersonaDefinition, PersonaKind, PersonaMetadata, RealPersonInfo};
use crate::error::{MuseError, Result};

/// Request to create or edit a persona, issued by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePersonaRequest {
    /// Display name (required)
    pub name: String,

    pub display_identifier: PersonaKind,

    /// Trigger vocabulary (at least one entry unless this is the fallback)
    #[serde(default)]
    pub expertise_keywords: Vec<String>,

    #[serde(default)]
    pub communication_style: CommunicationStyle,

    /// 1 = highest
    #[serde(default = "default_priority")]
    pub priority: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_person_info: Option<RealPersonInfo>,
}

fn default_priority() -> u32 {
    5
}

impl CreatePersonaRequest {
    /// Validate the request and return errors if any.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MuseError::validation(
                "Name is required and cannot be empty",
            ));
        }

        if let PersonaKind::Custom(identifier) = &self.display_identifier {
            if identifier.trim().is_empty() {
                return Err(MuseError::validation(
                    "Custom persona identifier cannot be empty",
                ));
            }
        }

        if self.priority == 0 {
            return Err(MuseError::validation("Priority starts at 1 (highest)"));
        }

        if !self.display_identifier.is_fallback() && self.normalized_keywords().is_empty() {
            return Err(MuseError::validation(
                "At least one expertise keyword is required",
            ));
        }

        Ok(())
    }

    /// Keywords trimmed, lowercased and deduplicated.
    pub fn normalized_keywords(&self) -> BTreeSet<String> {
        self.expertise_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// Convert this request into a persona, always generating a new UUID.
    pub fn into_persona(self, now: DateTime<Utc>) -> PersonaDefinition {
        let expertise_keywords = self.normalized_keywords();
        PersonaDefinition {
            id: Uuid::new_v4().to_string(),
            display_identifier: self.display_identifier,
            name: self.name.trim().to_string(),
            expertise_keywords,
            communication_style: self.communication_style,
            metadata: PersonaMetadata::new(self.priority, now),
            real_person_info: self.real_person_info,
        }
    }

    /// Apply an edit to an existing persona.
    ///
    /// Ranking counters are left untouched; only the recalibrator moves them.
    pub fn apply_to(self, persona: &mut PersonaDefinition, now: DateTime<Utc>) {
        persona.expertise_keywords = self.normalized_keywords();
        persona.name = self.name.trim().to_string();
        persona.display_identifier = self.display_identifier;
        persona.communication_style = self.communication_style;
        persona.metadata.priority = self.priority;
        persona.real_person_info = self.real_person_info;
        persona.metadata.version += 1;
        persona.metadata.updated_at = now;
    }

    /// Create a request from an existing persona (for editing).
    pub fn from_persona(persona: &PersonaDefinition) -> Self {
        Self {
            name: persona.name.clone(),
            display_identifier: persona.display_identifier.clone(),
            expertise_keywords: persona.expertise_keywords.iter().cloned().collect(),
            communication_style: persona.communication_style.clone(),
            priority: persona.metadata.priority,
            real_person_info: persona.real_person_info.clone(),
        }
    }
}
