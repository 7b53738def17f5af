//! Versioned DTOs for the catalog file.
//!
//! Each entry carries its own schema `version`, so one file can hold records
//! written by different releases:
//!
//! ```toml
//! [[persona]]
//! version = "1.1.0"
//! id = "..."
//! display_identifier = "moment.ryan"
//!
//! [[question]]
//! version = "1.0.0"
//! id = "..."
//! persona_id = "..."
//! ```

mod persona;
mod question;

pub use persona::{PersonaRecord, PersonaRecordV1_0_0, PersonaRecordV1_1_0};
pub use question::QuestionRecordV1_0_0;

use muse_core::persona::PersonaDefinition;
use muse_core::question::ProactiveQuestionTemplate;
use muse_core::{MuseError, Result};
use serde::{Deserialize, Serialize};
use version_migrate::Migrator;

pub const PERSONA_ENTITY: &str = "persona";
pub const QUESTION_ENTITY: &str = "question";

/// The catalog as stored: undecoded entries, migrated on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(rename = "persona", default)]
    pub personas: Vec<toml::Value>,
    #[serde(rename = "question", default)]
    pub questions: Vec<toml::Value>,
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates a Migrator for both catalog entities.
///
/// # Migration Path
///
/// - persona: V1.0.0 → V1.1.0 → PersonaDefinition
/// - question: V1.0.0 → ProactiveQuestionTemplate
pub fn create_catalog_migrator() -> Result<Migrator> {
    let mut migrator = Migrator::builder().build();

    let persona_path = Migrator::define(PERSONA_ENTITY)
        .from::<PersonaRecordV1_0_0>()
        .step::<PersonaRecordV1_1_0>()
        .into_with_save::<PersonaDefinition>();
    migrator
        .register(persona_path)
        .map_err(|e| MuseError::internal(format!("persona migration path: {}", e)))?;

    let question_path = Migrator::define(QUESTION_ENTITY)
        .from::<QuestionRecordV1_0_0>()
        .into_with_save::<ProactiveQuestionTemplate>();
    migrator
        .register(question_path)
        .map_err(|e| MuseError::internal(format!("question migration path: {}", e)))?;

    Ok(migrator)
}

/// Decodes one stored entry, upgrading it to the latest schema.
pub fn load_entry<D>(migrator: &Migrator, entity: &str, entry: toml::Value) -> Result<D>
where
    D: serde::de::DeserializeOwned,
{
    let domain: D = migrator
        .load_flat_from(entity, entry)
        .map_err(|e| serialization_error(format!("cannot migrate {} entry: {}", entity, e)))?;
    Ok(domain)
}

/// Encodes one domain value as an entry of the latest schema.
pub fn save_entry<D>(migrator: &Migrator, entity: &str, domain: &D) -> Result<toml::Value>
where
    D: Serialize,
{
    let json_str = migrator
        .save_domain_flat(entity, domain)
        .map_err(|e| serialization_error(format!("cannot encode {} entry: {}", entity, e)))?;
    let json_value: serde_json::Value = serde_json::from_str(&json_str)?;
    json_to_toml(&json_value)
}

fn serialization_error(message: String) -> MuseError {
    MuseError::Serialization {
        format: "TOML".to_string(),
        message,
    }
}

/// Converts migrator output to TOML. TOML has no null, so null fields are
/// dropped and read back through their serde defaults.
fn json_to_toml(json: &serde_json::Value) -> Result<toml::Value> {
    match json {
        serde_json::Value::Null => Err(serialization_error("null outside a table".to_string())),
        serde_json::Value::Bool(b) => Ok(toml::Value::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(toml::Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(toml::Value::Float(f))
            } else {
                Err(serialization_error(format!("unsupported JSON number: {}", n)))
            }
        }
        serde_json::Value::String(s) => Ok(toml::Value::String(s.clone())),
        serde_json::Value::Array(arr) => {
            let items: Result<Vec<toml::Value>> = arr.iter().map(json_to_toml).collect();
            Ok(toml::Value::Array(items?))
        }
        serde_json::Value::Object(obj) => {
            let mut table = toml::map::Map::new();
            for (key, value) in obj.iter().filter(|(_, v)| !v.is_null()) {
                table.insert(key.clone(), json_to_toml(value)?);
            }
            Ok(toml::Value::Table(table))
        }
    }
}
