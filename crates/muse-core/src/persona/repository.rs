//! Persona repository trait.
//!
//! Defines the interface for persona catalog persistence.

use chrono::{DateTime, Utc};

use super::model::PersonaDefinition;
use crate::error::Result;

/// An abstract repository for the persona catalog.
///
/// The host owns the storage (TOML file, SQL table, in-memory map); the
/// engine only goes through this trait.
///
/// # Implementation Notes
///
/// Counter updates follow last-write-wins semantics. `increment_usage` should
/// use whatever native atomic increment the store offers.
#[async_trait::async_trait]
pub trait PersonaRepository: Send + Sync {
    /// Retrieves every persona, active or not.
    async fn get_all(&self) -> Result<Vec<PersonaDefinition>>;

    /// Retrieves a persona by id.
    ///
    /// Returns `Ok(None)` when no persona has that id.
    async fn get_by_id(&self, id: &str) -> Result<Option<PersonaDefinition>>;

    /// Inserts the persona or replaces the stored one with the same id.
    async fn upsert(&self, persona: &PersonaDefinition) -> Result<()>;

    /// Soft-deletes a persona (`is_active = false`), stamping `updated_at = at`.
    async fn deactivate(&self, id: &str, at: DateTime<Utc>) -> Result<()>;

    /// Adds one to the persona's `usage_count` and returns the new value.
    async fn increment_usage(&self, id: &str) -> Result<u64>;
}
