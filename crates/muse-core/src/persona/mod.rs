//! Persona domain module.
//!
//! This module contains the persona catalog model, the per-turn selection
//! context, the repository interface, and preset definitions.
//!
//! # Module Structure
//!
//! - `model`: `PersonaDefinition` and its metadata
//! - `context`: `PersonaContext` handed to the selector every turn
//! - `repository`: Repository trait for catalog persistence
//! - `preset`: Default personas, including the generic fallback
//! - `request`: Administrative create/edit request

mod context;
mod model;
mod preset;
mod repository;
pub mod request;

// Re-export public API
pub use context::{PersonaContext, RecentInteraction, Sentiment};
pub use model::{
    CommunicationStyle, Formality, PersonaDefinition, PersonaKind, PersonaMetadata,
    RealPersonInfo, ResponseLength,
};
pub use preset::{ATOZIT_UUID, GENERIC_UUID, MOMENT_RYAN_UUID, get_default_presets};
pub use repository::PersonaRepository;
pub use request::CreatePersonaRequest;
