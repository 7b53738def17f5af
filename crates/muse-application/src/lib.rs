//! Application layer for Muse.
//!
//! Use cases that coordinate the pure selection logic of `muse-core` with
//! the injected stores: the per-turn `PersonaEngine`, the administrative
//! `CatalogService`, context building and escalation delivery.

pub mod catalog_service;
pub mod context_builder;
pub mod engine;
pub mod escalation;

pub use catalog_service::{CatalogService, SeedReport};
pub use context_builder::{ContextBuilder, TurnInput};
pub use engine::{FeedbackOutcome, PersonaEngine, PersonaEngineBuilder, TurnPlan};
pub use escalation::{LoggingEscalationNotifier, QueuedEscalationNotifier};
