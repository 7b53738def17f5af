//! Persistence adapters for the Muse engine.

pub mod catalog_storage;
pub mod config_loader;
pub mod dto;
pub mod in_memory;
pub mod jsonl_interaction_ledger;
pub mod paths;
pub mod storage;
pub mod toml_persona_repository;
pub mod toml_question_repository;

pub use crate::config_loader::{load_engine_config, save_engine_config};
pub use crate::in_memory::{
    InMemoryInteractionLedger, InMemoryPersonaRepository, InMemoryQuestionRepository,
};
pub use crate::jsonl_interaction_ledger::JsonlInteractionLedger;
pub use crate::paths::MusePaths;
pub use crate::toml_persona_repository::TomlPersonaRepository;
pub use crate::toml_question_repository::TomlQuestionRepository;
