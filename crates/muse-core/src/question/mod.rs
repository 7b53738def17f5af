//! Proactive question domain module.
//!
//! - `model`: `ProactiveQuestionTemplate`, its category and trigger conditions
//! - `context`: `QuestionContext` and the derived `ConversationFlow`
//! - `repository`: Repository trait for the question bank
//! - `preset`: Default question bank for the preset personas

mod context;
mod model;
mod preset;
mod repository;

pub use context::{ConversationFlow, QuestionContext};
pub use model::{ProactiveQuestionTemplate, QuestionCategory, TriggerConditions};
pub use preset::get_default_questions;
pub use repository::QuestionRepository;
