//! Selection algorithms.
//!
//! Pure functions over catalog snapshots; persistence of the side effects is
//! the caller's job (see `muse_application::PersonaEngine`).

mod follow_up;
mod persona_selector;
mod question_selector;

pub use follow_up::FollowUpGenerator;
pub use persona_selector::{PersonaScore, PersonaSelection, PersonaSelector, SelectionReason};
pub use question_selector::{Ineligibility, QuestionSelector, mark_asked};
