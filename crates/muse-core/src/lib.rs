//! Domain layer of the Muse persona engine.
//!
//! Models, repository traits and the pure selection/recalibration logic.
//! Nothing in this crate performs I/O.

pub mod clock;
pub mod config;
pub mod error;
pub mod feedback;
pub mod heuristics;
pub mod interaction;
pub mod persona;
pub mod question;
pub mod recalibration;
pub mod selection;

// Re-export common types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use error::{MuseError, Result};
