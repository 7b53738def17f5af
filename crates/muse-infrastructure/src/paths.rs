//! Unified path management for muse data files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/muse/              # Config directory (platform default)
//! ├── engine.toml              # Engine weights and thresholds
//! ├── catalog.toml             # Personas and proactive questions
//! └── interactions.jsonl       # Append-only interaction ledger
//! ```

use muse_core::{MuseError, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "muse";

/// Resolves where muse keeps its files.
///
/// A base directory override is used by tests and by the CLI's `--dir` flag.
#[derive(Debug, Clone)]
pub struct MusePaths {
    base_dir: PathBuf,
}

impl MusePaths {
    /// Uses `base_dir` when given, the platform config directory otherwise.
    pub fn new(base_dir: Option<&Path>) -> Result<Self> {
        let base_dir = match base_dir {
            Some(dir) => dir.to_path_buf(),
            None => Self::default_dir()?,
        };
        Ok(Self { base_dir })
    }

    /// `~/.config/muse` on Linux, the platform equivalent elsewhere.
    pub fn default_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| MuseError::configuration("Cannot find config directory"))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn engine_config_file(&self) -> PathBuf {
        self.base_dir.join("engine.toml")
    }

    pub fn catalog_file(&self) -> PathBuf {
        self.base_dir.join("catalog.toml")
    }

    pub fn ledger_file(&self) -> PathBuf {
        self.base_dir.join("interactions.jsonl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_dir() {
        let paths = MusePaths::new(Some(Path::new("/tmp/muse-test"))).unwrap();
        assert_eq!(paths.catalog_file(), PathBuf::from("/tmp/muse-test/catalog.toml"));
        assert_eq!(paths.ledger_file(), PathBuf::from("/tmp/muse-test/interactions.jsonl"));
    }
}
