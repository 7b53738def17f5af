//! Loading and saving `engine.toml`.

use muse_core::{EngineConfig, Result};
use std::path::Path;

use crate::storage::AtomicTomlFile;

/// Reads the engine configuration at `path`.
///
/// A missing file yields the defaults. Whatever is loaded is validated, so
/// callers get either a usable configuration or a `Configuration` error.
pub fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    let file = AtomicTomlFile::<EngineConfig>::new(path.to_path_buf());
    let config = match file.load()? {
        Some(config) => {
            tracing::debug!("Loaded engine config from {}", path.display());
            config
        }
        None => {
            tracing::debug!("No engine config at {}, using defaults", path.display());
            EngineConfig::default()
        }
    };
    config.validate()?;
    Ok(config)
}

/// Validates and atomically writes `config` to `path`.
pub fn save_engine_config(path: &Path, config: &EngineConfig) -> Result<()> {
    config.validate()?;
    AtomicTomlFile::<EngineConfig>::new(path.to_path_buf()).save(config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_engine_config(&temp_dir.path().join("engine.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("engine.toml");
        std::fs::write(&path, "[persona]\nmin_score = 0.25\n\n[flow]\ninitial_max = 3\n").unwrap();

        let config = load_engine_config(&path).unwrap();
        assert_eq!(config.persona.min_score, 0.25);
        assert_eq!(config.persona.keyword_relevance, 0.4);
        assert_eq!(config.flow.initial_max, 3);
        assert_eq!(config.flow.deepening_max, 15);
    }

    #[test]
    fn test_invalid_file_is_a_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("engine.toml");
        std::fs::write(&path, "[persona]\nmin_score = 1.5\n").unwrap();

        let err = load_engine_config(&path).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("engine.toml");
        let mut config = EngineConfig::default();
        config.question.category_weights.business = 12;

        save_engine_config(&path, &config).unwrap();
        assert_eq!(load_engine_config(&path).unwrap(), config);
    }
}
