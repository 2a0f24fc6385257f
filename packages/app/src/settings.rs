//! User preferences stored as `settings.json` in the data directory.
//!
//! Keys missing from the file keep their defaults, unknown keys are ignored.

use std::path::Path;

use conjugar_algo::{Difficulty, Strictness};
use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub strictness: Strictness,
    pub exercise_count: usize,
    pub default_difficulty: Difficulty,
    pub show_translation: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            strictness: Strictness::Normal,
            exercise_count: 10,
            default_difficulty: Difficulty::Intermediate,
            show_translation: true,
        }
    }
}

impl AppSettings {
    /// Load settings, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::io(path, e)),
        };

        let mut settings: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if settings.exercise_count == 0 {
            settings.exercise_count = Self::default().exercise_count;
        }
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        let raw = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::io(path, e))
    }

    /// Apply the environment overrides carried by `config`.
    pub fn with_overrides(mut self, config: &Config) -> Self {
        if let Some(strictness) = config.strictness {
            self.strictness = strictness;
        }
        if let Some(count) = config.exercise_count {
            self.exercise_count = count;
        }
        if let Some(difficulty) = config.difficulty {
            self.default_difficulty = difficulty;
        }
        self
    }
}
