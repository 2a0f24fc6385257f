use std::path::{Path, PathBuf};

use conjugar_algo::{Difficulty, Strictness};
use thiserror::Error;

const APP_DIR: &str = "conjugar";
const DB_FILE: &str = "progress.db";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Process configuration read from the environment (and `.env`).
///
/// The optional drill fields override the persisted [`crate::settings::AppSettings`].
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub credentials_dir: PathBuf,
    pub log_level: String,
    pub difficulty: Option<Difficulty>,
    pub exercise_count: Option<usize>,
    pub strictness: Option<Strictness>,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = std::env::var("CONJUGAR_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(".conjugar"));

        let db_path = std::env::var("CONJUGAR_DB_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DB_FILE));

        let credentials_dir = std::env::var("CONJUGAR_CREDENTIALS_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DIR)))
            .unwrap_or_else(|| data_dir.join("credentials"));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());

        let difficulty = std::env::var("CONJUGAR_DIFFICULTY")
            .ok()
            .and_then(|value| Difficulty::from_str(&value));

        let exercise_count = std::env::var("CONJUGAR_EXERCISE_COUNT")
            .ok()
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|count| *count > 0);

        let strictness = std::env::var("CONJUGAR_STRICTNESS")
            .ok()
            .and_then(|value| Strictness::from_str(&value));

        Self {
            data_dir,
            db_path,
            credentials_dir,
            log_level,
            difficulty,
            exercise_count,
            strictness,
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| ConfigError::io(&self.data_dir, e))
    }
}
