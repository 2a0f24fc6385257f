#![allow(dead_code)]

use std::path::Path;

use conjugar::storage::Storage;
use conjugar::{App, AppSettings, Config};

pub fn test_config(dir: &Path) -> Config {
    Config {
        data_dir: dir.to_path_buf(),
        db_path: dir.join("progress.db"),
        credentials_dir: dir.join("credentials"),
        log_level: "warn".to_string(),
        difficulty: None,
        exercise_count: None,
        strictness: None,
    }
}

/// App over a database file in `dir`, translations hidden to keep output short
pub fn test_app(dir: &Path) -> App {
    let config = test_config(dir);
    let storage = Storage::new(&config.db_path).expect("open storage");
    let settings = AppSettings {
        show_translation: false,
        ..AppSettings::default()
    };
    App::with_storage(config, settings, storage)
}

/// Scripted input: one answer per line
pub fn script(answers: &[String]) -> Vec<u8> {
    let mut input = answers.join("\n");
    input.push('\n');
    input.into_bytes()
}
