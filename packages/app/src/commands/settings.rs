use std::io::Write;

use conjugar_algo::{Difficulty, Strictness};

use super::{print_json, OutputFormat};
use crate::app::App;
use crate::error::{AppError, AppResult};

pub fn run_show<W: Write>(app: &App, out: &mut W, format: OutputFormat) -> AppResult<()> {
    let settings = &app.settings;
    if format == OutputFormat::Json {
        return print_json(out, settings);
    }
    writeln!(out, "strictness       {}", settings.strictness.as_str())?;
    writeln!(out, "count            {}", settings.exercise_count)?;
    writeln!(out, "difficulty       {}", settings.default_difficulty.as_str())?;
    writeln!(out, "translation      {}", settings.show_translation)?;
    writeln!(out)?;
    writeln!(out, "data dir         {}", app.config.data_dir.display())?;
    writeln!(out, "database         {}", app.config.db_path.display())?;
    writeln!(out, "credentials dir  {}", app.config.credentials_dir.display())?;
    Ok(())
}

/// Update one preference and write `settings.json`
pub fn run_set<W: Write>(app: &mut App, out: &mut W, key: &str, value: &str) -> AppResult<()> {
    let invalid = || AppError::InvalidInput(format!("invalid value '{}' for {}", value, key));
    let settings = &mut app.settings;

    match key {
        "strictness" => settings.strictness = Strictness::from_str(value).ok_or_else(invalid)?,
        "count" | "exercise_count" => {
            settings.exercise_count = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(invalid)?
        }
        "difficulty" | "default_difficulty" => {
            settings.default_difficulty = Difficulty::from_str(value).ok_or_else(invalid)?
        }
        "translation" | "show_translation" => {
            settings.show_translation = match value.trim().to_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => true,
                "false" | "off" | "no" | "0" => false,
                _ => return Err(invalid()),
            }
        }
        _ => return Err(AppError::InvalidInput(format!("unknown setting '{}'", key))),
    }

    app.save_settings()?;
    writeln!(out, "{} = {}", key, value.trim())?;
    Ok(())
}
