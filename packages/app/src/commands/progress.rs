use std::io::Write;

use conjugar_algo::{Difficulty, Person, Tense};

use super::{print_json, OutputFormat};
use crate::app::App;
use crate::error::{AppError, AppResult};
use crate::services::{load_learning_path, save_learning_path};

/// "hablar · Preterite · yo" from stored columns
fn describe(verb: &str, tense: &str, person: i64) -> String {
    let tense = Tense::from_str(tense).map(|t| t.display_name()).unwrap_or(tense);
    let person = usize::try_from(person)
        .ok()
        .and_then(Person::from_index)
        .map(|p| p.label())
        .unwrap_or("?");
    format!("{} · {} · {}", verb, tense, person)
}

pub fn run_stats<W: Write>(app: &App, out: &mut W, format: OutputFormat) -> AppResult<()> {
    let stats = app.storage.progress().get_statistics()?;
    if format == OutputFormat::Json {
        return print_json(out, &stats);
    }

    if stats.total_attempts == 0 {
        writeln!(out, "No attempts recorded yet.")?;
        return Ok(());
    }

    writeln!(out, "Attempts:      {}", stats.total_attempts)?;
    writeln!(out, "Correct:       {}", stats.correct_attempts)?;
    writeln!(out, "Accuracy:      {:.1}%", stats.accuracy)?;
    writeln!(out, "Unique verbs:  {}", stats.unique_verbs)?;
    writeln!(out, "Unique tenses: {}", stats.unique_tenses)?;

    if !stats.best_verbs.is_empty() {
        writeln!(out)?;
        writeln!(out, "Best verbs:")?;
        for verb in &stats.best_verbs {
            writeln!(out, "  {:<14} {:>5.1}% ({} attempts)", verb.verb, verb.accuracy, verb.attempts)?;
        }
    }
    if !stats.tense_distribution.is_empty() {
        writeln!(out)?;
        writeln!(out, "By tense:")?;
        for tense in &stats.tense_distribution {
            let name = Tense::from_str(&tense.tense)
                .map(|t| t.display_name())
                .unwrap_or(&tense.tense);
            writeln!(out, "  {:<20} {}", name, tense.count)?;
        }
    }
    Ok(())
}

pub fn run_mistakes<W: Write>(app: &App, out: &mut W, limit: usize, format: OutputFormat) -> AppResult<()> {
    let mistakes = app.storage.progress().get_recent_mistakes(limit)?;
    if format == OutputFormat::Json {
        return print_json(out, &mistakes);
    }
    if mistakes.is_empty() {
        writeln!(out, "No mistakes recorded.")?;
        return Ok(());
    }
    for m in &mistakes {
        writeln!(
            out,
            "{}  {}: '{}' → '{}'",
            m.timestamp.format("%Y-%m-%d %H:%M"),
            describe(&m.verb, &m.tense, m.person),
            m.user_answer,
            m.correct_answer
        )?;
    }
    Ok(())
}

pub fn run_curve<W: Write>(app: &App, out: &mut W, days: u32, format: OutputFormat) -> AppResult<()> {
    let points = app.storage.progress().get_learning_curve(days)?;
    if format == OutputFormat::Json {
        return print_json(out, &points);
    }
    if points.is_empty() {
        writeln!(out, "No practice in the last {} days.", days)?;
        return Ok(());
    }
    for point in &points {
        let bar = "█".repeat((point.accuracy / 5.0).round() as usize);
        writeln!(
            out,
            "{}  {:>4} attempts  {:>5.1}%  {}",
            point.date, point.attempts, point.accuracy, bar
        )?;
    }
    Ok(())
}

pub fn run_weak<W: Write>(app: &App, out: &mut W, limit: usize, format: OutputFormat) -> AppResult<()> {
    let areas = app.storage.progress().get_weak_areas(limit)?;
    if format == OutputFormat::Json {
        return print_json(out, &areas);
    }
    if areas.is_empty() {
        writeln!(out, "No weak areas yet. Keep practicing!")?;
        return Ok(());
    }
    for area in &areas {
        writeln!(
            out,
            "{:<40} {:>5.1}%  ({} right, {} wrong)",
            describe(&area.verb, &area.tense, area.person),
            area.accuracy * 100.0,
            area.correct_count,
            area.incorrect_count
        )?;
    }
    Ok(())
}

pub fn run_sessions<W: Write>(app: &App, out: &mut W, limit: usize, format: OutputFormat) -> AppResult<()> {
    let sessions = app.storage.progress().list_sessions(limit)?;
    if format == OutputFormat::Json {
        return print_json(out, &sessions);
    }
    for session in &sessions {
        writeln!(
            out,
            "#{:<4} {}  {}/{} correct  {}",
            session.id,
            session.start_time.format("%Y-%m-%d %H:%M"),
            session.correct_attempts,
            session.total_attempts,
            session.verbs_practiced.join(", ")
        )?;
    }
    Ok(())
}

// ==================== Learning path ====================

pub fn run_path_show<W: Write>(app: &App, out: &mut W, format: OutputFormat) -> AppResult<()> {
    let path = load_learning_path(&app.storage)?;
    let summary = path.progress_summary();
    if format == OutputFormat::Json {
        return print_json(
            out,
            &serde_json::json!({
                "summary": summary,
                "stage": path.stage_exercises(),
                "recommended": path.recommend_path(None).as_str(),
                "paths": path.available_paths(),
            }),
        );
    }

    writeln!(
        out,
        "{}: stage {}/{}",
        summary.current_path, summary.current_stage, summary.total_stages_in_path
    )?;
    match path.current_stage() {
        Some(stage) => {
            writeln!(out, "  {}: {}", stage.name, stage.focus)?;
            writeln!(out, "  Verbs: {}", stage.verbs.join(", "))?;
        }
        None => writeln!(out, "  Path complete")?,
    }
    writeln!(
        out,
        "Overall: {}/{} stages ({:.0}%)",
        summary.completed_stages, summary.total_stages, summary.overall_completion
    )?;

    let recommended = path.recommend_path(None);
    if recommended != path.current_path {
        writeln!(out, "Recommended next: {}", recommended.as_str())?;
    }
    writeln!(out)?;
    for info in path.available_paths() {
        writeln!(out, "  {:<13} {} ({} stages)", info.id, info.description, info.stages)?;
    }
    Ok(())
}

pub fn run_path_switch<W: Write>(app: &App, out: &mut W, path_id: &str) -> AppResult<()> {
    let mut path = load_learning_path(&app.storage)?;
    if !path.switch_path(path_id) {
        let known: Vec<&str> = Difficulty::ALL.iter().map(|d| d.as_str()).collect();
        return Err(AppError::InvalidInput(format!(
            "unknown path '{}' (expected one of {})",
            path_id,
            known.join(", ")
        )));
    }
    save_learning_path(&app.storage, &path)?;
    writeln!(out, "Switched to the {}", path.definition().name)?;
    Ok(())
}

/// Record a stage result (accuracy in percent) without drilling
pub fn run_path_complete<W: Write>(app: &App, out: &mut W, accuracy: f64) -> AppResult<()> {
    let mut path = load_learning_path(&app.storage)?;
    let outcome = path.complete_stage(accuracy);
    save_learning_path(&app.storage, &path)?;
    writeln!(out, "{}", outcome.message)?;
    Ok(())
}
