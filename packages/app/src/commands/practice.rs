use std::io::{BufRead, Write};

use conjugar_algo::{Conjugator, Difficulty, Exercise, ExerciseGenerator, Person, Tense};

use super::{is_quit, Console};
use crate::app::App;
use crate::error::{AppError, AppResult};
use crate::services::{
    load_learning_path, review_exercises, save_learning_path, DrillSession, SessionSummary,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum AnswerMode {
    /// Type the conjugated form
    #[default]
    Free,
    /// Pick from numbered options
    Choice,
}

#[derive(Debug, Clone, Default)]
pub struct PracticeOptions {
    pub difficulty: Option<Difficulty>,
    pub verbs: Vec<String>,
    pub tenses: Vec<Tense>,
    pub persons: Vec<Person>,
    pub count: Option<usize>,
    pub mode: AnswerMode,
    pub seed: Option<u64>,
    /// Drill the current learning path stage and record the result
    pub stage: bool,
}

pub fn parse_tenses(raw: &[String]) -> AppResult<Vec<Tense>> {
    raw.iter()
        .map(|t| Tense::from_str(t).ok_or_else(|| AppError::InvalidInput(format!("unknown tense '{}'", t))))
        .collect()
}

pub fn parse_persons(raw: &[String]) -> AppResult<Vec<Person>> {
    raw.iter()
        .map(|p| Person::from_str(p).ok_or_else(|| AppError::InvalidInput(format!("unknown person '{}'", p))))
        .collect()
}

fn generator(seed: Option<u64>) -> ExerciseGenerator {
    seed.map(ExerciseGenerator::with_seed).unwrap_or_default()
}

pub fn run<R: BufRead, W: Write>(
    app: &App,
    console: &mut Console<R, W>,
    options: &PracticeOptions,
) -> AppResult<Option<SessionSummary>> {
    let conjugator = Conjugator::new();
    if let Some(unknown) = options.verbs.iter().find(|v| !conjugator.can_conjugate(v)) {
        return Err(AppError::InvalidInput(format!("cannot conjugate '{}'", unknown)));
    }

    let mut generator = generator(options.seed);
    if options.stage {
        return run_stage(app, console, &mut generator, options.mode);
    }

    let difficulty = options.difficulty.unwrap_or(app.settings.default_difficulty);
    let count = options.count.unwrap_or(app.settings.exercise_count);
    let exercises = generator.generate_batch(
        count,
        &options.verbs,
        &options.tenses,
        &options.persons,
        difficulty,
    );
    run_exercises(app, console, &exercises, options.mode)
}

fn run_stage<R: BufRead, W: Write>(
    app: &App,
    console: &mut Console<R, W>,
    generator: &mut ExerciseGenerator,
    mode: AnswerMode,
) -> AppResult<Option<SessionSummary>> {
    let mut path = load_learning_path(&app.storage)?;
    let Some(stage) = path.stage_exercises() else {
        writeln!(console.out(), "The {} is complete. Switch paths to keep going.", path.definition().name)?;
        return Ok(None);
    };

    writeln!(console.out(), "Focus: {}", stage.focus_message)?;
    let exercises =
        generator.generate_batch(stage.count, &stage.verbs, &stage.tenses, &[], path.current_path);
    let summary = run_exercises(app, console, &exercises, mode)?;

    // Only a fully answered stage counts towards the path.
    if let Some(summary) = &summary {
        if summary.total > 0 && summary.total as usize == exercises.len() {
            let outcome = path.complete_stage(summary.accuracy);
            save_learning_path(&app.storage, &path)?;
            writeln!(console.out(), "{}", outcome.message)?;
        }
    }
    Ok(summary)
}

/// Drill due review items
pub fn run_review<R: BufRead, W: Write>(
    app: &App,
    console: &mut Console<R, W>,
    limit: usize,
    mode: AnswerMode,
) -> AppResult<Option<SessionSummary>> {
    let items = app.storage.progress().get_verbs_for_review(limit)?;
    if items.is_empty() {
        writeln!(console.out(), "Nothing is due for review.")?;
        return Ok(None);
    }

    let mut generator = ExerciseGenerator::new();
    let exercises = review_exercises(&mut generator, &items, app.settings.default_difficulty);
    writeln!(console.out(), "{} item(s) due for review.", exercises.len())?;
    run_exercises(app, console, &exercises, mode)
}

/// Drill a connected story in one tense
pub fn run_story<R: BufRead, W: Write>(
    app: &App,
    console: &mut Console<R, W>,
    tense: Tense,
    length: usize,
    mode: AnswerMode,
    seed: Option<u64>,
) -> AppResult<Option<SessionSummary>> {
    let exercises = generator(seed).generate_story_sequence(tense, length);
    if let Some(first) = exercises.first() {
        if first.tense != tense {
            writeln!(
                console.out(),
                "No story is written in the {}; using the {}.",
                tense.display_name(),
                first.tense.display_name()
            )?;
        }
    }
    run_exercises(app, console, &exercises, mode)
}

/// Ask every exercise in turn, recording each answer in one session
pub fn run_exercises<R: BufRead, W: Write>(
    app: &App,
    console: &mut Console<R, W>,
    exercises: &[Exercise],
    mode: AnswerMode,
) -> AppResult<Option<SessionSummary>> {
    if exercises.is_empty() {
        writeln!(console.out(), "No exercises could be generated.")?;
        return Ok(None);
    }

    let mut drill = DrillSession::start(app.storage.progress(), app.settings.strictness)?;
    let total = exercises.len();

    for (i, exercise) in exercises.iter().enumerate() {
        let out = console.out();
        writeln!(out)?;
        if let Some(story) = &exercise.story {
            writeln!(out, "{} ({}/{})", story.title, story.position, story.total)?;
        }
        writeln!(out, "[{}/{}] {}", i + 1, total, exercise.sentence)?;
        if app.settings.show_translation {
            writeln!(out, "    {}", exercise.translation)?;
        }
        if mode == AnswerMode::Choice {
            for (n, choice) in exercise.choices.iter().enumerate() {
                writeln!(out, "    {}) {}", n + 1, choice)?;
            }
        }

        let Some(raw) = console.ask("> ")? else {
            break;
        };
        if is_quit(&raw) {
            break;
        }

        let answer = resolve_choice(&raw, exercise, mode);
        let outcome = drill.submit(exercise, &answer)?;
        let mark = if outcome.is_correct { "✓" } else { "✗" };
        writeln!(console.out(), "{} {}", mark, outcome.feedback)?;
    }

    let summary = drill.finish()?;
    writeln!(console.out())?;
    writeln!(
        console.out(),
        "Session complete: {}/{} correct ({:.1}%)",
        summary.correct,
        summary.total,
        summary.accuracy
    )?;
    Ok(Some(summary))
}

/// A number picks the matching option in choice mode
fn resolve_choice(raw: &str, exercise: &Exercise, mode: AnswerMode) -> String {
    if mode == AnswerMode::Choice {
        if let Some(choice) = raw
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| exercise.choices.get(i))
        {
            return choice.clone();
        }
    }
    raw.to_string()
}
