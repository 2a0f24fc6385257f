use std::io::{BufRead, Write};
use std::time::Instant;

use conjugar_algo::scenario::{find_scenario, SCENARIOS};
use conjugar_algo::SpeedPractice;

use super::{is_quit, Console};
use crate::app::App;
use crate::error::{AppError, AppResult};
use crate::services::{load_scenarios, save_scenarios};

/// Timed present-tense round over the essential verbs
pub fn run_speed<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    duration_seconds: u32,
    seed: Option<u64>,
) -> AppResult<()> {
    let mut speed = seed.map(SpeedPractice::with_seed).unwrap_or_default();
    let prompts = speed.generate_round(duration_seconds);
    writeln!(
        console.out(),
        "{} prompts. Answer each in under {:.0} seconds.",
        prompts.len(),
        conjugar_algo::speed::CONVERSATIONAL_THRESHOLD
    )?;

    for prompt in &prompts {
        writeln!(console.out())?;
        writeln!(console.out(), "{}", prompt.scenario)?;
        let started = Instant::now();
        let Some(answer) = console.ask(&format!("{} ", prompt.trigger))? else {
            break;
        };
        if is_quit(&answer) {
            break;
        }
        let elapsed = started.elapsed().as_secs_f64();

        let Some(evaluation) = speed.evaluate(&prompt.verb, prompt.person, &answer, elapsed) else {
            continue;
        };
        let out = console.out();
        if evaluation.correct {
            writeln!(out, "✓ {:.1}s ({}) {}", evaluation.response_time, evaluation.rating.label(), evaluation.feedback)?;
        } else {
            writeln!(out, "✗ {} (correct: {})", evaluation.feedback, evaluation.correct_answer)?;
        }
        if let Some(gain) = evaluation.improvement.filter(|g| *g > 0.0) {
            writeln!(out, "  {:.1}s faster than your average", gain)?;
        }
    }

    let out = console.out();
    let Some(summary) = speed.summary() else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "{}", summary.message)?;
    writeln!(out, "Conversational readiness: {:.0}%", summary.readiness_percent)?;
    if !summary.need_work.is_empty() {
        writeln!(out, "Needs work:")?;
        for (verb, avg) in &summary.need_work {
            writeln!(out, "  {:<12} {:.1}s", verb, avg)?;
        }
    }
    Ok(())
}

pub fn run_scenario_list<W: Write>(app: &App, out: &mut W) -> AppResult<()> {
    let completed = load_scenarios(&app.storage)?.progress().completed_list;
    for scenario in SCENARIOS.iter() {
        let mark = if completed.iter().any(|id| id == scenario.id) { "✓" } else { " " };
        writeln!(out, "{} {:<16} {} ({} tasks)", mark, scenario.id, scenario.title, scenario.tasks.len())?;
    }
    Ok(())
}

/// Work through one real-world scenario; it counts as complete when every task communicates
pub fn run_scenario<R: BufRead, W: Write>(
    app: &App,
    console: &mut Console<R, W>,
    scenario_id: Option<&str>,
    count: usize,
) -> AppResult<()> {
    if let Some(id) = scenario_id {
        if find_scenario(id).is_none() {
            return Err(AppError::InvalidInput(format!("unknown scenario '{}'", id)));
        }
    }

    let mut scenarios = load_scenarios(&app.storage)?;
    let tasks = scenarios.task_sequence(scenario_id, count);
    let Some(first) = tasks.first() else {
        writeln!(console.out(), "This scenario has no tasks.")?;
        return Ok(());
    };
    let id = first.scenario_id.clone();
    writeln!(console.out(), "{}", first.scenario_title)?;
    writeln!(console.out(), "{}", first.scenario_context)?;

    let mut communicated = 0;
    let mut answered = 0;
    for task in &tasks {
        let out = console.out();
        writeln!(out)?;
        writeln!(out, "Goal: {}", task.goal)?;
        writeln!(out, "{}", task.prompt)?;
        writeln!(out, "  {}", task.template)?;

        let Some(answer) = console.ask("> ")? else {
            break;
        };
        if is_quit(&answer) {
            break;
        }
        let Some(evaluation) = scenarios.evaluate(&answer, task) else {
            continue;
        };
        answered += 1;
        if evaluation.communicatively_successful {
            communicated += 1;
        }
        writeln!(console.out(), "{}", evaluation.feedback)?;
        if !evaluation.grammatically_correct {
            writeln!(console.out(), "  Correct form: {}", evaluation.correct_form)?;
        }
        if let Some(follow_up) = &task.follow_up {
            writeln!(console.out(), "  {}", follow_up)?;
        }
    }

    if answered == tasks.len() && communicated == answered {
        scenarios.mark_complete(&id);
        save_scenarios(&app.storage, &scenarios)?;
        writeln!(console.out(), "Scenario complete!")?;
    }

    let progress = scenarios.progress();
    writeln!(
        console.out(),
        "Scenarios completed: {}/{} ({:.0}%)",
        progress.completed_scenarios,
        progress.total_scenarios,
        progress.percentage
    )?;
    Ok(())
}
