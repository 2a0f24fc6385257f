mod common;

use chrono::{Duration, Utc};
use conjugar::commands::practice::{self, AnswerMode, PracticeOptions};
use conjugar::commands::{drills, progress, Console, OutputFormat};
use conjugar::services::{load_learning_path, load_scenarios};
use conjugar::storage::Attempt;
use conjugar_algo::scenario::find_scenario;
use conjugar_algo::{Conjugator, Difficulty, ExerciseGenerator, Person, Tense};
use tempfile::TempDir;

use common::{script, test_app};

fn practice_options(seed: u64, count: usize) -> PracticeOptions {
    PracticeOptions {
        difficulty: Some(Difficulty::Beginner),
        verbs: vec!["hablar".into(), "comer".into()],
        tenses: vec![Tense::Present],
        persons: Vec::new(),
        count: Some(count),
        mode: AnswerMode::Free,
        seed: Some(seed),
        stage: false,
    }
}

#[test]
fn scripted_practice_records_every_answer() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path());
    let options = practice_options(42, 4);

    // Same seed and parameters give the same exercises.
    let expected = ExerciseGenerator::with_seed(42).generate_batch(
        4,
        &options.verbs,
        &options.tenses,
        &options.persons,
        Difficulty::Beginner,
    );
    let mut answers: Vec<String> = expected.iter().map(|e| e.answer.clone()).collect();
    answers[3] = "nope".to_string();

    let input = script(&answers);
    let mut console = Console::new(&input[..], Vec::new());
    let summary = practice::run(&app, &mut console, &options).unwrap().unwrap();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.correct, 3);

    let output = String::from_utf8(console.into_output()).unwrap();
    assert!(output.contains("[1/4]"));
    assert!(output.contains("Session complete: 3/4 correct"));

    let stats = app.storage.progress().get_statistics().unwrap();
    assert_eq!(stats.total_attempts, 4);
    assert_eq!(stats.correct_attempts, 3);

    let mistakes = app.storage.progress().get_recent_mistakes(5).unwrap();
    assert_eq!(mistakes.len(), 1);
    assert_eq!(mistakes[0].user_answer, "nope");
}

#[test]
fn quitting_early_keeps_partial_session() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path());
    let options = practice_options(7, 5);
    let first = ExerciseGenerator::with_seed(7).generate_batch(
        5,
        &options.verbs,
        &options.tenses,
        &options.persons,
        Difficulty::Beginner,
    );

    let answers = vec![first[0].answer.clone(), "q".to_string()];
    let input = script(&answers);
    let mut console = Console::new(&input[..], Vec::new());
    let summary = practice::run(&app, &mut console, &options).unwrap().unwrap();
    assert_eq!(summary.total, 1);

    let sessions = app.storage.progress().list_sessions(5).unwrap();
    assert_eq!(sessions[0].total_attempts, 1);
    assert!(sessions[0].end_time.is_some());
}

#[test]
fn unknown_verbs_are_rejected_before_the_drill() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path());
    let mut options = practice_options(1, 2);
    options.verbs = vec!["blorp".into()];

    let mut console = Console::new(&b""[..], Vec::new());
    assert!(practice::run(&app, &mut console, &options).is_err());
    assert!(app.storage.progress().list_sessions(5).unwrap().is_empty());
}

#[test]
fn review_drills_due_items() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path());
    let tracker = app.storage.progress();
    let past = Utc::now() - Duration::days(3);
    tracker
        .record(&Attempt::new("vivir", Tense::Preterite, Person::Yo, "vivo", "viví", false, past))
        .unwrap();

    let answers = vec!["viví".to_string()];
    let input = script(&answers);
    let mut console = Console::new(&input[..], Vec::new());
    let summary = practice::run_review(&app, &mut console, 10, AnswerMode::Free)
        .unwrap()
        .unwrap();
    assert_eq!(summary.correct, 1);

    let perf = tracker
        .get_performance("vivir", Tense::Preterite, Person::Yo)
        .unwrap()
        .unwrap();
    assert_eq!(perf.correct_count, 1);
    assert_eq!(perf.incorrect_count, 1);
    assert!(perf.next_review.unwrap() > Utc::now());

    let mut console = Console::new(&b""[..], Vec::new());
    assert!(practice::run_review(&app, &mut console, 10, AnswerMode::Free).unwrap().is_none());
    let output = String::from_utf8(console.into_output()).unwrap();
    assert!(output.contains("Nothing is due"));
}

#[test]
fn stage_practice_advances_the_learning_path() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path());
    let path = load_learning_path(&app.storage).unwrap();
    let stage = path.stage_exercises().unwrap();

    let expected = ExerciseGenerator::with_seed(9).generate_batch(
        stage.count,
        &stage.verbs,
        &stage.tenses,
        &[],
        path.current_path,
    );
    let answers: Vec<String> = expected.iter().map(|e| e.answer.clone()).collect();

    let options = PracticeOptions {
        seed: Some(9),
        stage: true,
        ..PracticeOptions::default()
    };
    let input = script(&answers);
    let mut console = Console::new(&input[..], Vec::new());
    let summary = practice::run(&app, &mut console, &options).unwrap().unwrap();
    assert_eq!(summary.correct as usize, expected.len());

    let path = load_learning_path(&app.storage).unwrap();
    assert_eq!(path.current_stage, 1);
    let output = String::from_utf8(console.into_output()).unwrap();
    assert!(output.contains("Moving to:"));
}

#[test]
fn story_exercises_share_one_session() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path());
    let expected = ExerciseGenerator::with_seed(5).generate_story_sequence(Tense::Present, 3);
    assert!(!expected.is_empty());
    let answers: Vec<String> = expected.iter().map(|e| e.answer.clone()).collect();

    let input = script(&answers);
    let mut console = Console::new(&input[..], Vec::new());
    let summary = practice::run_story(&app, &mut console, Tense::Present, 3, AnswerMode::Free, Some(5))
        .unwrap()
        .unwrap();
    assert_eq!(summary.total as usize, expected.len());
    assert_eq!(summary.correct, summary.total);
    assert_eq!(app.storage.progress().list_sessions(5).unwrap().len(), 1);
}

#[test]
fn completed_scenario_is_remembered() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path());
    let scenario = find_scenario("restaurant").unwrap();
    let conjugator = Conjugator::new();
    let answers: Vec<String> = scenario
        .tasks
        .iter()
        .map(|t| conjugator.conjugate(t.verb, t.tense, t.person).unwrap())
        .collect();

    let input = script(&answers);
    let mut console = Console::new(&input[..], Vec::new());
    drills::run_scenario(&app, &mut console, Some("restaurant"), scenario.tasks.len()).unwrap();
    let output = String::from_utf8(console.into_output()).unwrap();
    assert!(output.contains("Scenario complete!"));

    let reloaded = load_scenarios(&app.storage).unwrap();
    assert_eq!(reloaded.progress().completed_list, vec!["restaurant".to_string()]);
}

#[test]
fn reports_render_after_practice() {
    let dir = TempDir::new().unwrap();
    let app = test_app(dir.path());
    let tracker = app.storage.progress();
    for _ in 0..3 {
        tracker
            .record_attempt("ser", Tense::Present, Person::Yo, "es", "soy", false)
            .unwrap();
    }

    let mut out = Vec::new();
    progress::run_weak(&app, &mut out, 5, OutputFormat::Plain).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("ser · Present · yo"));

    let mut out = Vec::new();
    progress::run_stats(&app, &mut out, OutputFormat::Json).unwrap();
    let stats: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(stats["total_attempts"], 3);

    let mut out = Vec::new();
    progress::run_curve(&app, &mut out, 7, OutputFormat::Json).unwrap();
    let curve: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(curve.as_array().unwrap().len(), 1);
}
