//! ProgressTracker 集成测试：文件数据库、复习调度与统计

use chrono::{Duration, TimeZone, Utc};
use conjugar::storage::{Attempt, Storage};
use conjugar_algo::{Person, Tense};
use tempfile::TempDir;

fn at(days_ago: i64) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap() - Duration::days(days_ago)
}

#[test]
fn test_progress_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("nested").join("progress.db");

    {
        let storage = Storage::new(&db).unwrap();
        let tracker = storage.progress();
        tracker
            .record_attempt("tener", Tense::Present, Person::Yo, "tengo", "tengo", true)
            .unwrap();
        let id = tracker.start_session().unwrap();
        tracker.update_session(id, 1, 1, &["tener".to_string()]).unwrap();
    }

    let storage = Storage::new(&db).unwrap();
    let tracker = storage.progress();
    let stats = tracker.get_statistics().unwrap();
    assert_eq!(stats.total_attempts, 1);
    assert_eq!(stats.unique_verbs, 1);

    let sessions = tracker.list_sessions(10).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].verbs_practiced, vec!["tener".to_string()]);

    let health = storage.health().unwrap();
    assert!(health.is_healthy);
    assert!(!health.needs_migration);
}

#[test]
fn test_interval_doubles_then_resets() {
    let storage = Storage::in_memory().unwrap();
    let tracker = storage.progress();
    let mut intervals = Vec::new();

    for day in (0..5).rev() {
        let attempt = Attempt::new("ir", Tense::Preterite, Person::EllosEllasUstedes, "fueron", "fueron", true, at(day));
        intervals.push(tracker.record(&attempt).unwrap().interval_days);
    }
    assert_eq!(intervals, vec![2, 4, 8, 16, 30]);

    let miss = Attempt::new("ir", Tense::Preterite, Person::EllosEllasUstedes, "iron", "fueron", false, at(0));
    assert_eq!(tracker.record(&miss).unwrap().interval_days, 1);

    let perf = tracker
        .get_performance("ir", Tense::Preterite, Person::EllosEllasUstedes)
        .unwrap()
        .unwrap();
    assert_eq!(perf.correct_count, 5);
    assert_eq!(perf.incorrect_count, 1);
    assert_eq!(perf.interval_days, 1);
    assert_eq!(perf.next_review, Some(at(0) + Duration::days(1)));
}

#[test]
fn test_review_queue_prefers_hard_items() {
    let storage = Storage::in_memory().unwrap();
    let tracker = storage.progress();

    tracker
        .record(&Attempt::new("comer", Tense::Present, Person::Tu, "comes", "comes", true, at(10)))
        .unwrap();
    for _ in 0..3 {
        tracker
            .record(&Attempt::new("hacer", Tense::Preterite, Person::Yo, "hací", "hice", false, at(9)))
            .unwrap();
    }
    // Not due until long after `now`.
    tracker
        .record(&Attempt::new("vivir", Tense::Present, Person::Yo, "vivo", "vivo", true, at(0)))
        .unwrap();

    let due = tracker.get_verbs_for_review_at(10, at(0)).unwrap();
    let verbs: Vec<&str> = due.iter().map(|i| i.verb.as_str()).collect();
    assert_eq!(verbs, vec!["hacer", "comer"]);
    assert!(due[0].difficulty_score > due[1].difficulty_score);

    let limited = tracker.get_verbs_for_review_at(1, at(0)).unwrap();
    assert_eq!(limited.len(), 1);
}

#[test]
fn test_weak_areas_need_three_attempts() {
    let storage = Storage::in_memory().unwrap();
    let tracker = storage.progress();

    for correct in [false, false, true] {
        tracker
            .record_attempt("poder", Tense::Present, Person::Yo, "puedo", "puedo", correct)
            .unwrap();
    }
    tracker
        .record_attempt("saber", Tense::Present, Person::Yo, "sabo", "sé", false)
        .unwrap();

    let weak = tracker.get_weak_areas(10).unwrap();
    assert_eq!(weak.len(), 1);
    assert_eq!(weak[0].verb, "poder");
    assert!((weak[0].accuracy - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_learning_curve_groups_by_day() {
    let storage = Storage::in_memory().unwrap();
    let tracker = storage.progress();

    for (days_ago, correct) in [(2, true), (2, false), (1, true), (40, true)] {
        tracker
            .record(&Attempt::new("ser", Tense::Present, Person::Yo, "soy", "soy", correct, at(days_ago)))
            .unwrap();
    }

    let curve = tracker.get_learning_curve_at(30, at(0)).unwrap();
    assert_eq!(curve.len(), 2);
    assert_eq!(curve[0].date, at(2).date_naive());
    assert_eq!(curve[0].attempts, 2);
    assert!((curve[0].accuracy - 50.0).abs() < 1e-9);
    assert_eq!(curve[1].correct, 1);
}

#[test]
fn test_recent_mistakes_newest_first() {
    let storage = Storage::in_memory().unwrap();
    let tracker = storage.progress();

    tracker
        .record(&Attempt::new("ir", Tense::Present, Person::Yo, "io", "voy", false, at(3)))
        .unwrap();
    tracker
        .record(&Attempt::new("dar", Tense::Present, Person::Yo, "do", "doy", false, at(1)))
        .unwrap();
    tracker
        .record(&Attempt::new("estar", Tense::Present, Person::Yo, "estoy", "estoy", true, at(0)))
        .unwrap();

    let mistakes = tracker.get_recent_mistakes(10).unwrap();
    let verbs: Vec<&str> = mistakes.iter().map(|m| m.verb.as_str()).collect();
    assert_eq!(verbs, vec!["dar", "ir"]);
    assert_eq!(mistakes[0].correct_answer, "doy");
}

#[test]
fn test_update_unknown_session_fails() {
    let storage = Storage::in_memory().unwrap();
    assert!(storage.progress().update_session(99, 1, 1, &[]).is_err());
}
