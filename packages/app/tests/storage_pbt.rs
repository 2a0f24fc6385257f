//! Property-based tests for recorded progress

use chrono::{Duration, TimeZone, Utc};
use conjugar::storage::{Attempt, Storage};
use conjugar_algo::{Person, Tense};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Counters only grow and always add up to the number of attempts
    #[test]
    fn counts_match_attempts(answers in proptest::collection::vec(any::<bool>(), 1..30)) {
        let storage = Storage::in_memory().unwrap();
        let tracker = storage.progress();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();

        let mut last_total = 0;
        for (i, correct) in answers.iter().enumerate() {
            let when = start + Duration::hours(i as i64);
            let attempt = Attempt::new("hablar", Tense::Present, Person::Nosotros, "hablamos", "hablamos", *correct, when);
            tracker.record(&attempt).unwrap();

            let perf = tracker
                .get_performance("hablar", Tense::Present, Person::Nosotros)
                .unwrap()
                .unwrap();
            let total = perf.correct_count + perf.incorrect_count;
            prop_assert_eq!(total, last_total + 1);
            last_total = total;
        }

        let expected_correct = answers.iter().filter(|c| **c).count() as i64;
        let stats = tracker.get_statistics().unwrap();
        prop_assert_eq!(stats.total_attempts, answers.len() as i64);
        prop_assert_eq!(stats.correct_attempts, expected_correct);
    }

    /// Stored intervals stay within one to thirty days, next review follows last seen
    #[test]
    fn stored_schedule_is_bounded(answers in proptest::collection::vec(any::<bool>(), 1..40)) {
        let storage = Storage::in_memory().unwrap();
        let tracker = storage.progress();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();

        for (i, correct) in answers.iter().enumerate() {
            let when = start + Duration::days(i as i64);
            let attempt = Attempt::new("ser", Tense::Imperfect, Person::Yo, "era", "era", *correct, when);
            tracker.record(&attempt).unwrap();

            let perf = tracker
                .get_performance("ser", Tense::Imperfect, Person::Yo)
                .unwrap()
                .unwrap();
            prop_assert!((1..=30).contains(&perf.interval_days));
            prop_assert!((0.1 - 1e-9..=1.0 + 1e-9).contains(&perf.difficulty_score));
            prop_assert_eq!(perf.last_seen, Some(when));
            prop_assert_eq!(perf.next_review, Some(when + Duration::days(perf.interval_days)));
        }
    }
}
