//! Spaced Repetition Scheduling
//!
//! Interval doubling with a hard reset on failure, plus a per-item
//! difficulty score used to order review queues.
//!
//! A new item starts from a one-day interval, so consecutive successes give
//! 2, 4, 8, 16, 30 days and a miss always falls back to 1.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Interval after a failure, and the starting interval of a new item
pub const RESET_INTERVAL_DAYS: u32 = 1;

/// Longest interval ever scheduled
pub const MAX_INTERVAL_DAYS: u32 = 30;

/// Difficulty of an item never seen before
pub const INITIAL_DIFFICULTY: f64 = 0.5;

pub const MIN_DIFFICULTY: f64 = 0.1;
pub const MAX_DIFFICULTY: f64 = 1.0;

/// Difficulty decrease on a correct answer
pub const SUCCESS_STEP: f64 = 0.15;

/// Difficulty increase on an incorrect answer
pub const FAILURE_STEP: f64 = 0.2;

/// Attempts needed before an item counts towards weak areas
pub const WEAK_AREA_MIN_ATTEMPTS: u32 = 3;

/// Attempts needed before a verb counts towards best verbs
pub const BEST_VERB_MIN_ATTEMPTS: u32 = 5;

// ==================== Scheduling ====================

/// Result of scheduling one answer
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub interval_days: u32,
    pub difficulty_score: f64,
}

/// Next review interval in days
///
/// Intervals below one day are read as one day before doubling.
pub fn next_interval_days(current_interval: u32, is_correct: bool) -> u32 {
    if !is_correct {
        return RESET_INTERVAL_DAYS;
    }
    current_interval
        .max(RESET_INTERVAL_DAYS)
        .saturating_mul(2)
        .min(MAX_INTERVAL_DAYS)
}

/// Move the difficulty score towards the answer, clamped to [0.1, 1.0]
pub fn next_difficulty(current: f64, is_correct: bool) -> f64 {
    let current = if current.is_finite() {
        current
    } else {
        INITIAL_DIFFICULTY
    };
    if is_correct {
        (current - SUCCESS_STEP).max(MIN_DIFFICULTY)
    } else {
        (current + FAILURE_STEP).min(MAX_DIFFICULTY)
    }
}

/// Schedule an answer given the item's previous state (`None` for a new item)
pub fn schedule(previous: Option<ReviewUpdate>, is_correct: bool) -> ReviewUpdate {
    let (interval, difficulty) = match previous {
        Some(p) => (p.interval_days, p.difficulty_score),
        None => (RESET_INTERVAL_DAYS, INITIAL_DIFFICULTY),
    };
    ReviewUpdate {
        interval_days: next_interval_days(interval, is_correct),
        difficulty_score: next_difficulty(difficulty, is_correct),
    }
}

/// Accuracy in percent, 0 when nothing was attempted
pub fn accuracy_percent(correct: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_doubling_sequence() {
        let mut interval = RESET_INTERVAL_DAYS;
        let mut seen = Vec::new();
        for _ in 0..6 {
            interval = next_interval_days(interval, true);
            seen.push(interval);
        }
        assert_eq!(seen, vec![2, 4, 8, 16, 30, 30]);
        assert_eq!(next_interval_days(0, true), 2);
    }

    #[test]
    fn test_failure_resets_interval() {
        assert_eq!(next_interval_days(16, false), 1);
        assert_eq!(next_interval_days(0, false), 1);
    }

    #[test]
    fn test_difficulty_bounds() {
        assert!((next_difficulty(0.5, true) - 0.35).abs() < 1e-10);
        assert!((next_difficulty(0.5, false) - 0.7).abs() < 1e-10);
        assert_eq!(next_difficulty(0.2, true), MIN_DIFFICULTY);
        assert_eq!(next_difficulty(0.9, false), MAX_DIFFICULTY);
        assert!((next_difficulty(f64::NAN, true) - 0.35).abs() < 1e-10);
    }

    #[test]
    fn test_schedule_new_item() {
        let update = schedule(None, true);
        assert_eq!(update.interval_days, 2);
        assert!((update.difficulty_score - 0.35).abs() < 1e-10);

        let update = schedule(None, false);
        assert_eq!(update.interval_days, 1);
        assert!((update.difficulty_score - 0.7).abs() < 1e-10);

        // a first success must schedule later than a first miss
        assert!(schedule(None, true).interval_days > schedule(None, false).interval_days);
    }

    #[test]
    fn test_schedule_existing_item() {
        let previous = ReviewUpdate {
            interval_days: 4,
            difficulty_score: 0.3,
        };
        let update = schedule(Some(previous), true);
        assert_eq!(update.interval_days, 8);
        assert!((update.difficulty_score - 0.15).abs() < 1e-10);
    }

    #[test]
    fn test_accuracy_percent() {
        assert_eq!(accuracy_percent(0, 0), 0.0);
        assert_eq!(accuracy_percent(3, 4), 75.0);
    }
}
