//! One practice run: checks answers, records attempts and keeps the session row current.

use std::collections::BTreeSet;

use conjugar_algo::srs;
use conjugar_algo::{
    check_answer, Difficulty, Exercise, ExerciseGenerator, Person, ReviewUpdate, Strictness, Tense,
};
use serde::Serialize;

use crate::storage::{ProgressTracker, ReviewItem, StorageResult};

#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub feedback: String,
    pub correct_answer: String,
    pub review: ReviewUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: i64,
    pub total: i64,
    pub correct: i64,
    /// Percent
    pub accuracy: f64,
    pub verbs_practiced: Vec<String>,
}

pub struct DrillSession {
    tracker: ProgressTracker,
    strictness: Strictness,
    session_id: i64,
    total: i64,
    correct: i64,
    verbs: BTreeSet<String>,
}

impl DrillSession {
    pub fn start(tracker: ProgressTracker, strictness: Strictness) -> StorageResult<Self> {
        let session_id = tracker.start_session()?;
        Ok(Self {
            tracker,
            strictness,
            session_id,
            total: 0,
            correct: 0,
            verbs: BTreeSet::new(),
        })
    }

    /// Check an answer, record it and reschedule the item
    ///
    /// The session row is rewritten after every answer so an interrupted run keeps its counts.
    pub fn submit(&mut self, exercise: &Exercise, user_answer: &str) -> StorageResult<AnswerOutcome> {
        let check = check_answer(user_answer, &exercise.answer, self.strictness);
        let review = self.tracker.record_attempt(
            &exercise.verb,
            exercise.tense,
            exercise.person,
            user_answer.trim(),
            &exercise.answer,
            check.is_correct,
        )?;

        self.total += 1;
        if check.is_correct {
            self.correct += 1;
        }
        self.verbs.insert(exercise.verb.clone());
        self.persist()?;

        tracing::debug!(
            verb = %exercise.verb,
            tense = exercise.tense.as_str(),
            correct = check.is_correct,
            next_interval = review.interval_days,
            "answer recorded"
        );

        Ok(AnswerOutcome {
            is_correct: check.is_correct,
            feedback: check.feedback,
            correct_answer: exercise.answer.clone(),
            review,
        })
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id,
            total: self.total,
            correct: self.correct,
            accuracy: srs::accuracy_percent(self.correct as u64, self.total as u64),
            verbs_practiced: self.verbs.iter().cloned().collect(),
        }
    }

    pub fn finish(self) -> StorageResult<SessionSummary> {
        self.persist()?;
        Ok(self.summary())
    }

    fn persist(&self) -> StorageResult<()> {
        let verbs: Vec<String> = self.verbs.iter().cloned().collect();
        self.tracker
            .update_session(self.session_id, self.total, self.correct, &verbs)
    }
}

/// Exercises for due review items; rows with unknown tense or person are skipped
pub fn review_exercises(
    generator: &mut ExerciseGenerator,
    items: &[ReviewItem],
    difficulty: Difficulty,
) -> Vec<Exercise> {
    items
        .iter()
        .filter_map(|item| {
            let tense = Tense::from_str(&item.tense)?;
            let person = usize::try_from(item.person).ok().and_then(Person::from_index)?;
            let exercise =
                generator.generate_exercise(Some(&item.verb), Some(tense), Some(person), difficulty)?;
            // The generator falls back to a random item when the pinned one fails.
            (exercise.verb == item.verb && exercise.tense == tense && exercise.person == person)
                .then_some(exercise)
        })
        .collect()
}
