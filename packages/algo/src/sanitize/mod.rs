//! Answer Sanitization
//!
//! Normalization and comparison of learner input.
//!
//! Functions:
//! - Whitespace / case normalization
//! - Spanish accent folding
//! - Strictness-aware answer checking

use serde::{Deserialize, Serialize};

/// Minimum similarity accepted in lenient mode
pub const LENIENT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// How forgiving answer checking is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Exact match only (case and surrounding whitespace ignored)
    Strict,
    /// Also accepts answers that differ only in accents
    #[default]
    Normal,
    /// Also accepts close misspellings
    Lenient,
}

impl Strictness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Normal => "normal",
            Self::Lenient => "lenient",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "normal" => Some(Self::Normal),
            "lenient" => Some(Self::Lenient),
            _ => None,
        }
    }
}

/// Outcome category of a check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Exact,
    AccentMismatch,
    CloseEnough,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerCheck {
    pub is_correct: bool,
    pub verdict: Verdict,
    pub feedback: String,
}

/// Trim, lowercase and collapse inner whitespace
pub fn normalize_answer(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Strip Spanish accent marks; `ñ` is kept
pub fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Á' | 'À' | 'Â' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            other => other,
        })
        .collect()
}

/// Normalized Levenshtein similarity in [0.0, 1.0]
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Check a learner answer
///
/// # Arguments
/// * `user_answer` - what the learner typed
/// * `correct_answer` - expected form
/// * `strictness` - how forgiving the comparison is
///
/// # Returns
/// The verdict and the feedback line shown to the learner
pub fn check_answer(user_answer: &str, correct_answer: &str, strictness: Strictness) -> AnswerCheck {
    let user = normalize_answer(user_answer);
    let correct = normalize_answer(correct_answer);

    if user == correct {
        return AnswerCheck {
            is_correct: true,
            verdict: Verdict::Exact,
            feedback: "Correct! Great job!".to_string(),
        };
    }

    if user.is_empty() {
        return incorrect(correct_answer);
    }

    if strictness != Strictness::Strict && fold_accents(&user) == fold_accents(&correct) {
        return AnswerCheck {
            is_correct: true,
            verdict: Verdict::AccentMismatch,
            feedback: format!("Correct! (Accent marks differ: '{}')", correct_answer.trim()),
        };
    }

    if strictness == Strictness::Lenient && similarity(&user, &correct) > LENIENT_SIMILARITY_THRESHOLD
    {
        return AnswerCheck {
            is_correct: true,
            verdict: Verdict::CloseEnough,
            feedback: format!(
                "Close enough! The exact answer is '{}'.",
                correct_answer.trim()
            ),
        };
    }

    incorrect(correct_answer)
}

fn incorrect(correct_answer: &str) -> AnswerCheck {
    AnswerCheck {
        is_correct: false,
        verdict: Verdict::Incorrect,
        feedback: format!("Incorrect. The correct answer is '{}'.", correct_answer.trim()),
    }
}
