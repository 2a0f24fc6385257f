//! Speed Practice
//!
//! Timed production drills on the most frequent verbs. Only the present
//! tense and the three singular persons are used; an answer is
//! conversational when it is correct and comes within three seconds.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::conjugation::{lexicon, Conjugator};
use crate::sanitize::normalize_answer;
use crate::types::{Person, Tense};

// ==================== Constants ====================

/// Seconds allotted per prompt
pub const SECONDS_PER_PROMPT: f64 = 3.0;

pub const INSTANT_THRESHOLD: f64 = 1.5;
pub const CONVERSATIONAL_THRESHOLD: f64 = 3.0;
pub const SLOW_THRESHOLD: f64 = 5.0;

/// Readiness (percent of essential verbs) needed to be conversation ready
pub const READY_THRESHOLD: f64 = 70.0;

/// Slow verbs listed in the session summary
const NEED_WORK_LIMIT: usize = 5;

const DRILLED_PERSONS: [Person; 3] = [Person::Yo, Person::Tu, Person::ElEllaUsted];

/// The twenty most frequent verbs in conversation, with drill glosses
pub const ESSENTIAL_VERBS: [(&str, &str); 20] = [
    ("ser", "to be (permanent)"),
    ("estar", "to be (temporary)"),
    ("tener", "to have"),
    ("hacer", "to do/make"),
    ("poder", "can/to be able"),
    ("decir", "to say/tell"),
    ("ir", "to go"),
    ("ver", "to see"),
    ("dar", "to give"),
    ("saber", "to know (fact)"),
    ("querer", "to want"),
    ("llegar", "to arrive"),
    ("pasar", "to happen/pass"),
    ("deber", "should/must"),
    ("poner", "to put"),
    ("parecer", "to seem"),
    ("quedar", "to stay/remain"),
    ("creer", "to believe"),
    ("hablar", "to speak"),
    ("llevar", "to carry/wear"),
];

fn triggers(person: Person) -> &'static [&'static str] {
    match person {
        Person::Yo => &[
            "Someone asks '¿Qué haces?' You say:",
            "Your friend asks '¿Vienes?' You respond:",
            "They ask '¿Lo sabes?' You answer:",
            "Someone says '¿Puedes ayudarme?' You say:",
        ],
        Person::Tu => &[
            "Ask your friend what they want:",
            "Ask if they can come:",
            "Ask what they think:",
            "Ask where they're going:",
        ],
        _ => &[
            "Tell someone what Maria wants:",
            "Explain what your boss says:",
            "Describe what your friend does:",
            "Say where Juan is:",
        ],
    }
}

/// Gloss for a verb, preferring the drill-specific wording
pub fn verb_meaning(verb: &str) -> &str {
    ESSENTIAL_VERBS
        .iter()
        .find(|(v, _)| *v == verb)
        .map(|(_, m)| *m)
        .unwrap_or_else(|| lexicon::meaning(verb))
}

// ==================== Types ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedRating {
    Instant,
    Conversational,
    TooSlow,
    NotConversational,
}

impl SpeedRating {
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds < INSTANT_THRESHOLD {
            Self::Instant
        } else if seconds < CONVERSATIONAL_THRESHOLD {
            Self::Conversational
        } else if seconds < SLOW_THRESHOLD {
            Self::TooSlow
        } else {
            Self::NotConversational
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Instant => "Instant (native-like)",
            Self::Conversational => "Conversational",
            Self::TooSlow => "Too slow (conversation breaks)",
            Self::NotConversational => "Not conversational",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedPrompt {
    pub trigger: String,
    pub verb: String,
    pub verb_english: String,
    pub person: Person,
    pub answer: String,
    pub time_limit: f64,
    pub scenario: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedEvaluation {
    pub correct: bool,
    pub response_time: f64,
    pub rating: SpeedRating,
    pub correct_answer: String,
    pub conversational: bool,
    /// Seconds faster than the previous average for this verb
    pub improvement: Option<f64>,
    pub feedback: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadinessSummary {
    pub ready: bool,
    pub readiness_percent: f64,
    pub conversational_verbs: Vec<String>,
    /// Slowest verbs first, with their average time
    pub need_work: Vec<(String, f64)>,
    pub message: String,
}

// ==================== Speed practice ====================

pub struct SpeedPractice {
    conjugator: Conjugator,
    rng: ChaCha8Rng,
    response_times: BTreeMap<String, Vec<f64>>,
}

impl Default for SpeedPractice {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedPractice {
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(rng: ChaCha8Rng) -> Self {
        Self {
            conjugator: Conjugator::new(),
            rng,
            response_times: BTreeMap::new(),
        }
    }

    /// One prompt per [`SECONDS_PER_PROMPT`] of round duration
    pub fn generate_round(&mut self, duration_seconds: u32) -> Vec<SpeedPrompt> {
        let count = (f64::from(duration_seconds) / SECONDS_PER_PROMPT) as usize;
        let mut prompts = Vec::with_capacity(count);

        while prompts.len() < count {
            let Some(&(verb, meaning)) = ESSENTIAL_VERBS.choose(&mut self.rng) else {
                break;
            };
            let Some(&person) = DRILLED_PERSONS.choose(&mut self.rng) else {
                break;
            };
            let Some(answer) = self.conjugator.conjugate(verb, Tense::Present, person) else {
                continue;
            };
            let trigger = triggers(person)
                .choose(&mut self.rng)
                .copied()
                .unwrap_or_default();

            prompts.push(SpeedPrompt {
                trigger: trigger.to_string(),
                verb: verb.to_string(),
                verb_english: meaning.to_string(),
                person,
                answer,
                time_limit: SECONDS_PER_PROMPT,
                scenario: format!("Quick! Use '{verb}' ({meaning})"),
            });
        }

        prompts
    }

    /// Rate an answer on correctness and speed and record the time.
    ///
    /// `None` when the verb cannot be conjugated.
    pub fn evaluate(
        &mut self,
        verb: &str,
        person: Person,
        user_answer: &str,
        response_time: f64,
    ) -> Option<SpeedEvaluation> {
        let correct_answer = self.conjugator.conjugate(verb, Tense::Present, person)?;
        let correct = normalize_answer(user_answer) == normalize_answer(&correct_answer);
        let response_time = response_time.max(0.0);

        let times = self.response_times.entry(verb.to_string()).or_default();
        let improvement = if times.is_empty() {
            None
        } else {
            Some(mean(times) - response_time)
        };
        times.push(response_time);

        Some(SpeedEvaluation {
            correct,
            response_time,
            rating: SpeedRating::from_seconds(response_time),
            correct_answer,
            conversational: correct && response_time < CONVERSATIONAL_THRESHOLD,
            improvement,
            feedback: feedback(correct, response_time).to_string(),
        })
    }

    /// Verbs averaging over the conversational threshold, slowest first
    pub fn weak_spots(&self) -> Vec<(String, f64)> {
        let mut slow: Vec<(String, f64)> = self
            .response_times
            .iter()
            .map(|(verb, times)| (verb.clone(), mean(times)))
            .filter(|(_, avg)| *avg > CONVERSATIONAL_THRESHOLD)
            .collect();
        slow.sort_by(|a, b| b.1.total_cmp(&a.1));
        slow
    }

    pub fn summary(&self) -> Option<ReadinessSummary> {
        if self.response_times.values().all(Vec::is_empty) {
            return None;
        }

        let mut conversational_verbs = Vec::new();
        let mut need_work = Vec::new();
        for (verb, times) in &self.response_times {
            let avg = mean(times);
            if avg < CONVERSATIONAL_THRESHOLD {
                conversational_verbs.push(verb.clone());
            } else {
                need_work.push((verb.clone(), avg));
            }
        }
        need_work.sort_by(|a, b| b.1.total_cmp(&a.1));
        need_work.truncate(NEED_WORK_LIMIT);

        let readiness_percent =
            conversational_verbs.len() as f64 / ESSENTIAL_VERBS.len() as f64 * 100.0;

        Some(ReadinessSummary {
            ready: readiness_percent > READY_THRESHOLD,
            readiness_percent,
            conversational_verbs,
            need_work,
            message: readiness_message(readiness_percent).to_string(),
        })
    }

    pub fn response_times(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.response_times
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn feedback(correct: bool, seconds: f64) -> &'static str {
    match (correct, seconds) {
        (true, s) if s < INSTANT_THRESHOLD => "Perfect! This is automatic for you.",
        (true, s) if s < CONVERSATIONAL_THRESHOLD => "Good! Fast enough for conversation.",
        (true, _) => "Correct but too slow. In real conversation, you'd lose the flow.",
        (false, s) if s < CONVERSATIONAL_THRESHOLD => {
            "Fast but wrong. Slow down slightly and focus."
        }
        (false, _) => "Need more practice with this verb. Speed comes with repetition.",
    }
}

fn readiness_message(percent: f64) -> &'static str {
    if percent > 80.0 {
        "You're ready for real conversations! Your verb recall is automatic."
    } else if percent > 60.0 {
        "Getting there! A few more practice sessions and you'll be conversational."
    } else if percent > 40.0 {
        "Building foundation. Focus on the verbs you're slow with."
    } else {
        "Keep practicing. Fluency comes from instant recall, not just knowing the rules."
    }
}
