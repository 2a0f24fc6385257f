//! Task Scenarios
//!
//! Real-world situations (ordering food, planning a trip, ...) made of short
//! tasks. Each task is one conjugation in a meaningful sentence; evaluation
//! separates grammatical accuracy from communicative success.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::conjugation::Conjugator;
use crate::sanitize::normalize_answer;
use crate::types::{Person, Tense};

/// Max edit distance still considered understandable
pub const MAX_COMMUNICATIVE_DISTANCE: usize = 2;

/// Shared prefix length that still conveys the verb
const STEM_PREFIX_LEN: usize = 3;

// ==================== Scenario data ====================

#[derive(Debug)]
pub struct Task {
    pub goal: &'static str,
    pub prompt: &'static str,
    pub template: &'static str,
    pub verb: &'static str,
    pub tense: Tense,
    pub person: Person,
    pub success_criteria: &'static str,
    pub follow_up: Option<&'static str>,
}

#[derive(Debug)]
pub struct Scenario {
    pub id: &'static str,
    pub title: &'static str,
    pub context: &'static str,
    pub tasks: &'static [Task],
}

const fn task(
    goal: &'static str,
    prompt: &'static str,
    template: &'static str,
    verb: &'static str,
    person: Person,
    success_criteria: &'static str,
) -> Task {
    Task {
        goal,
        prompt,
        template,
        verb,
        tense: Tense::Present,
        person,
        success_criteria,
        follow_up: None,
    }
}

pub static SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "restaurant",
        title: "At a Restaurant",
        context: "You are ordering food with friends",
        tasks: &[
            Task {
                follow_up: Some("¿Y para beber?"),
                ..task(
                    "Order your meal",
                    "Tell the waiter what you want to eat",
                    "Yo ______ (querer) la paella, por favor.",
                    "querer",
                    Person::Yo,
                    "communicates desire for food",
                )
            },
            task(
                "Ask about ingredients",
                "You have allergies - ask what the dish contains",
                "¿Qué ______ (tener) este plato?",
                "tener",
                Person::ElEllaUsted,
                "successfully inquires about contents",
            ),
            task(
                "Request the bill",
                "You finished eating and want to pay",
                "¿______ (poder) traer la cuenta?",
                "poder",
                Person::ElEllaUsted,
                "politely requests bill",
            ),
        ],
    },
    Scenario {
        id: "travel",
        title: "Planning a Trip",
        context: "Discussing vacation plans with a friend",
        tasks: &[
            task(
                "Suggest a destination",
                "Propose where to go for vacation",
                "¿Por qué no ______ (ir) a Costa Rica?",
                "ir",
                Person::Nosotros,
                "makes travel suggestion",
            ),
            task(
                "Discuss dates",
                "Say when you can travel",
                "Yo ______ (poder) viajar en julio.",
                "poder",
                Person::Yo,
                "communicates availability",
            ),
            task(
                "Express preferences",
                "Say where you like to be on vacation",
                "En vacaciones siempre ______ (estar) cerca de la playa.",
                "estar",
                Person::Yo,
                "expresses preference clearly",
            ),
        ],
    },
    Scenario {
        id: "daily_routine",
        title: "Daily Routine",
        context: "Describing your typical day to a new friend",
        tasks: &[
            task(
                "Describe morning routine",
                "Tell what time you wake up",
                "Normalmente ______ (levantarse) a las siete.",
                "levantarse",
                Person::Yo,
                "shares routine information",
            ),
            task(
                "Talk about work/study",
                "Explain what you do during the day",
                "______ (trabajar) en una oficina.",
                "trabajar",
                Person::Yo,
                "describes occupation/activity",
            ),
        ],
    },
    Scenario {
        id: "making_plans",
        title: "Making Plans",
        context: "Arranging to meet friends this weekend",
        tasks: &[
            task(
                "Suggest an activity",
                "Propose something fun to do",
                "¿______ (querer) ir al cine el sábado?",
                "querer",
                Person::Tu,
                "makes social invitation",
            ),
            task(
                "Confirm availability",
                "Say if you can make it",
                "Sí, ______ (poder) a las ocho.",
                "poder",
                Person::Yo,
                "confirms attendance",
            ),
        ],
    },
    Scenario {
        id: "shopping",
        title: "At the Store",
        context: "Buying clothes at a shop",
        tasks: &[
            task(
                "Ask for help",
                "Get assistance from store clerk",
                "¿______ (tener) esta camisa en talla M?",
                "tener",
                Person::EllosEllasUstedes,
                "requests specific item",
            ),
            task(
                "Express opinion",
                "Say what you think about an item",
                "Me ______ (gustar) el color azul.",
                "gustar",
                Person::ElEllaUsted,
                "expresses preference",
            ),
        ],
    },
    Scenario {
        id: "health",
        title: "At the Doctor",
        context: "Explaining symptoms to a doctor",
        tasks: &[
            task(
                "Describe symptoms",
                "Tell the doctor how you feel",
                "Me ______ (doler) la cabeza desde ayer.",
                "doler",
                Person::ElEllaUsted,
                "communicates health issue",
            ),
            task(
                "Explain duration",
                "Say how long you have been sick",
                "______ (estar) enfermo por tres días.",
                "estar",
                Person::Yo,
                "provides timeline",
            ),
        ],
    },
];

pub fn find_scenario(id: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.id == id)
}

// ==================== Results ====================

/// A task handed to the learner, with its scenario framing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskPrompt {
    pub scenario_id: String,
    pub scenario_title: String,
    pub scenario_context: String,
    pub goal: String,
    pub prompt: String,
    pub template: String,
    pub verb: String,
    pub tense: Tense,
    pub person: Person,
    pub success_criteria: String,
    pub follow_up: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskEvaluation {
    pub grammatically_correct: bool,
    pub communicatively_successful: bool,
    pub correct_form: String,
    pub feedback: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProgress {
    pub total_scenarios: usize,
    pub completed_scenarios: usize,
    pub percentage: f64,
    pub completed_list: Vec<String>,
}

// ==================== Runner ====================

pub struct TaskScenarios {
    conjugator: Conjugator,
    rng: ChaCha8Rng,
    completed: BTreeSet<String>,
}

impl Default for TaskScenarios {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskScenarios {
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
            completed: BTreeSet::new(),
        }
    }

    /// Restore previously completed scenario ids (unknown ids are dropped)
    pub fn with_completed<I, S>(mut self, completed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in completed {
            let id: String = id.into();
            self.mark_complete(&id);
        }
        self
    }

    pub fn scenario_ids(&self) -> Vec<&'static str> {
        SCENARIOS.iter().map(|s| s.id).collect()
    }

    /// The requested scenario, or a random one for unknown / missing ids
    pub fn scenario(&mut self, id: Option<&str>) -> &'static Scenario {
        if let Some(found) = id.and_then(find_scenario) {
            return found;
        }
        SCENARIOS.choose(&mut self.rng).unwrap_or(&SCENARIOS[0])
    }

    /// Up to `count` tasks from one scenario
    pub fn task_sequence(&mut self, id: Option<&str>, count: usize) -> Vec<TaskPrompt> {
        let scenario = self.scenario(id);
        scenario
            .tasks
            .iter()
            .take(count)
            .map(|t| TaskPrompt {
                scenario_id: scenario.id.to_string(),
                scenario_title: scenario.title.to_string(),
                scenario_context: scenario.context.to_string(),
                goal: t.goal.to_string(),
                prompt: t.prompt.to_string(),
                template: t.template.to_string(),
                verb: t.verb.to_string(),
                tense: t.tense,
                person: t.person,
                success_criteria: t.success_criteria.to_string(),
                follow_up: t.follow_up.map(str::to_string),
            })
            .collect()
    }

    /// `None` when the task's verb cannot be conjugated
    pub fn evaluate(&self, user_answer: &str, task: &TaskPrompt) -> Option<TaskEvaluation> {
        let correct_form = self
            .conjugator
            .conjugate(&task.verb, task.tense, task.person)?;

        let user = normalize_answer(user_answer);
        let correct = normalize_answer(&correct_form);
        let grammatically_correct = user == correct;
        let communicatively_successful = communicates(&user, &correct);

        Some(TaskEvaluation {
            grammatically_correct,
            communicatively_successful,
            feedback: feedback(grammatically_correct, communicatively_successful, &task.goal),
            correct_form,
        })
    }

    pub fn mark_complete(&mut self, id: &str) -> bool {
        if find_scenario(id).is_none() {
            return false;
        }
        self.completed.insert(id.to_string());
        true
    }

    pub fn progress(&self) -> ScenarioProgress {
        let total = SCENARIOS.len();
        let completed = self.completed.len();
        ScenarioProgress {
            total_scenarios: total,
            completed_scenarios: completed,
            percentage: if total > 0 {
                completed as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            completed_list: self.completed.iter().cloned().collect(),
        }
    }
}

/// Exact, same stem prefix, or a small typo
fn communicates(user: &str, correct: &str) -> bool {
    if user == correct {
        return true;
    }
    if user.is_empty() {
        return false;
    }

    let user_len = user.chars().count();
    let correct_len = correct.chars().count();
    if user_len > STEM_PREFIX_LEN && correct_len > STEM_PREFIX_LEN {
        let same_prefix = user
            .chars()
            .take(STEM_PREFIX_LEN)
            .eq(correct.chars().take(STEM_PREFIX_LEN));
        if same_prefix {
            return true;
        }
    }

    strsim::levenshtein(user, correct) <= MAX_COMMUNICATIVE_DISTANCE
}

fn feedback(grammatical: bool, communicative: bool, goal: &str) -> String {
    match (grammatical, communicative) {
        (true, true) => format!("Excellent! You successfully achieved the goal: {goal}"),
        (false, true) => format!(
            "Good communication! Your message was understood, though the form wasn't perfect. Goal achieved: {goal}"
        ),
        (true, false) => {
            "Grammatically correct, but the message wasn't clear for the situation.".to_string()
        }
        (false, false) => format!("Let's try again. Remember the goal: {goal}"),
    }
}
