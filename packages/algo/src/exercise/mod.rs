//! Local Exercise Generator
//!
//! Builds fill-in-the-blank conjugation exercises from sentence templates,
//! with multiple-choice distractors drawn from the same verb.
//!
//! Exercises come in three shapes:
//! - single exercises with optional pinned verb / tense / person
//! - batches drawn from caller-provided pools
//! - connected story sequences sharing one narrative

pub mod story;
pub mod templates;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::conjugation::lexicon::{
    IRREGULAR_VERBS, REGULAR_AR, REGULAR_ER, REGULAR_IR, STEM_CHANGING_VERBS,
};
use crate::conjugation::Conjugator;
use crate::types::{Difficulty, Exercise, Person, StoryPosition, Tense, CHOICE_COUNT};

/// Random exercises tried before giving up on a request
const MAX_FALLBACK_ATTEMPTS: usize = 10;

/// Irregular verbs considered basic enough for beginners
const BEGINNER_IRREGULAR_COUNT: usize = 5;

/// Tenses used as a second source of distractors
const DISTRACTOR_TENSES: [Tense; 4] = [
    Tense::Present,
    Tense::Preterite,
    Tense::Imperfect,
    Tense::Future,
];

// ==================== Verb pools ====================

/// Verbs drawn from when no verb is requested
pub fn verb_pool(difficulty: Difficulty) -> Vec<&'static str> {
    let regular = REGULAR_AR.iter().chain(REGULAR_ER).chain(REGULAR_IR);
    match difficulty {
        Difficulty::Beginner => regular
            .chain(IRREGULAR_VERBS.iter().take(BEGINNER_IRREGULAR_COUNT))
            .copied()
            .collect(),
        Difficulty::Intermediate => regular.chain(IRREGULAR_VERBS).copied().collect(),
        Difficulty::Advanced => IRREGULAR_VERBS
            .iter()
            .chain(STEM_CHANGING_VERBS)
            .copied()
            .collect(),
    }
}

// ==================== Generator ====================

pub struct ExerciseGenerator {
    conjugator: Conjugator,
    rng: ChaCha8Rng,
}

impl Default for ExerciseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExerciseGenerator {
    pub fn new() -> Self {
        Self {
            conjugator: Conjugator::new(),
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Create a generator with a fixed seed (for testing)
    pub fn with_seed(seed: u64) -> Self {
        Self {
            conjugator: Conjugator::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate a single exercise.
    ///
    /// Unset parameters are drawn according to `difficulty`. If the pinned
    /// combination cannot be conjugated a random exercise is produced
    /// instead; `None` only when every fallback attempt failed.
    pub fn generate_exercise(
        &mut self,
        verb: Option<&str>,
        tense: Option<Tense>,
        person: Option<Person>,
        difficulty: Difficulty,
    ) -> Option<Exercise> {
        if let Some(exercise) = self.try_generate(verb, tense, person, difficulty) {
            return Some(exercise);
        }

        (0..MAX_FALLBACK_ATTEMPTS).find_map(|_| self.try_generate(None, None, None, difficulty))
    }

    /// Generate `count` exercises, each drawing from the given pools
    /// (an empty pool means "pick by difficulty").
    pub fn generate_batch(
        &mut self,
        count: usize,
        verbs: &[String],
        tenses: &[Tense],
        persons: &[Person],
        difficulty: Difficulty,
    ) -> Vec<Exercise> {
        let mut exercises = Vec::with_capacity(count);
        for _ in 0..count {
            let verb = verbs.choose(&mut self.rng).cloned();
            let tense = tenses.choose(&mut self.rng).copied();
            let person = persons.choose(&mut self.rng).copied();
            if let Some(exercise) =
                self.generate_exercise(verb.as_deref(), tense, person, difficulty)
            {
                exercises.push(exercise);
            }
        }
        exercises
    }

    /// Generate up to `length` exercises from one connected story.
    ///
    /// Tenses without a story fall back to the present.
    pub fn generate_story_sequence(&mut self, tense: Tense, length: usize) -> Vec<Exercise> {
        let tense = story::story_tense(tense);
        let candidates = story::stories_for(tense);
        let Some(story) = candidates.choose(&mut self.rng) else {
            return Vec::new();
        };

        let total = length.min(story.lines.len());
        let mut exercises = Vec::with_capacity(total);

        for (i, line) in story.lines.iter().take(total).enumerate() {
            let Some(answer) = self.conjugator.conjugate(line.verb, tense, line.person) else {
                continue;
            };

            let mut choices = vec![answer.clone()];
            for other in story.lines.iter() {
                if choices.len() >= CHOICE_COUNT {
                    break;
                }
                if other.verb == line.verb && other.person == line.person {
                    continue;
                }
                if let Some(form) = self.conjugator.conjugate(other.verb, tense, other.person) {
                    push_unique(&mut choices, form);
                }
            }
            self.fill_choices(&mut choices, line.verb, tense, line.person);

            exercises.push(Exercise {
                sentence: line.sentence.to_string(),
                answer,
                choices,
                verb: line.verb.to_string(),
                tense,
                person: line.person,
                translation: gloss(line.verb, tense, line.person),
                context: format!("Part {} of story: {}", i + 1, story.title),
                story: Some(StoryPosition {
                    title: story.title.to_string(),
                    position: i + 1,
                    total,
                }),
            });
        }

        exercises
    }

    fn try_generate(
        &mut self,
        verb: Option<&str>,
        tense: Option<Tense>,
        person: Option<Person>,
        difficulty: Difficulty,
    ) -> Option<Exercise> {
        let verb = match verb {
            Some(v) => v.trim().to_lowercase(),
            None => self.pick_verb(difficulty).to_string(),
        };
        let tense = match tense {
            Some(t) => t,
            None => *difficulty.tenses().choose(&mut self.rng)?,
        };
        let person = match person {
            Some(p) => p,
            None => Person::from_index(self.rng.gen_range(0..Person::ALL.len()))?,
        };

        let answer = self.conjugator.conjugate(&verb, tense, person)?;

        let context = *templates::contexts_for(&verb).choose(&mut self.rng)?;
        let template = *templates::templates_for(tense, person).choose(&mut self.rng)?;
        let sentence = templates::render(template, context);

        let mut choices = vec![answer.clone()];
        self.fill_choices(&mut choices, &verb, tense, person);

        Some(Exercise {
            sentence,
            answer,
            choices,
            translation: gloss(&verb, tense, person),
            context: format!(
                "Verb: {} | Tense: {} | Person: {}",
                verb,
                tense.display_name(),
                person.label()
            ),
            verb,
            tense,
            person,
            story: None,
        })
    }

    fn pick_verb(&mut self, difficulty: Difficulty) -> &'static str {
        if difficulty == Difficulty::Beginner && self.rng.gen_bool(0.5) {
            let basics = &IRREGULAR_VERBS[..BEGINNER_IRREGULAR_COUNT];
            if let Some(verb) = basics.choose(&mut self.rng) {
                return *verb;
            }
        }
        let pool = match difficulty {
            Difficulty::Beginner => {
                let lists = [REGULAR_AR, REGULAR_ER, REGULAR_IR];
                lists[self.rng.gen_range(0..lists.len())].to_vec()
            }
            _ => verb_pool(difficulty),
        };
        pool.choose(&mut self.rng).copied().unwrap_or("hablar")
    }

    /// Top `choices` up to [`CHOICE_COUNT`] distinct forms and shuffle them.
    ///
    /// Order of sources: other persons, other tenses, filler forms.
    fn fill_choices(&mut self, choices: &mut Vec<String>, verb: &str, tense: Tense, person: Person) {
        for other in Person::ALL {
            if choices.len() >= CHOICE_COUNT {
                break;
            }
            if other == person {
                continue;
            }
            if let Some(form) = self.conjugator.conjugate(verb, tense, other) {
                push_unique(choices, form);
            }
        }

        for other in DISTRACTOR_TENSES {
            if choices.len() >= CHOICE_COUNT {
                break;
            }
            if other == tense {
                continue;
            }
            if let Some(form) = self.conjugator.conjugate(verb, other, person) {
                push_unique(choices, form);
            }
        }

        for filler in filler_forms(verb) {
            if choices.len() >= CHOICE_COUNT {
                break;
            }
            push_unique(choices, filler);
        }

        choices.truncate(CHOICE_COUNT);
        choices.shuffle(&mut self.rng);
    }
}

fn push_unique(choices: &mut Vec<String>, form: String) {
    if !choices.contains(&form) {
        choices.push(form);
    }
}

/// Non-finite look-alikes used when a verb has too few distinct forms
fn filler_forms(verb: &str) -> Vec<String> {
    let base = verb.strip_suffix("se").unwrap_or(verb);
    let stem = base.get(..base.len().saturating_sub(2)).unwrap_or(base);
    let (gerund, participle) = if base.ends_with("ar") {
        ("ando", "ado")
    } else {
        ("iendo", "ido")
    };
    vec![
        base.to_string(),
        format!("{stem}{gerund}"),
        format!("{stem}{participle}"),
        format!("{stem}{participle}s"),
    ]
}

fn gloss(verb: &str, tense: Tense, person: Person) -> String {
    format!("[{}] {} ({})", person.label(), verb, tense.display_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BLANK;

    fn assert_well_formed(exercise: &Exercise) {
        assert_eq!(exercise.choices.len(), CHOICE_COUNT, "{exercise:?}");
        assert!(exercise.choices.contains(&exercise.answer));
        let mut unique = exercise.choices.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), CHOICE_COUNT, "{:?}", exercise.choices);
        assert!(exercise.sentence.contains(BLANK));
    }

    #[test]
    fn test_pinned_exercise() {
        let mut generator = ExerciseGenerator::with_seed(42);
        let exercise = generator
            .generate_exercise(
                Some("hablar"),
                Some(Tense::Present),
                Some(Person::Yo),
                Difficulty::Intermediate,
            )
            .unwrap();

        assert_eq!(exercise.answer, "hablo");
        assert_eq!(exercise.verb, "hablar");
        assert_eq!(exercise.translation, "[yo] hablar (Present)");
        assert!(exercise.story.is_none());
        assert_well_formed(&exercise);
    }

    #[test]
    fn test_random_exercises_are_well_formed() {
        let mut generator = ExerciseGenerator::with_seed(7);
        for difficulty in Difficulty::ALL {
            for _ in 0..50 {
                let exercise = generator
                    .generate_exercise(None, None, None, difficulty)
                    .unwrap();
                assert_well_formed(&exercise);
                assert!(difficulty.tenses().contains(&exercise.tense));
            }
        }
    }

    #[test]
    fn test_beginner_verbs_stay_in_pool() {
        let pool = verb_pool(Difficulty::Beginner);
        let mut generator = ExerciseGenerator::with_seed(3);
        for _ in 0..50 {
            let exercise = generator
                .generate_exercise(None, None, None, Difficulty::Beginner)
                .unwrap();
            assert!(pool.contains(&exercise.verb.as_str()), "{}", exercise.verb);
        }
    }

    #[test]
    fn test_advanced_pool_has_no_regular_verbs() {
        let pool = verb_pool(Difficulty::Advanced);
        assert!(pool.contains(&"pedir"));
        assert!(!pool.contains(&"hablar"));
    }

    #[test]
    fn test_unconjugable_verb_falls_back() {
        let mut generator = ExerciseGenerator::with_seed(1);
        let exercise = generator
            .generate_exercise(Some("mesa"), None, None, Difficulty::Beginner)
            .unwrap();
        assert_ne!(exercise.verb, "mesa");
        assert_well_formed(&exercise);
    }

    #[test]
    fn test_unknown_verb_uses_default_context() {
        let mut generator = ExerciseGenerator::with_seed(9);
        let exercise = generator
            .generate_exercise(
                Some("cocinar"),
                Some(Tense::Future),
                Some(Person::Nosotros),
                Difficulty::Advanced,
            )
            .unwrap();
        assert_eq!(exercise.answer, "cocinaremos");
        assert!(templates::DEFAULT_CONTEXTS
            .iter()
            .any(|c| exercise.sentence.contains(c)));
    }

    #[test]
    fn test_same_seed_same_output() {
        let mut a = ExerciseGenerator::with_seed(123);
        let mut b = ExerciseGenerator::with_seed(123);
        for _ in 0..10 {
            assert_eq!(
                a.generate_exercise(None, None, None, Difficulty::Advanced),
                b.generate_exercise(None, None, None, Difficulty::Advanced)
            );
        }
    }

    #[test]
    fn test_batch_respects_pools() {
        let mut generator = ExerciseGenerator::with_seed(5);
        let verbs = vec!["comer".to_string(), "vivir".to_string()];
        let batch = generator.generate_batch(
            12,
            &verbs,
            &[Tense::Imperfect],
            &[Person::Tu, Person::Vosotros],
            Difficulty::Beginner,
        );
        assert_eq!(batch.len(), 12);
        for exercise in &batch {
            assert!(verbs.contains(&exercise.verb));
            assert_eq!(exercise.tense, Tense::Imperfect);
            assert!(matches!(exercise.person, Person::Tu | Person::Vosotros));
            assert_well_formed(exercise);
        }
    }

    #[test]
    fn test_story_sequence() {
        let mut generator = ExerciseGenerator::with_seed(11);
        let story = generator.generate_story_sequence(Tense::Imperfect, 5);
        assert_eq!(story.len(), 5);
        assert_eq!(story[0].answer, "vivía");
        assert_eq!(story[2].answer, "jugábamos");
        for (i, exercise) in story.iter().enumerate() {
            let pos = exercise.story.as_ref().unwrap();
            assert_eq!(pos.title, "Cuando era niño");
            assert_eq!(pos.position, i + 1);
            assert_eq!(pos.total, 5);
            assert_well_formed(exercise);
        }
    }

    #[test]
    fn test_story_unknown_tense_falls_back_to_present() {
        let mut generator = ExerciseGenerator::with_seed(2);
        let story = generator.generate_story_sequence(Tense::Conditional, 3);
        assert_eq!(story.len(), 3);
        assert!(story.iter().all(|e| e.tense == Tense::Present));
        assert_eq!(story[0].answer, "me levanto");
    }

    #[test]
    fn test_story_length_is_clamped() {
        let mut generator = ExerciseGenerator::with_seed(4);
        let story = generator.generate_story_sequence(Tense::Preterite, 50);
        assert_eq!(story.len(), 5);
        assert!(generator.generate_story_sequence(Tense::Preterite, 0).is_empty());
    }

    #[test]
    fn test_filler_forms_are_distinct() {
        let fillers = filler_forms("levantarse");
        assert_eq!(fillers[0], "levantar");
        assert_eq!(fillers[1], "levantando");
        let mut unique = fillers.clone();
        unique.dedup();
        assert_eq!(unique.len(), fillers.len());
    }
}
