//! Common Types and Constants
//!
//! Shared data structures used across all algorithm modules.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Number of grammatical persons drilled per tense
pub const PERSON_COUNT: usize = 6;

/// Number of choices offered in a multiple-choice exercise
pub const CHOICE_COUNT: usize = 4;

/// Placeholder marking the blank in exercise sentences
pub const BLANK: &str = "______";

// ==================== Tense ====================

/// Verb tense / mood combinations supported by the conjugator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tense {
    Present,
    Preterite,
    Imperfect,
    Future,
    Conditional,
    PresentSubjunctive,
}

impl Tense {
    /// All tenses in teaching order
    pub const ALL: [Tense; 6] = [
        Tense::Present,
        Tense::Preterite,
        Tense::Imperfect,
        Tense::Future,
        Tense::Conditional,
        Tense::PresentSubjunctive,
    ];

    /// Storage / wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Preterite => "preterite",
            Self::Imperfect => "imperfect",
            Self::Future => "future",
            Self::Conditional => "conditional",
            Self::PresentSubjunctive => "present_subjunctive",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Preterite => "Preterite",
            Self::Imperfect => "Imperfect",
            Self::Future => "Future",
            Self::Conditional => "Conditional",
            Self::PresentSubjunctive => "Present Subjunctive",
        }
    }

    /// Parse either the identifier or the display name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "present" => Some(Self::Present),
            "preterite" | "preterit" => Some(Self::Preterite),
            "imperfect" => Some(Self::Imperfect),
            "future" => Some(Self::Future),
            "conditional" => Some(Self::Conditional),
            "present_subjunctive" | "subjunctive" => Some(Self::PresentSubjunctive),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// ==================== Person ====================

/// Grammatical person, indexed 0..=5
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Person {
    Yo,
    Tu,
    ElEllaUsted,
    Nosotros,
    Vosotros,
    EllosEllasUstedes,
}

impl Person {
    pub const ALL: [Person; PERSON_COUNT] = [
        Person::Yo,
        Person::Tu,
        Person::ElEllaUsted,
        Person::Nosotros,
        Person::Vosotros,
        Person::EllosEllasUstedes,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Label shown to the learner
    pub fn label(&self) -> &'static str {
        match self {
            Self::Yo => "yo",
            Self::Tu => "tú",
            Self::ElEllaUsted => "él/ella/usted",
            Self::Nosotros => "nosotros/nosotras",
            Self::Vosotros => "vosotros/vosotras",
            Self::EllosEllasUstedes => "ellos/ellas/ustedes",
        }
    }

    /// Reflexive pronoun used with pronominal verbs
    pub fn reflexive_pronoun(&self) -> &'static str {
        match self {
            Self::Yo => "me",
            Self::Tu => "te",
            Self::ElEllaUsted | Self::EllosEllasUstedes => "se",
            Self::Nosotros => "nos",
            Self::Vosotros => "os",
        }
    }

    /// Persons whose stressed stem vowel changes ("boot" pattern)
    pub fn is_stressed_stem(&self) -> bool {
        !matches!(self, Self::Nosotros | Self::Vosotros)
    }

    /// Third person singular or plural
    pub fn is_third(&self) -> bool {
        matches!(self, Self::ElEllaUsted | Self::EllosEllasUstedes)
    }

    /// Accepts an index ("0".."5"), a full label or its first pronoun ("él", "ellos")
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index);
        }
        Self::ALL.iter().copied().find(|p| {
            let label = p.label();
            label == s || label.split('/').any(|part| part == s)
        })
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ==================== Difficulty ====================

/// Exercise difficulty level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    /// Tenses drawn from when the caller does not pin one
    pub fn tenses(&self) -> &'static [Tense] {
        match self {
            Self::Beginner => &[Tense::Present, Tense::Preterite],
            Self::Intermediate => &[
                Tense::Present,
                Tense::Preterite,
                Tense::Imperfect,
                Tense::Future,
            ],
            Self::Advanced => &Tense::ALL,
        }
    }
}

// ==================== Exercise ====================

/// Position of an exercise inside a connected story
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoryPosition {
    pub title: String,
    /// 1-based position
    pub position: usize,
    pub total: usize,
}

/// A single fill-in-the-blank conjugation exercise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Sentence containing [`BLANK`]
    pub sentence: String,
    /// Expected conjugated form
    pub answer: String,
    /// Multiple-choice options, always containing `answer`
    pub choices: Vec<String>,
    pub verb: String,
    pub tense: Tense,
    pub person: Person,
    /// Short gloss, e.g. `[yo] hablar (Present)`
    pub translation: String,
    /// One-line description of what is being drilled
    pub context: String,
    /// Set when the exercise belongs to a story sequence
    pub story: Option<StoryPosition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tense_roundtrip_identifiers() {
        for tense in Tense::ALL {
            assert_eq!(Tense::from_str(tense.as_str()), Some(tense));
            assert_eq!(Tense::from_str(tense.display_name()), Some(tense));
        }
        assert_eq!(Tense::from_str("pluperfect"), None);
    }

    #[test]
    fn test_person_parsing() {
        assert_eq!(Person::from_str("0"), Some(Person::Yo));
        assert_eq!(Person::from_str("tú"), Some(Person::Tu));
        assert_eq!(Person::from_str("ella"), Some(Person::ElEllaUsted));
        assert_eq!(Person::from_str("ustedes"), Some(Person::EllosEllasUstedes));
        assert_eq!(Person::from_str("6"), None);
        assert_eq!(Person::from_str("vos"), None);
    }

    #[test]
    fn test_person_index_order() {
        for (i, person) in Person::ALL.iter().enumerate() {
            assert_eq!(person.index(), i);
            assert_eq!(Person::from_index(i), Some(*person));
        }
    }

    #[test]
    fn test_stressed_stem_persons() {
        assert!(Person::Yo.is_stressed_stem());
        assert!(Person::EllosEllasUstedes.is_stressed_stem());
        assert!(!Person::Nosotros.is_stressed_stem());
        assert!(!Person::Vosotros.is_stressed_stem());
    }

    #[test]
    fn test_difficulty_tenses() {
        assert_eq!(Difficulty::Beginner.tenses().len(), 2);
        assert_eq!(Difficulty::Intermediate.tenses().len(), 4);
        assert_eq!(Difficulty::Advanced.tenses().len(), 6);
        assert_eq!(Difficulty::default(), Difficulty::Intermediate);
    }
}
