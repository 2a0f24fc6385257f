//! Rule-based Spanish conjugator
//!
//! Resolution order for a `(verb, tense, person)` request:
//! 1. Reflexive infinitives (`-arse/-erse/-irse`) are conjugated on their
//!    base verb and prefixed with the reflexive pronoun.
//! 2. Irregular paradigm tables from the [`lexicon`].
//! 3. Rules: regular endings, stem changes (boot pattern plus the `-ir`
//!    raise), orthographic changes (`-car/-gar/-zar`, `-ger/-gir`,
//!    `-guir`), `-eer` preterite y-forms and the `-uir` y-insertion.
//!
//! Verbs outside the lexicon are treated as regular as long as the
//! infinitive has a recognizable ending.

pub mod lexicon;

pub use lexicon::{StemChange, VerbEntry};

use crate::types::{Person, Tense, PERSON_COUNT};

// ==================== Endings ====================

/// Infinitive class
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerbEnding {
    Ar,
    Er,
    Ir,
}

impl VerbEnding {
    pub fn of(infinitive: &str) -> Option<Self> {
        if infinitive.ends_with("ar") {
            Some(Self::Ar)
        } else if infinitive.ends_with("er") {
            Some(Self::Er)
        } else if infinitive.ends_with("ir") {
            Some(Self::Ir)
        } else {
            None
        }
    }

    fn row(&self) -> usize {
        match self {
            Self::Ar => 0,
            Self::Er => 1,
            Self::Ir => 2,
        }
    }
}

type EndingTable = [[&'static str; PERSON_COUNT]; 3];

const PRESENT_ENDINGS: EndingTable = [
    ["o", "as", "a", "amos", "áis", "an"],
    ["o", "es", "e", "emos", "éis", "en"],
    ["o", "es", "e", "imos", "ís", "en"],
];

const PRETERITE_ENDINGS: EndingTable = [
    ["é", "aste", "ó", "amos", "asteis", "aron"],
    ["í", "iste", "ió", "imos", "isteis", "ieron"],
    ["í", "iste", "ió", "imos", "isteis", "ieron"],
];

/// -er/-ir preterite when the stem ends in a vowel (leer → leyó, construir → construyó)
const PRETERITE_VOWEL_STEM_ENDINGS: [&str; PERSON_COUNT] =
    ["í", "íste", "yó", "ímos", "ísteis", "yeron"];

const IMPERFECT_ENDINGS: EndingTable = [
    ["aba", "abas", "aba", "ábamos", "abais", "aban"],
    ["ía", "ías", "ía", "íamos", "íais", "ían"],
    ["ía", "ías", "ía", "íamos", "íais", "ían"],
];

const FUTURE_ENDINGS: [&str; PERSON_COUNT] = ["é", "ás", "á", "emos", "éis", "án"];

const CONDITIONAL_ENDINGS: [&str; PERSON_COUNT] = ["ía", "ías", "ía", "íamos", "íais", "ían"];

const SUBJUNCTIVE_ENDINGS: EndingTable = [
    ["e", "es", "e", "emos", "éis", "en"],
    ["a", "as", "a", "amos", "áis", "an"],
    ["a", "as", "a", "amos", "áis", "an"],
];

/// Shortest infinitive accepted for verbs outside the lexicon
const MIN_UNKNOWN_INFINITIVE_LEN: usize = 3;

// ==================== Conjugator ====================

/// Verb classification used by the practice lists and statistics
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerbClass {
    Regular,
    StemChanging,
    Irregular,
}

/// Stateless conjugation engine
#[derive(Clone, Copy, Debug, Default)]
pub struct Conjugator;

impl Conjugator {
    pub fn new() -> Self {
        Self
    }

    /// Conjugate `infinitive` for `tense` and `person`.
    ///
    /// Returns `None` when the infinitive is not a recognizable verb.
    pub fn conjugate(&self, infinitive: &str, tense: Tense, person: Person) -> Option<String> {
        let infinitive = infinitive.trim().to_lowercase();

        if let Some(base) = reflexive_base(&infinitive) {
            let form = conjugate_base(base, tense, person)?;
            return Some(format!("{} {}", person.reflexive_pronoun(), form));
        }

        conjugate_base(&infinitive, tense, person)
    }

    /// All six forms of a tense, or `None` if any form is missing
    pub fn all_conjugations(&self, infinitive: &str, tense: Tense) -> Option<Vec<String>> {
        Person::ALL
            .iter()
            .map(|&person| self.conjugate(infinitive, tense, person))
            .collect()
    }

    /// Whether the infinitive can be conjugated at all
    pub fn can_conjugate(&self, infinitive: &str) -> bool {
        self.conjugate(infinitive, Tense::Present, Person::Yo).is_some()
    }

    pub fn verb_class(&self, infinitive: &str) -> VerbClass {
        let infinitive = infinitive.trim().to_lowercase();
        let base = reflexive_base(&infinitive).unwrap_or(&infinitive);
        match lexicon::lookup(base) {
            Some(entry) if entry.irregular.is_some() => VerbClass::Irregular,
            Some(entry) if entry.stem_change.is_some() => VerbClass::StemChanging,
            _ => VerbClass::Regular,
        }
    }
}

/// `levantarse` → `levantar`
fn reflexive_base(infinitive: &str) -> Option<&str> {
    let base = infinitive.strip_suffix("se")?;
    let known = lexicon::lookup(base).is_some();
    if (known || base.chars().count() >= MIN_UNKNOWN_INFINITIVE_LEN)
        && VerbEnding::of(base).is_some()
    {
        Some(base)
    } else {
        None
    }
}

fn conjugate_base(infinitive: &str, tense: Tense, person: Person) -> Option<String> {
    let ending = VerbEnding::of(infinitive)?;
    let entry = lexicon::lookup(infinitive);
    if entry.is_none() && infinitive.chars().count() < MIN_UNKNOWN_INFINITIVE_LEN {
        return None;
    }

    let irregular = entry.and_then(|e| e.irregular);
    let stem_change = entry.and_then(|e| e.stem_change);
    let p = person.index();

    if let Some(irr) = irregular {
        let table = match tense {
            Tense::Present => irr.present,
            Tense::Preterite => irr.preterite,
            Tense::Imperfect => irr.imperfect,
            Tense::PresentSubjunctive => irr.subjunctive,
            Tense::Future | Tense::Conditional => None,
        };
        if let Some(forms) = table {
            return Some(forms[p].to_string());
        }
    }

    let stem = &infinitive[..infinitive.len() - 2];
    let row = ending.row();

    let form = match tense {
        Tense::Present => {
            if person == Person::Yo {
                if let Some(yo) = irregular.and_then(|irr| irr.yo_present) {
                    return Some(yo.to_string());
                }
            }
            let mut stem = match stem_change {
                Some(change) if person.is_stressed_stem() => {
                    change_stem(stem, change.target(), change.stressed())
                }
                _ => stem.to_string(),
            };
            if inserts_y(&stem, ending) && person.is_stressed_stem() {
                stem.push('y');
            } else if person == Person::Yo && ending != VerbEnding::Ar {
                stem = soften_before_a_o(&stem);
            }
            stem + PRESENT_ENDINGS[row][p]
        }
        Tense::Preterite => {
            let mut stem = match stem_change.and_then(|c| c.raised().map(|r| (c, r))) {
                Some((change, raised)) if ending == VerbEnding::Ir && person.is_third() => {
                    change_stem(stem, change.target(), raised)
                }
                _ => stem.to_string(),
            };
            if ending == VerbEnding::Ar {
                if person == Person::Yo {
                    stem = harden_before_e(&stem);
                }
                stem + PRETERITE_ENDINGS[row][p]
            } else if inserts_y(&stem, ending) {
                if person.is_third() {
                    stem + PRETERITE_VOWEL_STEM_ENDINGS[p]
                } else {
                    stem + PRETERITE_ENDINGS[row][p]
                }
            } else if ends_with_vowel(&stem) {
                stem + PRETERITE_VOWEL_STEM_ENDINGS[p]
            } else {
                stem + PRETERITE_ENDINGS[row][p]
            }
        }
        Tense::Imperfect => stem.to_string() + IMPERFECT_ENDINGS[row][p],
        Tense::Future | Tense::Conditional => {
            let future_stem = irregular
                .and_then(|irr| irr.future_stem)
                .unwrap_or(infinitive);
            let endings = if tense == Tense::Future {
                &FUTURE_ENDINGS
            } else {
                &CONDITIONAL_ENDINGS
            };
            future_stem.to_string() + endings[p]
        }
        Tense::PresentSubjunctive => {
            let yo_stem = irregular
                .and_then(|irr| irr.yo_form())
                .and_then(|yo| yo.strip_suffix('o'));
            let stem = match (yo_stem, stem_change) {
                (Some(yo_stem), _) => yo_stem.to_string(),
                (None, Some(change)) if person.is_stressed_stem() => {
                    change_stem(stem, change.target(), change.stressed())
                }
                (None, Some(change)) if ending == VerbEnding::Ir => match change.raised() {
                    Some(raised) => change_stem(stem, change.target(), raised),
                    None => stem.to_string(),
                },
                _ => stem.to_string(),
            };
            let stem = if ending == VerbEnding::Ar {
                harden_before_e(&stem)
            } else if yo_stem.is_some() {
                stem
            } else if inserts_y(&stem, ending) {
                stem + "y"
            } else {
                soften_before_a_o(&stem)
            };
            stem + SUBJUNCTIVE_ENDINGS[row][p]
        }
    };

    Some(form)
}

// ==================== Stem rules ====================

/// Replace the last `target` vowel of the stem
fn change_stem(stem: &str, target: char, replacement: &str) -> String {
    match stem.char_indices().rev().find(|&(_, c)| c == target) {
        Some((idx, c)) => {
            let mut changed = String::with_capacity(stem.len() + replacement.len());
            changed.push_str(&stem[..idx]);
            changed.push_str(replacement);
            changed.push_str(&stem[idx + c.len_utf8()..]);
            changed
        }
        None => stem.to_string(),
    }
}

/// c → qu, g → gu, z → c before an `e` ending (busqué, llegue, empecé)
fn harden_before_e(stem: &str) -> String {
    if let Some(prefix) = stem.strip_suffix('c') {
        format!("{prefix}qu")
    } else if stem.ends_with("gu") {
        stem.to_string()
    } else if let Some(prefix) = stem.strip_suffix('g') {
        format!("{prefix}gu")
    } else if let Some(prefix) = stem.strip_suffix('z') {
        format!("{prefix}c")
    } else {
        stem.to_string()
    }
}

/// Spelling before an `a`/`o` ending of an -er/-ir verb:
/// gu → g for -guir (sigo, distinga), g → j for -ger/-gir (recojo, recoja)
fn soften_before_a_o(stem: &str) -> String {
    if let Some(prefix) = stem.strip_suffix("gu") {
        format!("{prefix}g")
    } else if let Some(prefix) = stem.strip_suffix('g') {
        format!("{prefix}j")
    } else {
        stem.to_string()
    }
}

/// -uir verbs other than -guir/-quir take a `y` before non-`i` endings
/// (construyo, construya, construyó)
fn inserts_y(stem: &str, ending: VerbEnding) -> bool {
    ending == VerbEnding::Ir && stem.ends_with('u') && !stem.ends_with("gu") && !stem.ends_with("qu")
}

fn ends_with_vowel(stem: &str) -> bool {
    matches!(stem.chars().last(), Some('a' | 'e' | 'o'))
}
