use std::collections::BTreeMap;
use std::io::Write;

use conjugar_algo::{Conjugator, Person, Tense, VerbClass};

use super::{print_json, OutputFormat};
use crate::error::{AppError, AppResult};

/// Print the conjugation table of a verb, for one tense or all of them
pub fn run<W: Write>(out: &mut W, verb: &str, tense: Option<Tense>, format: OutputFormat) -> AppResult<()> {
    let conjugator = Conjugator::new();
    let verb = verb.trim().to_lowercase();
    if !conjugator.can_conjugate(&verb) {
        return Err(AppError::InvalidInput(format!("cannot conjugate '{}'", verb)));
    }

    let tenses: Vec<Tense> = match tense {
        Some(t) => vec![t],
        None => Tense::ALL.to_vec(),
    };
    let table: Vec<(Tense, Vec<String>)> = tenses
        .into_iter()
        .filter_map(|t| conjugator.all_conjugations(&verb, t).map(|forms| (t, forms)))
        .collect();

    if format == OutputFormat::Json {
        let json: BTreeMap<&str, &Vec<String>> =
            table.iter().map(|(t, forms)| (t.as_str(), forms)).collect();
        return print_json(out, &json);
    }

    let class = match conjugator.verb_class(&verb) {
        VerbClass::Irregular => "irregular",
        VerbClass::StemChanging => "stem-changing",
        VerbClass::Regular => "regular",
    };
    writeln!(out, "{} ({})", verb, class)?;
    for (tense, forms) in &table {
        writeln!(out)?;
        writeln!(out, "{}", tense.display_name())?;
        for (person, form) in Person::ALL.iter().zip(forms) {
            writeln!(out, "  {:<20} {}", person.label(), form)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_single_tense_table() {
        let mut out = Vec::new();
        run(&mut out, "Hablar", Some(Tense::Present), OutputFormat::Plain).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("hablar (regular)"));
        assert!(text.contains("hablamos"));
        assert!(!text.contains("Preterite"));
    }

    #[test]
    fn json_table_has_every_tense() {
        let mut out = Vec::new();
        run(&mut out, "ser", None, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["present"][0], "soy");
        assert_eq!(value.as_object().unwrap().len(), Tense::ALL.len());
    }

    #[test]
    fn unknown_verb_is_rejected() {
        let mut out = Vec::new();
        assert!(run(&mut out, "xyz", None, OutputFormat::Plain).is_err());
    }
}
