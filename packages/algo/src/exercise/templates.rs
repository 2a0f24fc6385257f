//! Sentence templates and verb contexts
//!
//! Templates contain the blank and a `{context}` slot filled with a phrase
//! that fits the verb being drilled.

use crate::types::{Person, Tense};

/// Slot replaced by a verb context
pub const CONTEXT_SLOT: &str = "{context}";

type PersonTemplates = [&'static [&'static str]; 6];

const PRESENT: PersonTemplates = [
    &[
        "______ {context} todos los días.",
        "Siempre ______ {context}.",
        "Normalmente ______ {context}.",
        "______ {context} con frecuencia.",
    ],
    &[
        "¿______ {context}?",
        "Tú ______ {context}.",
        "¿Por qué ______ {context}?",
        "Cuando ______ {context}, me avisas.",
    ],
    &[
        "Ella ______ {context}.",
        "Mi hermano ______ {context}.",
        "El profesor ______ {context}.",
        "María ______ {context} los lunes.",
    ],
    &[
        "______ {context} juntos.",
        "Nosotros ______ {context}.",
        "______ {context} en equipo.",
        "Siempre ______ {context} los domingos.",
    ],
    &[
        "Vosotros ______ {context}.",
        "¿______ {context} los sábados?",
        "______ {context} muy bien.",
        "Cuando ______ {context}, decidme.",
    ],
    &[
        "Ellos ______ {context}.",
        "Mis amigos ______ {context}.",
        "Los estudiantes ______ {context}.",
        "______ {context} todas las semanas.",
    ],
];

const PRETERITE: PersonTemplates = [
    &["Ayer ______ {context}.", "La semana pasada ______ {context}."],
    &["¿______ {context} ayer?", "______ {context} el lunes pasado."],
    &["Ella ______ {context} anoche.", "Juan ______ {context} el año pasado."],
    &["______ {context} juntos el mes pasado.", "Nosotros ______ {context} ayer."],
    &["¿______ {context} el fin de semana?", "Vosotros ______ {context} anoche."],
    &["Ellos ______ {context} la semana pasada.", "______ {context} hace dos días."],
];

const IMPERFECT: PersonTemplates = [
    &["Cuando era niño, ______ {context}.", "Antes ______ {context} más."],
    &["Cuando eras joven, ¿______ {context}?", "Tú siempre ______ {context}."],
    &[
        "Mi abuelo ______ {context} todos los días.",
        "Ella ______ {context} cuando vivía allí.",
    ],
    &["______ {context} cada verano.", "Nosotros ______ {context} juntos."],
    &["Vosotros ______ {context} mucho.", "¿______ {context} en aquella época?"],
    &["Ellos ______ {context} frecuentemente.", "Mis padres ______ {context} siempre."],
];

const FUTURE: PersonTemplates = [
    &["Mañana ______ {context}.", "______ {context} la próxima semana."],
    &["¿______ {context} conmigo?", "______ {context} el domingo."],
    &["Ella ______ {context} pronto.", "Mi jefe ______ {context} mañana."],
    &["______ {context} juntos.", "Nosotros ______ {context} el próximo mes."],
    &["¿______ {context} en verano?", "Vosotros ______ {context} mañana."],
    &["Ellos ______ {context} el año que viene.", "Mis amigos ______ {context} pronto."],
];

const CONDITIONAL: PersonTemplates = [
    &["Con más tiempo, ______ {context}.", "Yo que tú, ______ {context}."],
    &["¿______ {context} por mí?", "Tú ______ {context} si pudieras."],
    &["Ella ______ {context} con gusto.", "Mi madre ______ {context} si tuviera dinero."],
    &["______ {context} si no lloviera.", "Nosotros ______ {context} encantados."],
    &["¿______ {context} en mi lugar?", "Vosotros ______ {context} sin dudarlo."],
    &["Ellos ______ {context} con más ayuda.", "Mis primos ______ {context} en verano."],
];

const SUBJUNCTIVE: PersonTemplates = [
    &["Es importante que ______ {context}.", "Espero que ______ {context}."],
    &["Es necesario que ______ {context}.", "Quiero que ______ {context}."],
    &["Es posible que ella ______ {context}.", "Dudo que él ______ {context}."],
    &["Es mejor que ______ {context}.", "Ojalá ______ {context}."],
    &["Es importante que ______ {context}.", "Prefiero que ______ {context}."],
    &["Es probable que ellos ______ {context}.", "No creo que ______ {context}."],
];

/// Templates for a tense / person pair (never empty)
pub fn templates_for(tense: Tense, person: Person) -> &'static [&'static str] {
    let table = match tense {
        Tense::Present => &PRESENT,
        Tense::Preterite => &PRETERITE,
        Tense::Imperfect => &IMPERFECT,
        Tense::Future => &FUTURE,
        Tense::Conditional => &CONDITIONAL,
        Tense::PresentSubjunctive => &SUBJUNCTIVE,
    };
    table[person.index()]
}

/// Used for verbs without a dedicated context list
pub const DEFAULT_CONTEXTS: &[&str] = &["hoy", "a menudo", "con cuidado", "sin problema"];

const VERB_CONTEXTS: &[(&str, &[&str])] = &[
    ("hablar", &["español", "con mis amigos", "por teléfono", "en clase"]),
    ("trabajar", &["en la oficina", "desde casa", "mucho", "en equipo"]),
    ("estudiar", &["para el examen", "matemáticas", "en la biblioteca", "medicina"]),
    ("caminar", &["por el parque", "al trabajo", "despacio", "con el perro"]),
    ("bailar", &["salsa", "en la fiesta", "toda la noche", "con mi pareja"]),
    ("cantar", &["en el coro", "una canción", "en la ducha", "muy bien"]),
    ("comprar", &["pan", "ropa nueva", "en el mercado", "un regalo"]),
    ("escuchar", &["música", "la radio", "a la profesora", "un podcast"]),
    ("comer", &["en el restaurante", "pizza", "con la familia", "tarde"]),
    ("beber", &["agua", "café", "un zumo", "mucho té"]),
    ("leer", &["el periódico", "una novela", "en la cama", "las noticias"]),
    ("correr", &["en el parque", "cada mañana", "una maratón", "rápido"]),
    ("aprender", &["inglés", "a cocinar", "mucho", "algo nuevo"]),
    ("vender", &["fruta", "la casa", "en la tienda", "coches"]),
    ("vivir", &["en Madrid", "cerca del parque", "solo", "en un apartamento"]),
    ("escribir", &["un libro", "cartas", "en el diario", "poemas"]),
    ("abrir", &["la ventana", "la puerta", "una cuenta", "la tienda"]),
    ("recibir", &["un paquete", "buenas noticias", "visitas", "un correo"]),
    ("ser", &["feliz", "profesor", "importante", "amable"]),
    ("estar", &["en casa", "cansado", "ocupado", "contento"]),
    ("tener", &["tiempo", "hambre", "un coche nuevo", "razón"]),
    ("hacer", &["ejercicio", "la tarea", "un pastel", "deporte"]),
    ("ir", &["al parque", "de compras", "a la playa", "al cine"]),
    ("poder", &["ayudarte", "venir mañana", "hacerlo", "entender"]),
    ("saber", &["la respuesta", "cocinar", "la verdad", "nadar"]),
    ("dar", &["un regalo", "las gracias", "un consejo", "clases"]),
    ("ver", &["la película", "a mis amigos", "el partido", "las noticias"]),
    ("decir", &["la verdad", "algo importante", "que sí", "adiós"]),
    ("querer", &["un café", "viajar", "más tiempo", "aprender"]),
    ("poner", &["la mesa", "la música", "atención", "la radio"]),
    ("salir", &["con amigos", "de casa", "temprano", "a cenar"]),
    ("venir", &["a la fiesta", "en tren", "mañana", "con nosotros"]),
    ("pensar", &["en el futuro", "mucho", "en ti", "antes de hablar"]),
    ("dormir", &["ocho horas", "la siesta", "bien", "en el sofá"]),
    ("volver", &["a casa", "tarde", "en autobús", "pronto"]),
    ("pedir", &["la cuenta", "ayuda", "una pizza", "perdón"]),
    ("jugar", &["al fútbol", "a las cartas", "en el jardín", "con los niños"]),
];

/// Context phrases for a verb, falling back to [`DEFAULT_CONTEXTS`]
pub fn contexts_for(verb: &str) -> &'static [&'static str] {
    VERB_CONTEXTS
        .iter()
        .find(|(v, _)| *v == verb)
        .map(|(_, contexts)| *contexts)
        .unwrap_or(DEFAULT_CONTEXTS)
}

/// Fill the context slot
pub fn render(template: &str, context: &str) -> String {
    template.replace(CONTEXT_SLOT, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BLANK;

    #[test]
    fn test_every_template_has_blank_and_slot() {
        for tense in Tense::ALL {
            for person in Person::ALL {
                let templates = templates_for(tense, person);
                assert!(!templates.is_empty());
                for t in templates {
                    assert!(t.contains(BLANK), "{t}");
                    assert!(t.contains(CONTEXT_SLOT), "{t}");
                }
            }
        }
    }

    #[test]
    fn test_contexts_fallback() {
        assert_eq!(contexts_for("hablar")[0], "español");
        assert_eq!(contexts_for("cocinar"), DEFAULT_CONTEXTS);
    }

    #[test]
    fn test_render() {
        assert_eq!(render("Ayer ______ {context}.", "pizza"), "Ayer ______ pizza.");
    }
}
