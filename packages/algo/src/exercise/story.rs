//! Connected stories
//!
//! Each story is a short narrative in one tense; every line drills one verb
//! so that consecutive exercises share a context.

use crate::types::{Person, Tense};

pub struct StoryLine {
    pub sentence: &'static str,
    pub verb: &'static str,
    pub person: Person,
}

pub struct Story {
    pub title: &'static str,
    pub tense: Tense,
    pub lines: &'static [StoryLine],
}

const fn line(sentence: &'static str, verb: &'static str, person: Person) -> StoryLine {
    StoryLine {
        sentence,
        verb,
        person,
    }
}

pub static STORIES: &[Story] = &[
    Story {
        title: "Un día en la playa",
        tense: Tense::Preterite,
        lines: &[
            line("Ayer mi familia y yo ______ a la playa.", "ir", Person::Nosotros),
            line("______ muy temprano por la mañana.", "salir", Person::Nosotros),
            line("Mi hermana ______ sándwiches para todos.", "preparar", Person::ElEllaUsted),
            line("Los niños ______ en el mar todo el día.", "nadar", Person::EllosEllasUstedes),
            line("Por la tarde, ______ helados y descansamos.", "comer", Person::Nosotros),
        ],
    },
    Story {
        title: "Mi primer día de trabajo",
        tense: Tense::Preterite,
        lines: &[
            line("______ muy nervioso esa mañana.", "estar", Person::Yo),
            line("______ a la oficina media hora antes.", "llegar", Person::Yo),
            line("Mi jefe me ______ a todo el equipo.", "presentar", Person::ElEllaUsted),
            line("Todos ______ muy amables conmigo.", "ser", Person::EllosEllasUstedes),
            line("Al final del día, me ______ muy contento.", "sentir", Person::Yo),
        ],
    },
    Story {
        title: "Mi rutina diaria",
        tense: Tense::Present,
        lines: &[
            line("Todos los días ______ a las 7 de la mañana.", "levantarse", Person::Yo),
            line("Primero ______ un café bien fuerte.", "tomar", Person::Yo),
            line("Después ______ el periódico en línea.", "leer", Person::Yo),
            line(
                "Mi esposa ______ el desayuno mientras yo me ducho.",
                "preparar",
                Person::ElEllaUsted,
            ),
            line("Los dos ______ de casa a las 8:30.", "salir", Person::Nosotros),
        ],
    },
    Story {
        title: "Cuando era niño",
        tense: Tense::Imperfect,
        lines: &[
            line("Cuando era niño, ______ en un pueblo pequeño.", "vivir", Person::Yo),
            line("Mi abuela siempre ______ historias fascinantes.", "contar", Person::ElEllaUsted),
            line("Mis hermanos y yo ______ en el jardín.", "jugar", Person::Nosotros),
            line("Los domingos ______ a visitar a los primos.", "ir", Person::Nosotros),
            line("______ una vida muy tranquila y feliz.", "ser", Person::ElEllaUsted),
        ],
    },
];

/// Tense actually used for a story request; tenses without stories use the present
pub fn story_tense(requested: Tense) -> Tense {
    if STORIES.iter().any(|s| s.tense == requested) {
        requested
    } else {
        Tense::Present
    }
}

/// Stories written in `tense`
pub fn stories_for(tense: Tense) -> Vec<&'static Story> {
    STORIES.iter().filter(|s| s.tense == tense).collect()
}
