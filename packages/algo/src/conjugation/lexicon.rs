//! Verb lexicon
//!
//! Static tables for the verbs the drills know about: irregular paradigms,
//! stem-change classes, English glosses and the practice lists.

/// Vowel change applied to the stressed stem
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StemChange {
    /// pensar → pienso
    EIe,
    /// dormir → duermo
    OUe,
    /// jugar → juego
    UUe,
    /// pedir → pido
    EI,
}

impl StemChange {
    /// Vowel searched for (the last occurrence in the stem is changed)
    pub fn target(&self) -> char {
        match self {
            Self::EIe | Self::EI => 'e',
            Self::OUe => 'o',
            Self::UUe => 'u',
        }
    }

    pub fn stressed(&self) -> &'static str {
        match self {
            Self::EIe => "ie",
            Self::OUe | Self::UUe => "ue",
            Self::EI => "i",
        }
    }

    /// Unstressed raise used by -ir verbs (durmió, pidamos)
    pub fn raised(&self) -> Option<&'static str> {
        match self {
            Self::EIe | Self::EI => Some("i"),
            Self::OUe => Some("u"),
            Self::UUe => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::EIe => "e->ie",
            Self::OUe => "o->ue",
            Self::UUe => "u->ue",
            Self::EI => "e->i",
        }
    }
}

/// Irregular overrides; `None` fields fall back to the rules
#[derive(Clone, Copy, Debug)]
pub struct Irregular {
    pub present: Option<[&'static str; 6]>,
    /// Only the `yo` form is irregular (salgo, pongo)
    pub yo_present: Option<&'static str>,
    pub preterite: Option<[&'static str; 6]>,
    pub imperfect: Option<[&'static str; 6]>,
    /// Shared by future and conditional
    pub future_stem: Option<&'static str>,
    pub subjunctive: Option<[&'static str; 6]>,
}

impl Irregular {
    const NONE: Irregular = Irregular {
        present: None,
        yo_present: None,
        preterite: None,
        imperfect: None,
        future_stem: None,
        subjunctive: None,
    };

    /// The irregular `yo` present form, when one is listed
    pub fn yo_form(&self) -> Option<&'static str> {
        self.yo_present.or(self.present.map(|forms| forms[0]))
    }
}

/// One lexicon entry
#[derive(Clone, Copy, Debug)]
pub struct VerbEntry {
    pub infinitive: &'static str,
    pub meaning: &'static str,
    pub stem_change: Option<StemChange>,
    pub irregular: Option<&'static Irregular>,
}

// ==================== Irregular paradigms ====================

static SER: Irregular = Irregular {
    present: Some(["soy", "eres", "es", "somos", "sois", "son"]),
    preterite: Some(["fui", "fuiste", "fue", "fuimos", "fuisteis", "fueron"]),
    imperfect: Some(["era", "eras", "era", "éramos", "erais", "eran"]),
    subjunctive: Some(["sea", "seas", "sea", "seamos", "seáis", "sean"]),
    ..Irregular::NONE
};

static ESTAR: Irregular = Irregular {
    present: Some(["estoy", "estás", "está", "estamos", "estáis", "están"]),
    preterite: Some([
        "estuve",
        "estuviste",
        "estuvo",
        "estuvimos",
        "estuvisteis",
        "estuvieron",
    ]),
    subjunctive: Some(["esté", "estés", "esté", "estemos", "estéis", "estén"]),
    ..Irregular::NONE
};

static TENER: Irregular = Irregular {
    present: Some(["tengo", "tienes", "tiene", "tenemos", "tenéis", "tienen"]),
    preterite: Some(["tuve", "tuviste", "tuvo", "tuvimos", "tuvisteis", "tuvieron"]),
    future_stem: Some("tendr"),
    ..Irregular::NONE
};

static HACER: Irregular = Irregular {
    present: Some(["hago", "haces", "hace", "hacemos", "hacéis", "hacen"]),
    preterite: Some(["hice", "hiciste", "hizo", "hicimos", "hicisteis", "hicieron"]),
    future_stem: Some("har"),
    ..Irregular::NONE
};

static IR: Irregular = Irregular {
    present: Some(["voy", "vas", "va", "vamos", "vais", "van"]),
    preterite: Some(["fui", "fuiste", "fue", "fuimos", "fuisteis", "fueron"]),
    imperfect: Some(["iba", "ibas", "iba", "íbamos", "ibais", "iban"]),
    subjunctive: Some(["vaya", "vayas", "vaya", "vayamos", "vayáis", "vayan"]),
    ..Irregular::NONE
};

static PODER: Irregular = Irregular {
    preterite: Some(["pude", "pudiste", "pudo", "pudimos", "pudisteis", "pudieron"]),
    future_stem: Some("podr"),
    ..Irregular::NONE
};

static SABER: Irregular = Irregular {
    present: Some(["sé", "sabes", "sabe", "sabemos", "sabéis", "saben"]),
    preterite: Some(["supe", "supiste", "supo", "supimos", "supisteis", "supieron"]),
    future_stem: Some("sabr"),
    subjunctive: Some(["sepa", "sepas", "sepa", "sepamos", "sepáis", "sepan"]),
    ..Irregular::NONE
};

static DAR: Irregular = Irregular {
    present: Some(["doy", "das", "da", "damos", "dais", "dan"]),
    preterite: Some(["di", "diste", "dio", "dimos", "disteis", "dieron"]),
    subjunctive: Some(["dé", "des", "dé", "demos", "deis", "den"]),
    ..Irregular::NONE
};

static VER: Irregular = Irregular {
    present: Some(["veo", "ves", "ve", "vemos", "veis", "ven"]),
    preterite: Some(["vi", "viste", "vio", "vimos", "visteis", "vieron"]),
    imperfect: Some(["veía", "veías", "veía", "veíamos", "veíais", "veían"]),
    ..Irregular::NONE
};

static DECIR: Irregular = Irregular {
    present: Some(["digo", "dices", "dice", "decimos", "decís", "dicen"]),
    preterite: Some(["dije", "dijiste", "dijo", "dijimos", "dijisteis", "dijeron"]),
    future_stem: Some("dir"),
    ..Irregular::NONE
};

static QUERER: Irregular = Irregular {
    preterite: Some([
        "quise",
        "quisiste",
        "quiso",
        "quisimos",
        "quisisteis",
        "quisieron",
    ]),
    future_stem: Some("querr"),
    ..Irregular::NONE
};

static PONER: Irregular = Irregular {
    yo_present: Some("pongo"),
    preterite: Some(["puse", "pusiste", "puso", "pusimos", "pusisteis", "pusieron"]),
    future_stem: Some("pondr"),
    ..Irregular::NONE
};

static SALIR: Irregular = Irregular {
    yo_present: Some("salgo"),
    future_stem: Some("saldr"),
    ..Irregular::NONE
};

static VENIR: Irregular = Irregular {
    present: Some(["vengo", "vienes", "viene", "venimos", "venís", "vienen"]),
    preterite: Some(["vine", "viniste", "vino", "vinimos", "vinisteis", "vinieron"]),
    future_stem: Some("vendr"),
    ..Irregular::NONE
};

static PARECER: Irregular = Irregular {
    yo_present: Some("parezco"),
    ..Irregular::NONE
};

// ==================== Lexicon ====================

const fn regular(infinitive: &'static str, meaning: &'static str) -> VerbEntry {
    VerbEntry {
        infinitive,
        meaning,
        stem_change: None,
        irregular: None,
    }
}

const fn stem(infinitive: &'static str, meaning: &'static str, change: StemChange) -> VerbEntry {
    VerbEntry {
        infinitive,
        meaning,
        stem_change: Some(change),
        irregular: None,
    }
}

const fn irregular(
    infinitive: &'static str,
    meaning: &'static str,
    change: Option<StemChange>,
    table: &'static Irregular,
) -> VerbEntry {
    VerbEntry {
        infinitive,
        meaning,
        stem_change: change,
        irregular: Some(table),
    }
}

static LEXICON: &[VerbEntry] = &[
    // -ar
    regular("hablar", "to speak"),
    regular("trabajar", "to work"),
    regular("estudiar", "to study"),
    regular("caminar", "to walk"),
    regular("bailar", "to dance"),
    regular("cantar", "to sing"),
    regular("comprar", "to buy"),
    regular("escuchar", "to listen"),
    regular("mirar", "to look at"),
    regular("nadar", "to swim"),
    regular("preparar", "to prepare"),
    regular("presentar", "to introduce"),
    regular("tomar", "to take/drink"),
    regular("llegar", "to arrive"),
    regular("pasar", "to happen/pass"),
    regular("quedar", "to stay/remain"),
    regular("llevar", "to carry/wear"),
    regular("gustar", "to please"),
    regular("buscar", "to look for"),
    regular("levantar", "to lift"),
    // -er
    regular("comer", "to eat"),
    regular("beber", "to drink"),
    regular("leer", "to read"),
    regular("correr", "to run"),
    regular("aprender", "to learn"),
    regular("vender", "to sell"),
    regular("comprender", "to understand"),
    regular("creer", "to believe"),
    regular("responder", "to answer"),
    regular("deber", "should/must"),
    // -ir
    regular("vivir", "to live"),
    regular("escribir", "to write"),
    regular("abrir", "to open"),
    regular("recibir", "to receive"),
    regular("subir", "to go up"),
    regular("decidir", "to decide"),
    regular("permitir", "to allow"),
    regular("discutir", "to discuss"),
    regular("compartir", "to share"),
    // stem-changing
    stem("pensar", "to think", StemChange::EIe),
    stem("dormir", "to sleep", StemChange::OUe),
    stem("volver", "to return", StemChange::OUe),
    stem("pedir", "to ask for", StemChange::EI),
    stem("jugar", "to play", StemChange::UUe),
    stem("contar", "to count/tell", StemChange::OUe),
    stem("sentir", "to feel", StemChange::EIe),
    stem("doler", "to hurt", StemChange::OUe),
    stem("preferir", "to prefer", StemChange::EIe),
    stem("seguir", "to follow", StemChange::EI),
    // irregular
    irregular("ser", "to be (permanent)", None, &SER),
    irregular("estar", "to be (temporary)", None, &ESTAR),
    irregular("tener", "to have", None, &TENER),
    irregular("hacer", "to do/make", None, &HACER),
    irregular("ir", "to go", None, &IR),
    irregular("poder", "can/to be able", Some(StemChange::OUe), &PODER),
    irregular("saber", "to know (fact)", None, &SABER),
    irregular("dar", "to give", None, &DAR),
    irregular("ver", "to see", None, &VER),
    irregular("decir", "to say/tell", None, &DECIR),
    irregular("querer", "to want", Some(StemChange::EIe), &QUERER),
    irregular("poner", "to put", None, &PONER),
    irregular("salir", "to go out", None, &SALIR),
    irregular("venir", "to come", None, &VENIR),
    irregular("parecer", "to seem", None, &PARECER),
];

/// Look up a (non-reflexive) infinitive
pub fn lookup(infinitive: &str) -> Option<&'static VerbEntry> {
    LEXICON.iter().find(|entry| entry.infinitive == infinitive)
}

/// Every verb the lexicon knows
pub fn entries() -> &'static [VerbEntry] {
    LEXICON
}

// ==================== Practice lists ====================

pub const REGULAR_AR: &[&str] = &[
    "hablar", "trabajar", "estudiar", "caminar", "bailar", "cantar", "comprar", "escuchar",
    "mirar", "nadar",
];

pub const REGULAR_ER: &[&str] = &[
    "comer",
    "beber",
    "leer",
    "correr",
    "aprender",
    "vender",
    "comprender",
    "creer",
    "responder",
];

pub const REGULAR_IR: &[&str] = &[
    "vivir", "escribir", "abrir", "recibir", "subir", "decidir", "permitir", "discutir",
    "compartir",
];

/// Ordered by frequency; beginners only see the first five
pub const IRREGULAR_VERBS: &[&str] = &[
    "ser", "estar", "tener", "hacer", "ir", "poder", "saber", "dar", "ver", "decir",
];

pub const STEM_CHANGING_VERBS: &[&str] = &["pensar", "querer", "dormir", "volver", "pedir"];

/// English gloss, falling back to the infinitive itself
pub fn meaning(infinitive: &str) -> &str {
    let base = infinitive.strip_suffix("se").filter(|b| lookup(b).is_some());
    match lookup(base.unwrap_or(infinitive)) {
        Some(entry) => entry.meaning,
        None => infinitive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_practice_lists_are_in_lexicon() {
        for verb in REGULAR_AR
            .iter()
            .chain(REGULAR_ER)
            .chain(REGULAR_IR)
            .chain(IRREGULAR_VERBS)
            .chain(STEM_CHANGING_VERBS)
        {
            assert!(lookup(verb).is_some(), "{verb} missing from lexicon");
        }
    }

    #[test]
    fn test_lexicon_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for entry in entries() {
            assert!(seen.insert(entry.infinitive), "duplicate {}", entry.infinitive);
        }
    }

    #[test]
    fn test_meaning_fallbacks() {
        assert_eq!(meaning("tener"), "to have");
        assert_eq!(meaning("levantarse"), "to lift");
        assert_eq!(meaning("zzz"), "zzz");
    }

    #[test]
    fn test_yo_form() {
        assert_eq!(TENER.yo_form(), Some("tengo"));
        assert_eq!(SALIR.yo_form(), Some("salgo"));
        assert_eq!(PODER.yo_form(), None);
    }
}
