use serde::{Deserialize, Serialize};
use std::fmt;

pub const QUESTION_COUNT: usize = 7;

/// One answer choice. Letters are ordered from least to most mature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    pub const ALL: [Letter; 4] = [Letter::A, Letter::B, Letter::C, Letter::D];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'a' => Some(Self::A),
            'b' => Some(Self::B),
            'c' => Some(Self::C),
            'd' => Some(Self::D),
            _ => None,
        }
    }

    /// Accepts a bare letter (`"c"`) or a rendered option (`"c) Tenemos un plan"`).
    pub fn parse(raw: &str) -> Option<Self> {
        let head = raw.split(')').next().unwrap_or_default().trim();
        let mut chars = head.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Self::from_char(ch),
            _ => None,
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub number: usize,
    pub prompt: &'static str,
    /// Answer text for a, b, c, d in that order.
    pub options: [&'static str; 4],
}

impl Question {
    pub fn field_name(&self) -> String {
        format!("q{}", self.number)
    }

    pub fn option(&self, letter: Letter) -> &'static str {
        match letter {
            Letter::A => self.options[0],
            Letter::B => self.options[1],
            Letter::C => self.options[2],
            Letter::D => self.options[3],
        }
    }

    pub fn choices(&self) -> impl Iterator<Item = (Letter, &'static str)> + '_ {
        Letter::ALL.into_iter().map(|letter| (letter, self.option(letter)))
    }
}

pub const QUESTIONS: [Question; QUESTION_COUNT] = [
    Question {
        number: 1,
        prompt: "¿Han hablado en su empresa sobre usar IA o cómo podría ayudarles?",
        options: [
            "Apenas empezamos a hablar del tema.",
            "Vemos cómo aplicarla en algunas partes.",
            "Tenemos un plan claro y metas.",
            "Es parte esencial de cómo operamos.",
        ],
    },
    Question {
        number: 2,
        prompt: "¿Por qué les interesa la IA?",
        options: [
            "Curiosidad: entender de qué se trata.",
            "Probar mejoras específicas.",
            "Aumentar eficiencia/experiencia de cliente.",
            "Liderar, crear cosas nuevas y nuevos ingresos.",
        ],
    },
    Question {
        number: 3,
        prompt: "¿Tienen equipo experto en IA?",
        options: [
            "No y no pensamos contratar aún.",
            "Buscando/tenemos algunas personas para pilotos.",
            "Equipo que hace que la IA funcione día a día.",
            "Varios equipos expertos y liderazgo claro en IA.",
        ],
    },
    Question {
        number: 4,
        prompt: "¿Cómo están sus datos para IA?",
        options: [
            "Problema: no sabemos usarlos bien.",
            "Empezando a ordenarlos y prepararlos.",
            "Plan para calidad, linaje y preparación.",
            "Gestión avanzada y operación a gran escala.",
        ],
    },
    Question {
        number: 5,
        prompt: "¿Usan IA en el día a día?",
        options: [
            "No, solo ideas.",
            "Pruebas o proyectos pequeños.",
            "Al menos un proyecto en producción con buenos resultados.",
            "La IA está en casi todo o habilita nuevos productos/servicios.",
        ],
    },
    Question {
        number: 6,
        prompt: "¿Resultados/ganancias de IA?",
        options: [
            "Aún no medimos o es muy pronto.",
            "Vemos potencial pero sin resultados claros.",
            "Sí, beneficios visibles (eficiencia, menos errores...).",
            "Gran valor: más ingresos y mejores decisiones.",
        ],
    },
    Question {
        number: 7,
        prompt: "¿IA responsable?",
        options: [
            "No lo hemos pensado mucho.",
            "Reglas básicas iniciales.",
            "Políticas y planes claras.",
            "Gobierno de datos/IA responsable es parte de la cultura.",
        ],
    },
];

pub const SIZE_BUCKETS: [&str; 4] = [
    "Menos de 10",
    "Entre 11 y 50",
    "Entre 51 y 250",
    "Más de 250",
];

pub const SECTORS: [&str; 7] = [
    "Comercio",
    "Manufactura",
    "Servicios",
    "Salud",
    "Educación",
    "Tecnología",
    "Otro",
];

/// Select-box placeholder; submitting it means "no sector".
pub const SECTOR_PLACEHOLDER: &str = "Selecciona...";

/// Parses a compact answer string such as `"abcdabc"` or `"a,b,c,d,a,b,c"`.
/// Returns `None` on the first character that is not a letter choice.
pub fn parse_answer_list(raw: &str) -> Option<Vec<Letter>> {
    raw.chars()
        .filter(|ch| !ch.is_whitespace() && *ch != ',')
        .map(Letter::from_char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_parse_accepts_bare_and_rendered_options() {
        assert_eq!(Letter::parse("a"), Some(Letter::A));
        assert_eq!(Letter::parse(" D "), Some(Letter::D));
        assert_eq!(
            Letter::parse("c) Tenemos un plan claro y metas."),
            Some(Letter::C)
        );
    }

    #[test]
    fn letter_parse_rejects_unknown_input() {
        assert_eq!(Letter::parse(""), None);
        assert_eq!(Letter::parse("e"), None);
        assert_eq!(Letter::parse("ab"), None);
        assert_eq!(Letter::parse(") a"), None);
    }

    #[test]
    fn questions_are_numbered_in_order() {
        for (idx, question) in QUESTIONS.iter().enumerate() {
            assert_eq!(question.number, idx + 1);
            assert_eq!(question.field_name(), format!("q{}", idx + 1));
        }
    }

    #[test]
    fn parse_answer_list_handles_separators() {
        let letters = parse_answer_list("a, b c,d").expect("answers should parse");
        assert_eq!(letters, vec![Letter::A, Letter::B, Letter::C, Letter::D]);
        assert!(parse_answer_list("abx").is_none());
    }
}
