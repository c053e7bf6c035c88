use crate::types::questionnaire::Letter;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Awareness = 1,
    Active = 2,
    Operational = 3,
    Systematic = 4,
    Transformational = 5,
}

impl Tier {
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Label shown to respondents and persisted in the `etiqueta` column.
    pub fn label(self) -> &'static str {
        match self {
            Self::Awareness => "Conciencia",
            Self::Active => "Activo",
            Self::Operational => "Operacional",
            Self::Systematic => "Sistemático",
            Self::Transformational => "Transformacional",
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Self::Awareness => "Nivel 1 – Conciencia: inicien pilotos y capacitación básica.",
            Self::Active => "Nivel 2 – Activo: formalicen PoC, métricas y roadmap corto.",
            Self::Operational => "Nivel 3 – Operacional: escalen con gobierno de datos y MLOps.",
            Self::Systematic => {
                "Nivel 4 – Sistemático: integren IA en productos y cadena de valor."
            }
            Self::Transformational => {
                "Nivel 5 – Transformacional: IA como motor estratégico del negocio."
            }
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nivel {} – {}", self.level(), self.label())
    }
}

/// Frequency of each letter across the answered questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
}

impl Tally {
    pub fn from_letters<I>(letters: I) -> Self
    where
        I: IntoIterator<Item = Letter>,
    {
        let mut tally = Self::default();
        for letter in letters {
            match letter {
                Letter::A => tally.a += 1,
                Letter::B => tally.b += 1,
                Letter::C => tally.c += 1,
                Letter::D => tally.d += 1,
            }
        }
        tally
    }

    pub fn max(&self) -> usize {
        self.a.max(self.b).max(self.c).max(self.d)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub tier: Tier,
    pub tally: Tally,
}

impl Assessment {
    pub fn label(&self) -> &'static str {
        self.tier.label()
    }

    pub fn recommendation(&self) -> &'static str {
        self.tier.recommendation()
    }
}
