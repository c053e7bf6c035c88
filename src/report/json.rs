use crate::types::scoring::{Assessment, Tally};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ScoreReport<'a> {
    nivel: u8,
    etiqueta: &'a str,
    recomendacion: &'a str,
    tally: &'a Tally,
}

pub fn to_json(assessment: &Assessment) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ScoreReport {
        nivel: assessment.tier.level(),
        etiqueta: assessment.label(),
        recomendacion: assessment.recommendation(),
        tally: &assessment.tally,
    })
}
