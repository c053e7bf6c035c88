pub mod json;
pub mod md;

use crate::error::DiagError;
use crate::types::scoring::Assessment;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
}

pub fn render(assessment: &Assessment, format: OutputFormat) -> Result<String, DiagError> {
    match format {
        OutputFormat::Json => json::to_json(assessment).map_err(DiagError::Json),
        OutputFormat::Md => Ok(md::to_markdown(assessment)),
    }
}
