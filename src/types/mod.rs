pub mod config;
pub mod questionnaire;
pub mod record;
pub mod scoring;
