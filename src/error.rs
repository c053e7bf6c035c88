use thiserror::Error;

use crate::sink::SinkError;

#[derive(Error, Debug)]
pub enum DiagError {
    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("invalid answers: {0}")]
    InvalidAnswers(String),

    #[error("storage error: {0}")]
    Sink(#[from] SinkError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DiagError>;
