pub mod csv_file;
pub mod google;
pub mod sheets;

use crate::error::{DiagError, Result};
use crate::types::config::{Backend, DiagConfig, ServiceAccountKey};
use crate::types::record::Row;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unexpected header in {path}: {found}")]
    SchemaMismatch { path: PathBuf, found: String },

    #[error("invalid service-account credentials: {0}")]
    Credentials(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid spreadsheet target: {0}")]
    InvalidTarget(String),

    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    Backend(String),
}

/// Destination that durably stores completed submissions.
pub trait Sink: Send + Sync {
    fn name(&self) -> &'static str;

    /// Appends one row, writing the header first if the target is empty.
    fn append(&self, row: &Row) -> std::result::Result<(), SinkError>;
}

/// Builds the configured backend. Relative paths resolve against `root`.
pub fn from_config(cfg: &DiagConfig, root: &Path) -> Result<Arc<dyn Sink>> {
    match cfg.storage.backend {
        Backend::Csv => {
            let path = resolve(root, &cfg.storage.csv_path);
            tracing::info!(path = %path.display(), "using csv sink");
            let sink: Arc<dyn Sink> = Arc::new(csv_file::CsvSink::new(path));
            Ok(sink)
        }
        Backend::Sheets => {
            let sheets = cfg.sheets.as_ref().ok_or_else(|| {
                DiagError::ConfigParse("sheets backend requires a [sheets] section".to_string())
            })?;
            let sheet_url = sheets.sheet_url.as_deref().ok_or_else(|| {
                DiagError::ConfigParse("sheets.sheet_url is required".to_string())
            })?;
            let key = match (&cfg.gcp_service_account, &sheets.credentials_file) {
                (Some(inline), _) => inline.clone(),
                (None, Some(file)) => load_key_file(&resolve(root, file))?,
                (None, None) => {
                    return Err(DiagError::ConfigParse(
                        "sheets backend needs service-account credentials".to_string(),
                    ))
                }
            };
            let spreadsheet_id = sheets::spreadsheet_id_from_url(sheet_url)?;
            let client = google::GoogleSheetsClient::new(key, cfg.sheets_timeout_ms())?;
            tracing::info!(spreadsheet_id = %spreadsheet_id, "using sheets sink");
            let sink: Arc<dyn Sink> = Arc::new(sheets::SheetsSink::new(client, spreadsheet_id));
            Ok(sink)
        }
    }
}

pub(crate) fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn load_key_file(path: &Path) -> Result<ServiceAccountKey> {
    if !path.exists() {
        return Err(DiagError::ConfigNotFound(path.display().to_string()));
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn csv_backend_is_the_default() {
        let dir = TempDir::new().expect("temp dir should be created");
        let cfg = DiagConfig::default();
        let sink = from_config(&cfg, dir.path()).expect("sink should build");
        assert_eq!(sink.name(), "csv");
    }

    #[test]
    fn sheets_backend_reports_missing_key_file() {
        let dir = TempDir::new().expect("temp dir should be created");
        let cfg: DiagConfig = toml::from_str(
            r#"
[storage]
backend = "sheets"

[sheets]
sheet_url = "https://docs.google.com/spreadsheets/d/abc/edit"
credentials_file = "missing.json"
"#,
        )
        .expect("config should parse");
        let result = from_config(&cfg, dir.path());
        assert!(matches!(result, Err(DiagError::ConfigNotFound(_))));
    }

    #[test]
    fn sheets_backend_rejects_unparseable_url() {
        let dir = TempDir::new().expect("temp dir should be created");
        let cfg: DiagConfig = toml::from_str(
            r#"
[storage]
backend = "sheets"

[sheets]
sheet_url = "https://example.com/not-a-sheet"

[gcp_service_account]
client_email = "bot@example.com"
private_key = "pem"
"#,
        )
        .expect("config should parse");
        let result = from_config(&cfg, dir.path());
        assert!(matches!(result, Err(DiagError::Sink(SinkError::InvalidTarget(_)))));
    }
}
