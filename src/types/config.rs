use crate::error::DiagError;
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_CSV_PATH: &str = "respuestas_diagnostico.csv";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_SHEETS_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagConfig {
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub sheets: Option<SheetsConfig>,
    pub gcp_service_account: Option<ServiceAccountKey>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormConfig {
    /// When set, all contact fields must be filled before scoring.
    #[serde(default)]
    pub contact_required: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Csv,
    Sheets,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            csv_path: default_csv_path(),
        }
    }
}

fn default_csv_path() -> PathBuf {
    PathBuf::from(DEFAULT_CSV_PATH)
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    pub sheet_url: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
}

/// Service-account key material, either inline under `[gcp_service_account]`
/// or loaded from the JSON key file Google issues.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub private_key_id: Option<String>,
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl DiagConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, DiagError> {
        self.server.bind.parse().map_err(|_| {
            DiagError::ConfigParse(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            ))
        })
    }

    pub fn sheets_timeout_ms(&self) -> u64 {
        self.sheets
            .as_ref()
            .and_then(|sheets| sheets.timeout_ms)
            .unwrap_or(DEFAULT_SHEETS_TIMEOUT_MS)
    }

    pub fn validate(&self) -> Result<(), DiagError> {
        self.bind_addr()?;

        if self.storage.csv_path.as_os_str().is_empty() {
            return Err(DiagError::ConfigParse(
                "storage.csv_path cannot be empty".to_string(),
            ));
        }

        if let Some(timeout_ms) = self.sheets.as_ref().and_then(|sheets| sheets.timeout_ms) {
            if timeout_ms == 0 {
                return Err(DiagError::ConfigParse(
                    "sheets.timeout_ms must be greater than 0".to_string(),
                ));
            }
        }

        if self.storage.backend == Backend::Sheets {
            let sheets = self.sheets.as_ref().ok_or_else(|| {
                DiagError::ConfigParse(
                    "storage.backend = \"sheets\" requires a [sheets] section".to_string(),
                )
            })?;
            let has_url = sheets
                .sheet_url
                .as_deref()
                .is_some_and(|url| !url.trim().is_empty());
            if !has_url {
                return Err(DiagError::ConfigParse(
                    "sheets.sheet_url is required for the sheets backend".to_string(),
                ));
            }
            if sheets.credentials_file.is_none() && self.gcp_service_account.is_none() {
                return Err(DiagError::ConfigParse(
                    "sheets backend needs sheets.credentials_file or a [gcp_service_account] table"
                        .to_string(),
                ));
            }
        }

        if let Some(key) = &self.gcp_service_account {
            if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
                return Err(DiagError::ConfigParse(
                    "gcp_service_account.client_email and private_key must be non-empty"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}
