//! Google Sheets v4 client authenticated with a service account.

use crate::sink::sheets::SheetsApi;
use crate::sink::SinkError;
use crate::types::config::ServiceAccountKey;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;

const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// refresh a little before Google expires the token
const EXPIRY_MARGIN_SECS: i64 = 60;
const MAX_TOKEN_LIFETIME_SECS: i64 = 86_400;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Token server lifetimes are clamped to a day before the date math.
    fn issued(value: String, now: DateTime<Utc>, expires_in: i64) -> Self {
        let lifetime = expires_in.clamp(0, MAX_TOKEN_LIFETIME_SECS);
        Self {
            value,
            expires_at: now + ChronoDuration::seconds(lifetime),
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + ChronoDuration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Process-lifetime client. Construct once and share; the access token is
/// cached inside and refreshed when it nears expiry.
pub struct GoogleSheetsClient {
    agent: ureq::Agent,
    endpoint: String,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    token: Mutex<Option<AccessToken>>,
}

impl GoogleSheetsClient {
    pub fn new(key: ServiceAccountKey, timeout_ms: u64) -> Result<Self, SinkError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SinkError::Credentials(e.to_string()))?;
        let timeout = Duration::from_millis(timeout_ms.max(100));
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .user_agent(concat!("diagnostico/", env!("CARGO_PKG_VERSION")))
            .build();
        Ok(Self {
            agent,
            endpoint: SHEETS_ENDPOINT.to_string(),
            key,
            signing_key,
            token: Mutex::new(None),
        })
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, SinkError> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        jsonwebtoken::encode(&header, &claims, &self.signing_key)
            .map_err(|e| SinkError::Credentials(e.to_string()))
    }

    fn access_token(&self) -> Result<String, SinkError> {
        let mut cached = self
            .token
            .lock()
            .map_err(|_| SinkError::Backend("token cache lock poisoned".to_string()))?;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let assertion = self.signed_assertion(now)?;
        tracing::debug!(token_uri = %self.key.token_uri, "requesting access token");
        let response = self
            .agent
            .post(&self.key.token_uri)
            .send_form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .map_err(|err| match from_ureq(err) {
                SinkError::Http { status, body } => SinkError::Auth(format!("{status}: {body}")),
                other => other,
            })?;
        let parsed: TokenResponse = response
            .into_json()
            .map_err(|e| SinkError::Auth(format!("unreadable token response: {e}")))?;

        let token = AccessToken::issued(parsed.access_token, now, parsed.expires_in);
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn spreadsheet_url(
        &self,
        spreadsheet_id: &str,
        tail: &[&str],
    ) -> Result<url::Url, SinkError> {
        let mut url = url::Url::parse(&self.endpoint)
            .map_err(|e| SinkError::InvalidTarget(format!("{}: {e}", self.endpoint)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SinkError::InvalidTarget(self.endpoint.clone()))?;
            segments.push(spreadsheet_id);
            segments.extend(tail);
        }
        Ok(url)
    }

    fn get_json(&self, url: &url::Url) -> Result<Value, SinkError> {
        let token = self.access_token()?;
        let response = self
            .agent
            .request_url("GET", url)
            .set("Authorization", &format!("Bearer {token}"))
            .call()
            .map_err(from_ureq)?;
        response
            .into_json()
            .map_err(|e| SinkError::Transport(format!("unreadable response: {e}")))
    }
}

impl SheetsApi for GoogleSheetsClient {
    fn first_sheet_title(&self, spreadsheet_id: &str) -> Result<String, SinkError> {
        let mut url = self.spreadsheet_url(spreadsheet_id, &[])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties.title");
        let body = self.get_json(&url)?;
        first_title(&body).ok_or_else(|| {
            SinkError::InvalidTarget(format!("spreadsheet {spreadsheet_id} has no worksheets"))
        })
    }

    fn read_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, SinkError> {
        let url = self.spreadsheet_url(spreadsheet_id, &["values", range])?;
        let body = self.get_json(&url)?;
        Ok(values_matrix(&body))
    }

    fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<(), SinkError> {
        let target = format!("{range}:append");
        let mut url = self.spreadsheet_url(spreadsheet_id, &["values", target.as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let token = self.access_token()?;
        self.agent
            .request_url("POST", &url)
            .set("Authorization", &format!("Bearer {token}"))
            .send_json(json!({ "majorDimension": "ROWS", "values": rows }))
            .map_err(from_ureq)?;
        Ok(())
    }
}

fn first_title(body: &Value) -> Option<String> {
    body.get("sheets")?
        .as_array()?
        .first()?
        .pointer("/properties/title")?
        .as_str()
        .map(str::to_string)
}

fn values_matrix(body: &Value) -> Vec<Vec<String>> {
    body.get("values")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| cells.iter().map(cell_text).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn from_ureq(err: ureq::Error) -> SinkError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response
                .into_string()
                .map(|body| error_message(&body))
                .unwrap_or_default();
            SinkError::Http { status, body }
        }
        ureq::Error::Transport(transport) => SinkError::Transport(transport.to_string()),
    }
}

/// Pulls `error.message` out of a Google error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
