//! Google Sheets v4 REST client.
//!
//! Authenticates as a service account: the target spreadsheet must be shared
//! with the account's `client_email`.

mod auth;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use marksync_shared::{MarksyncError, Result, SheetsConfig, resolve_credentials_path};

use crate::{SheetHandle, SpreadsheetClient};

use auth::TokenProvider;
pub use auth::ServiceAccountKey;

/// User-Agent string for Sheets requests.
const USER_AGENT: &str = concat!("marksync/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    /// Absent when the sheet is empty.
    #[serde(default)]
    values: Vec<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`SpreadsheetClient`] backed by the Google Sheets API.
pub struct GoogleSheetsClient {
    http: Client,
    api_base: Url,
    tokens: TokenProvider,
}

impl GoogleSheetsClient {
    /// Locate and load the service-account key named by `config`, then build
    /// a client.
    pub fn from_config(config: &SheetsConfig) -> Result<Self> {
        let path = resolve_credentials_path(config)?;
        debug!(path = %path.display(), "loading service-account key");
        let key = ServiceAccountKey::from_file(&path)?;
        Self::new(config, key)
    }

    pub fn new(config: &SheetsConfig, key: ServiceAccountKey) -> Result<Self> {
        let api_base = Url::parse(&config.api_base).map_err(|e| {
            MarksyncError::config(format!("invalid sheets api_base {:?}: {e}", config.api_base))
        })?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.write_timeout_secs))
            .build()
            .map_err(|e| MarksyncError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base,
            tokens: TokenProvider::new(key),
        })
    }

    /// The account the target spreadsheet has to be shared with.
    pub fn service_account_email(&self) -> &str {
        self.tokens.client_email()
    }

    /// `{api_base}/v4/spreadsheets/{id}/{rest..}`
    fn endpoint(&self, spreadsheet_id: &str, rest: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| MarksyncError::config("sheets api_base cannot be a base URL"))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id])
            .extend(rest);
        Ok(url)
    }

    fn values_endpoint(&self, sheet: &SheetHandle, suffix: &str) -> Result<Url> {
        let range = format!("{}{suffix}", a1_sheet_range(&sheet.sheet_title));
        self.endpoint(&sheet.spreadsheet_id, &["values", &range])
    }

    async fn send(&self, method: Method, url: Url, what: &str) -> Result<Response> {
        self.send_with(self.http.request(method, url), what).await
    }

    async fn send_with(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let token = self.tokens.access_token(&self.http).await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| MarksyncError::Network(format!("{what}: {e}")))?;
        check_status(response, what).await
    }
}

/// Whole-sheet A1 range: the quoted title, with embedded quotes doubled.
fn a1_sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = google_error_message(&body).unwrap_or_else(|| status.to_string());
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            MarksyncError::Authorization(format!("{what}: {detail}"))
        }
        StatusCode::NOT_FOUND => MarksyncError::NotFound(format!("{what}: {detail}")),
        _ => MarksyncError::Network(format!("{what}: HTTP {status}: {detail}")),
    })
}

/// Pull `error.message` out of a Google API error body.
fn google_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["error"]["message"].as_str().map(str::to_string)
}

#[async_trait]
impl SpreadsheetClient for GoogleSheetsClient {
    #[instrument(skip_all, fields(spreadsheet_id = %spreadsheet_id))]
    async fn resolve(&self, spreadsheet_id: &str) -> Result<SheetHandle> {
        let mut url = self.endpoint(spreadsheet_id, &[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let meta: SpreadsheetMeta = self
            .send(Method::GET, url, "open spreadsheet")
            .await?
            .json()
            .await
            .map_err(|e| MarksyncError::validation(format!("spreadsheet metadata: {e}")))?;

        let first = meta.sheets.into_iter().next().ok_or_else(|| {
            MarksyncError::NotFound(format!("spreadsheet {spreadsheet_id} has no sheets"))
        })?;

        Ok(SheetHandle {
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_title: first.properties.title,
        })
    }

    async fn read_all_rows(&self, sheet: &SheetHandle) -> Result<Vec<Vec<String>>> {
        let url = self.values_endpoint(sheet, "")?;
        let range: ValueRange = self
            .send(Method::GET, url, "read rows")
            .await?
            .json()
            .await
            .map_err(|e| MarksyncError::validation(format!("value range: {e}")))?;
        Ok(range.values)
    }

    async fn clear(&self, sheet: &SheetHandle) -> Result<()> {
        let url = self.values_endpoint(sheet, ":clear")?;
        let request = self.http.post(url).json(&serde_json::json!({}));
        self.send_with(request, "clear sheet").await?;
        Ok(())
    }

    async fn append_row(&self, sheet: &SheetHandle, row: &[String]) -> Result<()> {
        let mut url = self.values_endpoint(sheet, ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let request = self
            .http
            .post(url)
            .json(&serde_json::json!({ "values": [row] }));
        self.send_with(request, "append row").await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "google-sheets"
    }
}
