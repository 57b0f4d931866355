//! Google Sheets API v4 client over blocking `reqwest`.
//!
//! Authenticates as a service account: a signed RS256 assertion is exchanged for an OAuth access
//! token once, when the client connects.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::ServiceAccountKey;
use crate::types::SheetTarget;

use super::client::{SheetsApi, SheetsApiError, TabCreation};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdate {
    requests: Vec<AddSheetRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddSheetRequest {
    add_sheet: AddSheet,
}

#[derive(Serialize)]
struct AddSheet {
    properties: SheetProperties,
}

#[derive(Serialize)]
struct SheetProperties {
    title: String,
}

/// [`SheetsApi`] implementation for Google Sheets.
pub struct GoogleSheetsClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl fmt::Debug for GoogleSheetsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleSheetsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GoogleSheetsClient {
    /// Obtain an access token for `credentials` and build a client.
    pub fn connect(credentials: &ServiceAccountKey) -> Result<Self, SheetsApiError> {
        let client = Client::new();
        let access_token = fetch_access_token(&client, credentials, TOKEN_URL)?;
        Ok(Self {
            client,
            base_url: SHEETS_BASE_URL.to_string(),
            access_token,
        })
    }

    /// Build a client from an already-issued token, optionally against another base URL.
    pub fn with_token(access_token: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.unwrap_or_else(|| SHEETS_BASE_URL.to_string()),
            access_token: access_token.into(),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, SheetsApiError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| SheetsApiError::InvalidUrl {
            message: format!("{}: {e}", self.base_url),
        })?;
        url.path_segments_mut()
            .map_err(|_| SheetsApiError::InvalidUrl {
                message: format!("{} cannot be a base url", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl SheetsApi for GoogleSheetsClient {
    fn add_tab(&self, target: &SheetTarget) -> Result<TabCreation, SheetsApiError> {
        let url = self.url(&[&format!("{}:batchUpdate", target.spreadsheet_id)])?;
        let body = BatchUpdate {
            requests: vec![AddSheetRequest {
                add_sheet: AddSheet {
                    properties: SheetProperties {
                        title: target.tab_name.clone(),
                    },
                },
            }],
        };
        let res = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()?;

        match check(res) {
            Ok(_) => Ok(TabCreation::Created),
            Err(SheetsApiError::Api { status, message }) if is_already_exists(status, &message) => {
                Ok(TabCreation::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    fn clear_tab(&self, target: &SheetTarget) -> Result<(), SheetsApiError> {
        let range = target.whole_tab_range();
        let url = self.url(&[&target.spreadsheet_id, "values", &format!("{range}:clear")])?;
        let res = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({}))
            .send()?;
        check(res).map(|_| ())
    }

    fn update_values(
        &self,
        target: &SheetTarget,
        start_cell: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetsApiError> {
        let range = target.range_from(start_cell);
        let url = self.url(&[&target.spreadsheet_id, "values", &range])?;
        let body = ValueRange {
            range: &range,
            major_dimension: "ROWS",
            values,
        };
        let res = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()?;
        check(res).map(|_| ())
    }
}

fn fetch_access_token(
    client: &Client,
    credentials: &ServiceAccountKey,
    token_url: &str,
) -> Result<String, SheetsApiError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        iss: &credentials.client_email,
        scope: SHEETS_SCOPE,
        aud: token_url,
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };
    let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())?;
    let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?;

    let res = client
        .post(token_url)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()?;
    let status = res.status();
    if !status.is_success() {
        let text = res.text().unwrap_or_default();
        return Err(SheetsApiError::Auth {
            message: format!("token request failed ({status}): {text}"),
        });
    }
    let token: TokenResponse = res.json()?;
    Ok(token.access_token)
}

fn check(res: Response) -> Result<Response, SheetsApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().unwrap_or_default();
    Err(SheetsApiError::Api {
        status: status.as_u16(),
        message: error_message(&text),
    })
}

/// Message from a Google error envelope, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

fn is_already_exists(status: u16, message: &str) -> bool {
    status == 400 && message.contains("already exists")
}
