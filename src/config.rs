//! Publish target configuration.
//!
//! The spreadsheet id, tab name and service-account credentials come from the environment (a
//! `.env` file is loaded first when present). Missing values are a startup failure.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::error::{SyncError, SyncResult};
use crate::types::SheetTarget;

pub const SPREADSHEET_ID_VAR: &str = "GOOGLE_SHEETS_SPREADSHEET_ID";
pub const TARGET_SHEET_VAR: &str = "TARGET_SHEET_NAME";
pub const PUBLIC_TARGET_SHEET_VAR: &str = "NEXT_PUBLIC_TARGET_SHEET_NAME";
pub const SERVICE_ACCOUNT_VAR: &str = "SHEETS_SERVICE_ACCOUNT";
pub const SERVICE_ACCOUNT_EMAIL_VAR: &str = "GOOGLE_SERVICE_ACCOUNT_EMAIL";
pub const SERVICE_ACCOUNT_KEY_VAR: &str = "GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY";

/// Tab used when no tab name is configured.
pub const DEFAULT_TAB_NAME: &str = "data_integration";

/// Service identity and PEM private key.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Everything needed to publish.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub spreadsheet_id: String,
    pub tab_name: String,
    pub credentials: ServiceAccountKey,
}

impl PublishConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> SyncResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`; empty values count as unset.
    ///
    /// Credentials come from the base64 service-account JSON in `SHEETS_SERVICE_ACCOUNT`, or
    /// failing that from `GOOGLE_SERVICE_ACCOUNT_EMAIL` + `GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY`.
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let spreadsheet_id = get(SPREADSHEET_ID_VAR)
            .ok_or_else(|| SyncError::config(format!("Missing environment variable: {SPREADSHEET_ID_VAR}")))?;
        let tab_name = get(TARGET_SHEET_VAR)
            .or_else(|| get(PUBLIC_TARGET_SHEET_VAR))
            .unwrap_or_else(|| DEFAULT_TAB_NAME.to_string());

        let credentials = match get(SERVICE_ACCOUNT_VAR) {
            Some(b64) => decode_service_account(&b64)?,
            None => {
                let client_email = get(SERVICE_ACCOUNT_EMAIL_VAR).ok_or_else(|| {
                    SyncError::config(format!(
                        "Missing environment variable: {SERVICE_ACCOUNT_VAR} or {SERVICE_ACCOUNT_EMAIL_VAR}"
                    ))
                })?;
                let private_key = get(SERVICE_ACCOUNT_KEY_VAR).ok_or_else(|| {
                    SyncError::config(format!("Missing environment variable: {SERVICE_ACCOUNT_KEY_VAR}"))
                })?;
                ServiceAccountKey {
                    client_email,
                    private_key: normalize_private_key(&private_key),
                }
            }
        };

        Ok(Self {
            spreadsheet_id,
            tab_name,
            credentials,
        })
    }

    pub fn target(&self) -> SheetTarget {
        SheetTarget::new(&self.spreadsheet_id, &self.tab_name)
    }
}

/// Decode base64 service-account JSON; `client_email` and `private_key` must be present.
pub fn decode_service_account(b64: &str) -> SyncResult<ServiceAccountKey> {
    let invalid = || SyncError::config(format!("Failed to decode or parse {SERVICE_ACCOUNT_VAR} (base64 JSON)"));

    let bytes = STANDARD.decode(b64.trim()).map_err(|_| invalid())?;
    let raw: serde_json::Value = serde_json::from_slice(&bytes).map_err(|_| invalid())?;
    let mut key: ServiceAccountKey = serde_json::from_value(raw)
        .map_err(|_| SyncError::config("Service account JSON missing fields"))?;
    if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
        return Err(SyncError::config("Service account JSON missing fields"));
    }
    key.private_key = normalize_private_key(&key.private_key);
    Ok(key)
}

/// Turn literal `\n` escapes into newlines, unify line endings and trim.
pub fn normalize_private_key(key: &str) -> String {
    key.replace("\\n", "\n")
        .replace("\r\n", "\n")
        .trim()
        .to_string()
}
