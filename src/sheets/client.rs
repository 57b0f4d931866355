//! The seam between the sync writer and a spreadsheet service.

use thiserror::Error;

use crate::types::SheetTarget;

/// Outcome of asking the service to create a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabCreation {
    Created,
    /// The tab was already there; treated as success.
    AlreadyExists,
}

/// Error returned by a [`SheetsApi`] call.
#[derive(Debug, Error)]
pub enum SheetsApiError {
    /// Transport-level failure (connect, TLS, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("sheets api error {status}: {message}")]
    Api { status: u16, message: String },

    /// No access token could be obtained.
    #[error("auth error: {message}")]
    Auth { message: String },

    /// The service-account assertion could not be signed.
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// A request or response body could not be (de)serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("invalid request url: {message}")]
    InvalidUrl { message: String },
}

/// Minimal spreadsheet operations needed to publish a dataset.
pub trait SheetsApi {
    /// Create `target.tab_name`, reporting [`TabCreation::AlreadyExists`] instead of failing when
    /// the tab is already there.
    fn add_tab(&self, target: &SheetTarget) -> Result<TabCreation, SheetsApiError>;

    /// Clear every cell of the tab.
    fn clear_tab(&self, target: &SheetTarget) -> Result<(), SheetsApiError>;

    /// Overwrite cells row by row starting at `start_cell` (A1 notation, e.g. `A1`).
    fn update_values(
        &self,
        target: &SheetTarget,
        start_cell: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetsApiError>;
}

impl<T: SheetsApi + ?Sized> SheetsApi for &T {
    fn add_tab(&self, target: &SheetTarget) -> Result<TabCreation, SheetsApiError> {
        (**self).add_tab(target)
    }

    fn clear_tab(&self, target: &SheetTarget) -> Result<(), SheetsApiError> {
        (**self).clear_tab(target)
    }

    fn update_values(
        &self,
        target: &SheetTarget,
        start_cell: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetsApiError> {
        (**self).update_values(target, start_cell, values)
    }
}
