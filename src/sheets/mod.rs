//! Publishing merged datasets to a spreadsheet tab.
//!
//! - [`client`]: the [`SheetsApi`] seam and its error type
//! - [`google`]: the Google Sheets v4 implementation
//! - [`writer`]: the two-phase clear-then-write publisher

pub mod client;
pub mod google;
pub mod writer;

pub use client::{SheetsApi, SheetsApiError, TabCreation};
pub use google::GoogleSheetsClient;
pub use writer::{ClearedTab, PublishFailure, PublishPhase, PublishReport, SheetSyncWriter, START_CELL};
