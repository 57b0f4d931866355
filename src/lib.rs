//! `csv-sheet-sync` merges a ZIP bundle of CSV reports into one date-sorted
//! [`types::MergedDataset`] and publishes it, as a full overwrite, to a spreadsheet tab.
//!
//! The primary entrypoint is [`pipeline::process_upload`], which runs an uploaded archive through
//! every stage and folds the outcome into an `{ok, rowsWritten}` / `{ok: false, message}` response.
//!
//! ## Stages
//!
//! 1. **Collect**: every `*.csv` entry of the archive, each under a 25 MiB ceiling.
//! 2. **Parse**: decode (UTF-8 by default, BOM-aware) and split into ragged rows.
//! 3. **Extract**: one of two strategies turns raw rows into output rows:
//!    - *positional*: a fixed report layout; whole column ranges are dropped, two substring
//!      filters must match, and the date column must parse;
//!    - *named mapping*: a caller-supplied mapping from six logical fields
//!      (Station, Cluster, Type, Region, Remark, Date) to each file's own headers.
//! 4. **Merge & sort**: rows are concatenated in file order and stably sorted by date.
//! 5. **Publish**: ensure the tab exists, clear it, write header and rows from `A1`.
//!
//! ## Quick example: merge without publishing
//!
//! ```rust
//! use csv_sheet_sync::processing::{merge_sources, ColumnSpec, ExtractionStrategy, ParsedSource};
//! use csv_sheet_sync::types::RawRow;
//!
//! let spec = ColumnSpec::from_letters(&[], &[("B", "Station")], "A").unwrap();
//! let strategy = ExtractionStrategy::Positional(spec);
//!
//! let files = vec![ParsedSource::new(
//!     "report.csv",
//!     vec![
//!         RawRow::new(["Date", "Kind"]),
//!         RawRow::new(["1/3/2024", "Station"]),
//!         RawRow::new(["1/1/2024", "Depot"]),
//!         RawRow::new(["1/2/2024", "Station 2"]),
//!     ],
//! )];
//!
//! let ds = merge_sources(&files, &strategy).unwrap();
//! assert_eq!(ds.header, vec!["Date", "Kind"]);
//! assert_eq!(ds.row_count(), 2);
//! assert_eq!(ds.rows[0].cells[0], "1/2/2024");
//! ```
//!
//! ## Publishing
//!
//! ```no_run
//! use csv_sheet_sync::config::PublishConfig;
//! use csv_sheet_sync::pipeline::{process_upload, UploadOptions, UploadRequest};
//! use csv_sheet_sync::sheets::GoogleSheetsClient;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PublishConfig::from_env()?;
//! let api = GoogleSheetsClient::connect(&config.credentials)?;
//!
//! let request = UploadRequest::new(std::fs::read("reports.zip")?);
//! let response = process_upload(&request, &api, &config.target(), &UploadOptions::default());
//! println!("{} {}", response.http_status(), serde_json::to_string(&response)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: archive collection, CSV parsing and header detection
//! - [`processing`]: extraction strategies, date resolution, merge and sort
//! - [`sheets`]: the spreadsheet API seam, the Google client and the sync writer
//! - [`pipeline`]: the upload entrypoint and its options/response types
//! - [`config`]: publish target and credentials from the environment
//! - [`observability`]: progress events, observers and alert severities
//! - [`types`]: rows, datasets, targets and the column mapping
//! - [`error`]: error types used across every stage

pub mod config;
pub mod error;
pub mod ingestion;
pub mod observability;
pub mod pipeline;
pub mod processing;
pub mod sheets;
pub mod types;

pub use error::{StatusClass, SyncError, SyncResult};
