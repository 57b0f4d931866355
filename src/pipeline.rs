//! Upload entrypoint.
//!
//! Most callers should use [`process_upload`], which runs one uploaded archive through the whole
//! chain (collect, parse, extract, merge and sort, publish) and turns the outcome into an
//! [`UploadResponse`].
//!
//! - If [`UploadOptions::mode`] is [`ExtractionMode::NamedMapping`], the request must carry a
//!   [`ColumnMapping`] covering [`UploadOptions::required_fields`].
//! - If an observer is provided, progress events, success/failure and alerts are reported to it.

use std::fmt;
use std::sync::Arc;

use encoding_rs::{Encoding, UTF_8};
use glob::Pattern;
use serde::Serialize;

use crate::error::{StatusClass, SyncError, SyncResult};
use crate::ingestion::archive::{collect_sources, default_entry_pattern, CollectOptions, DEFAULT_MAX_FILE_BYTES};
use crate::ingestion::csv::parse_rows;
use crate::ingestion::header::{HeaderDetector, NonNumericHeader};
use crate::observability::{emit, severity_for_error, SyncEvent, SyncObserver, SyncSeverity, UploadStats};
use crate::processing::columns::ColumnSpec;
use crate::processing::dates::DateResolver;
use crate::processing::merge::{Merger, ParsedSource};
use crate::processing::strategy::{ExtractionMode, ExtractionStrategy};
use crate::sheets::{PublishReport, SheetSyncWriter, SheetsApi};
use crate::types::{ColumnMapping, LogicalField, MergedDataset, SheetTarget, SourceFile};

/// Options controlling one upload.
///
/// Use [`Default`] for the fixed report layout.
#[derive(Clone)]
pub struct UploadOptions {
    pub mode: ExtractionMode,
    /// Layout used in positional mode.
    pub column_spec: ColumnSpec,
    /// Logical fields a named mapping must select a source header for.
    pub required_fields: Vec<LogicalField>,
    /// Per-file decompressed size ceiling.
    pub max_file_bytes: u64,
    /// Encoding assumed for sources without a byte-order mark.
    pub encoding: &'static Encoding,
    /// Archive entries to treat as tabular sources.
    pub entry_pattern: Pattern,
    pub dates: DateResolver,
    pub header_detector: Arc<dyn HeaderDetector>,
    /// Optional observer for progress, outcomes and alerts.
    pub observer: Option<Arc<dyn SyncObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: SyncSeverity,
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("mode", &self.mode)
            .field("column_spec", &self.column_spec)
            .field("required_fields", &self.required_fields)
            .field("max_file_bytes", &self.max_file_bytes)
            .field("encoding", &self.encoding.name())
            .field("entry_pattern", &self.entry_pattern.as_str())
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish_non_exhaustive()
    }
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::default(),
            column_spec: ColumnSpec::default(),
            required_fields: vec![LogicalField::Station],
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            encoding: UTF_8,
            entry_pattern: default_entry_pattern(),
            dates: DateResolver::default(),
            header_detector: Arc::new(NonNumericHeader),
            observer: None,
            alert_at_or_above: SyncSeverity::Critical,
        }
    }
}

impl UploadOptions {
    fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            entry_pattern: self.entry_pattern.clone(),
            max_file_bytes: self.max_file_bytes,
        }
    }

    fn observer(&self) -> Option<&dyn SyncObserver> {
        self.observer.as_deref()
    }
}

/// One upload as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    /// ZIP archive bytes; `None` when no file was attached.
    pub archive: Option<Vec<u8>>,
    /// Required in named-mapping mode, ignored otherwise.
    pub column_mapping: Option<ColumnMapping>,
}

impl UploadRequest {
    pub fn new(archive: impl Into<Vec<u8>>) -> Self {
        Self {
            archive: Some(archive.into()),
            column_mapping: None,
        }
    }

    pub fn with_mapping(mut self, mapping: ColumnMapping) -> Self {
        self.column_mapping = Some(mapping);
        self
    }
}

/// Caller-facing outcome, serialized as `{"ok":true,"rowsWritten":N}` or
/// `{"ok":false,"message":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_written: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Status classification; `None` on success.
    #[serde(skip)]
    pub status: Option<StatusClass>,
}

impl UploadResponse {
    pub fn success(rows_written: usize) -> Self {
        Self {
            ok: true,
            rows_written: Some(rows_written),
            message: None,
            status: None,
        }
    }

    pub fn failure(error: &SyncError) -> Self {
        Self {
            ok: false,
            rows_written: None,
            message: Some(error.to_string()),
            status: Some(error.status_class()),
        }
    }

    /// HTTP status for this response.
    pub fn http_status(&self) -> u16 {
        self.status.map_or(200, StatusClass::http_status)
    }
}

/// Turn the configured mode and the request's mapping into a strategy.
///
/// # Errors
///
/// - [`SyncError::MissingInput`] in named-mapping mode when no mapping was supplied.
/// - [`SyncError::InvalidMapping`] when a required field is unmapped.
pub fn resolve_strategy(
    mapping: Option<&ColumnMapping>,
    options: &UploadOptions,
) -> SyncResult<ExtractionStrategy> {
    match options.mode {
        ExtractionMode::Positional => Ok(ExtractionStrategy::Positional(options.column_spec.clone())),
        ExtractionMode::NamedMapping => {
            let mapping = mapping.ok_or_else(|| SyncError::missing_input("No column mapping provided"))?;
            mapping.validate(&options.required_fields)?;
            Ok(ExtractionStrategy::NamedMapping(mapping.clone()))
        }
    }
}

/// Parse every source and merge them under `strategy`.
///
/// Any source that fails to decode fails the whole call.
pub fn build_dataset(
    sources: &[SourceFile],
    strategy: &ExtractionStrategy,
    options: &UploadOptions,
) -> SyncResult<MergedDataset> {
    let mut parsed = Vec::with_capacity(sources.len());
    for source in sources {
        let rows = parse_rows(source, options.encoding)?;
        emit(
            options.observer(),
            SyncEvent::SourceParsed {
                name: source.name.clone(),
                rows: rows.len(),
            },
        );
        parsed.push(ParsedSource::new(source.name.clone(), rows));
    }

    let mut merger = Merger::new(strategy)
        .with_detector(options.header_detector.as_ref())
        .with_dates(options.dates.clone());
    if let Some(obs) = options.observer() {
        merger = merger.with_observer(obs);
    }
    merger.merge(&parsed)
}

/// Run one upload end to end and publish the result to `target`.
///
/// Input is validated before anything is published: a missing archive or mapping, an archive
/// without tabular entries, or an oversized entry never reaches `api`.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with file and row counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use csv_sheet_sync::config::PublishConfig;
/// use csv_sheet_sync::observability::StdErrObserver;
/// use csv_sheet_sync::pipeline::{run_upload, UploadOptions, UploadRequest};
/// use csv_sheet_sync::sheets::GoogleSheetsClient;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PublishConfig::from_env()?;
/// let api = GoogleSheetsClient::connect(&config.credentials)?;
///
/// let options = UploadOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     ..Default::default()
/// };
/// let request = UploadRequest::new(std::fs::read("reports.zip")?);
/// let report = run_upload(&request, &api, &config.target(), &options)?;
/// println!("rows={}", report.rows_written);
/// # Ok(())
/// # }
/// ```
pub fn run_upload<A: SheetsApi>(
    request: &UploadRequest,
    api: &A,
    target: &SheetTarget,
    options: &UploadOptions,
) -> SyncResult<PublishReport> {
    let result = upload(request, api, target, options);

    if let Some(obs) = options.observer() {
        match &result {
            Ok((files, report)) => obs.on_success(UploadStats {
                files: *files,
                rows_written: report.rows_written,
            }),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(sev, e);
                }
            }
        }
    }

    result.map(|(_, report)| report)
}

/// [`run_upload`], with the outcome folded into an [`UploadResponse`].
pub fn process_upload<A: SheetsApi>(
    request: &UploadRequest,
    api: &A,
    target: &SheetTarget,
    options: &UploadOptions,
) -> UploadResponse {
    match run_upload(request, api, target, options) {
        Ok(report) => UploadResponse::success(report.rows_written),
        Err(e) => UploadResponse::failure(&e),
    }
}

fn upload<A: SheetsApi>(
    request: &UploadRequest,
    api: &A,
    target: &SheetTarget,
    options: &UploadOptions,
) -> SyncResult<(usize, PublishReport)> {
    let archive = request
        .archive
        .as_deref()
        .ok_or_else(|| SyncError::missing_input("No ZIP file uploaded"))?;
    let strategy = resolve_strategy(request.column_mapping.as_ref(), options)?;

    let sources = collect_sources(archive, &options.collect_options(), options.observer())?;
    let dataset = build_dataset(&sources, &strategy, options)?;

    let mut writer = SheetSyncWriter::new(api);
    if let Some(obs) = options.observer.as_ref() {
        writer = writer.with_observer(Arc::clone(obs));
    }
    let report = writer.publish(&dataset, target)?;
    Ok((sources.len(), report))
}
