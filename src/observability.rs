//! Progress events and outcome reporting.
//!
//! Stages emit [`SyncEvent`]s as each unit of work completes; the upload pipeline reports the
//! final outcome through [`SyncObserver::on_success`] / [`SyncObserver::on_failure`] and raises
//! [`SyncObserver::on_alert`] when a failure meets the configured severity threshold.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::SyncError;
use crate::sheets::{SheetsApiError, TabCreation};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SyncSeverity {
    /// Informational event.
    Info,
    /// Caller-side problem (bad or missing input).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (I/O, transport or configuration failures).
    Critical,
}

/// Discrete units of work completed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    SourceCollected { name: String, bytes: u64 },
    SourceParsed { name: String, rows: usize },
    FileMerged { name: String, accepted: usize, rejected: usize },
    RowsSorted { rows: usize },
    TabEnsured { tab: String, creation: TabCreation },
    TabCleared { tab: String },
    RowsWritten { tab: String, rows: usize },
}

/// Stats reported on a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadStats {
    /// Number of source files merged.
    pub files: usize,
    /// Number of data rows published (header excluded).
    pub rows_written: usize,
}

/// Observer interface for progress and outcomes.
///
/// Every method has a no-op default so implementors only override what they need.
pub trait SyncObserver: Send + Sync {
    /// Called as each stage completes a unit of work.
    fn on_event(&self, _event: &SyncEvent) {}

    /// Called when an upload succeeds.
    fn on_success(&self, _stats: UploadStats) {}

    /// Called when an upload fails.
    fn on_failure(&self, _severity: SyncSeverity, _error: &SyncError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, severity: SyncSeverity, error: &SyncError) {
        self.on_failure(severity, error)
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn SyncObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn SyncObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl SyncObserver for CompositeObserver {
    fn on_event(&self, event: &SyncEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }

    fn on_success(&self, stats: UploadStats) {
        for o in &self.observers {
            o.on_success(stats);
        }
    }

    fn on_failure(&self, severity: SyncSeverity, error: &SyncError) {
        for o in &self.observers {
            o.on_failure(severity, error);
        }
    }

    fn on_alert(&self, severity: SyncSeverity, error: &SyncError) {
        for o in &self.observers {
            o.on_alert(severity, error);
        }
    }
}

/// Logs events and outcomes to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl SyncObserver for StdErrObserver {
    fn on_event(&self, event: &SyncEvent) {
        eprintln!("[sync][event] {}", describe(event));
    }

    fn on_success(&self, stats: UploadStats) {
        eprintln!(
            "[sync][ok] files={} rows_written={}",
            stats.files, stats.rows_written
        );
    }

    fn on_failure(&self, severity: SyncSeverity, error: &SyncError) {
        eprintln!("[sync][{severity:?}] err={error}");
    }

    fn on_alert(&self, severity: SyncSeverity, error: &SyncError) {
        eprintln!("[ALERT][sync][{severity:?}] err={error}");
    }
}

/// Appends events and outcomes to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl SyncObserver for FileObserver {
    fn on_event(&self, event: &SyncEvent) {
        self.append_line(&format!("{} event {}", unix_ts(), describe(event)));
    }

    fn on_success(&self, stats: UploadStats) {
        self.append_line(&format!(
            "{} ok files={} rows_written={}",
            unix_ts(),
            stats.files,
            stats.rows_written
        ));
    }

    fn on_failure(&self, severity: SyncSeverity, error: &SyncError) {
        self.append_line(&format!(
            "{} fail severity={severity:?} err={error}",
            unix_ts()
        ));
    }

    fn on_alert(&self, severity: SyncSeverity, error: &SyncError) {
        self.append_line(&format!(
            "{} ALERT severity={severity:?} err={error}",
            unix_ts()
        ));
    }
}

/// Severity used when reporting `error` to observers.
pub fn severity_for_error(error: &SyncError) -> SyncSeverity {
    match error {
        SyncError::Io(_) | SyncError::Config { .. } => SyncSeverity::Critical,
        SyncError::Publish(failure) => match failure.source_error() {
            SheetsApiError::Http(_) | SheetsApiError::Auth { .. } => SyncSeverity::Critical,
            _ => SyncSeverity::Error,
        },
        SyncError::MissingInput { .. }
        | SyncError::InvalidMapping { .. }
        | SyncError::OversizedSource { .. } => SyncSeverity::Warning,
        SyncError::Archive(_) | SyncError::MalformedSource { .. } | SyncError::NoHeaderResolved => {
            SyncSeverity::Error
        }
    }
}

pub(crate) fn emit(observer: Option<&dyn SyncObserver>, event: SyncEvent) {
    if let Some(obs) = observer {
        obs.on_event(&event);
    }
}

fn describe(event: &SyncEvent) -> String {
    match event {
        SyncEvent::SourceCollected { name, bytes } => format!("collected name={name} bytes={bytes}"),
        SyncEvent::SourceParsed { name, rows } => format!("parsed name={name} rows={rows}"),
        SyncEvent::FileMerged {
            name,
            accepted,
            rejected,
        } => format!("merged name={name} accepted={accepted} rejected={rejected}"),
        SyncEvent::RowsSorted { rows } => format!("sorted rows={rows}"),
        SyncEvent::TabEnsured { tab, creation } => format!("tab tab={tab} creation={creation:?}"),
        SyncEvent::TabCleared { tab } => format!("cleared tab={tab}"),
        SyncEvent::RowsWritten { tab, rows } => format!("written tab={tab} rows={rows}"),
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
