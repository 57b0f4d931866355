//! Full-overwrite publishing of a [`MergedDataset`] to one tab.
//!
//! Publishing is two-phase and not transactional:
//!
//! 1. [`SheetSyncWriter::clear`] makes sure the tab exists and clears every cell, returning a
//!    [`ClearedTab`];
//! 2. [`ClearedTab::write`] writes header and rows from `A1`.
//!
//! If phase 2 fails after phase 1 succeeded, the tab is left empty. Every [`PublishFailure`] says
//! whether that may have happened; callers should retry the whole publish rather than assume a
//! partial success.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::observability::{emit, SyncEvent, SyncObserver};
use crate::types::{MergedDataset, SheetTarget};

use super::client::{SheetsApi, SheetsApiError, TabCreation};

/// Cell where every publish starts.
pub const START_CELL: &str = "A1";

/// Step of a publish that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishPhase {
    EnsureTab,
    Clear,
    Write,
}

impl fmt::Display for PublishPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EnsureTab => "tab creation",
            Self::Clear => "clear",
            Self::Write => "write",
        })
    }
}

/// A publish step failed.
#[derive(Debug, Error)]
#[error("publish failed during {phase}: {source}")]
pub struct PublishFailure {
    pub phase: PublishPhase,
    /// `true` once the clear step may have run: the destination can now be empty.
    pub destination_may_be_empty: bool,
    pub source: SheetsApiError,
}

impl PublishFailure {
    fn at(phase: PublishPhase, source: SheetsApiError) -> Self {
        Self {
            phase,
            destination_may_be_empty: phase != PublishPhase::EnsureTab,
            source,
        }
    }

    /// The underlying service error.
    pub fn source_error(&self) -> &SheetsApiError {
        &self.source
    }
}

/// Result of a successful publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    /// Data rows written, header excluded.
    pub rows_written: usize,
}

/// Publishes datasets through a [`SheetsApi`].
pub struct SheetSyncWriter<A> {
    api: A,
    observer: Option<Arc<dyn SyncObserver>>,
}

impl<A> fmt::Debug for SheetSyncWriter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetSyncWriter")
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl<A: SheetsApi> SheetSyncWriter<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            observer: None,
        }
    }

    /// Attach an observer for progress events.
    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Create the tab if needed. Only "already exists" is tolerated.
    pub fn ensure_tab(&self, target: &SheetTarget) -> Result<TabCreation, PublishFailure> {
        let creation = self
            .api
            .add_tab(target)
            .map_err(|e| PublishFailure::at(PublishPhase::EnsureTab, e))?;
        emit(
            self.observer.as_deref(),
            SyncEvent::TabEnsured {
                tab: target.tab_name.clone(),
                creation,
            },
        );
        Ok(creation)
    }

    /// Phase 1: ensure the tab and clear its whole range.
    pub fn clear<'w>(&'w self, target: &'w SheetTarget) -> Result<ClearedTab<'w, A>, PublishFailure> {
        self.ensure_tab(target)?;
        self.api
            .clear_tab(target)
            .map_err(|e| PublishFailure::at(PublishPhase::Clear, e))?;
        emit(
            self.observer.as_deref(),
            SyncEvent::TabCleared {
                tab: target.tab_name.clone(),
            },
        );
        Ok(ClearedTab {
            writer: self,
            target,
        })
    }

    /// Clear then write. Every call is a full overwrite.
    pub fn publish(
        &self,
        dataset: &MergedDataset,
        target: &SheetTarget,
    ) -> Result<PublishReport, PublishFailure> {
        self.clear(target)?.write(dataset)
    }
}

/// A tab that has been cleared and awaits its content.
#[must_use = "a cleared tab stays empty until written"]
pub struct ClearedTab<'w, A> {
    writer: &'w SheetSyncWriter<A>,
    target: &'w SheetTarget,
}

impl<A: SheetsApi> ClearedTab<'_, A> {
    /// Phase 2: write header and rows from `A1`, padding rows to the header width.
    pub fn write(self, dataset: &MergedDataset) -> Result<PublishReport, PublishFailure> {
        let values = dataset.to_values();
        self.writer
            .api
            .update_values(self.target, START_CELL, &values)
            .map_err(|e| PublishFailure::at(PublishPhase::Write, e))?;

        let rows_written = dataset.row_count();
        emit(
            self.writer.observer.as_deref(),
            SyncEvent::RowsWritten {
                tab: self.target.tab_name.clone(),
                rows: rows_written,
            },
        );
        Ok(PublishReport { rows_written })
    }
}
