//! Merge & sort: from parsed files to one [`MergedDataset`].

use std::cmp::Ordering;

use crate::error::{SyncError, SyncResult};
use crate::ingestion::header::{HeaderDetector, NonNumericHeader};
use crate::observability::{emit, SyncEvent, SyncObserver};
use crate::types::{MergedDataset, OutputRow, RawRow};

use super::dates::DateResolver;
use super::strategy::{Extraction, ExtractionStrategy, RowPlan};

/// Rows of one source file, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSource {
    pub name: String,
    pub rows: Vec<RawRow>,
}

impl ParsedSource {
    pub fn new(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Merges parsed sources under one extraction strategy.
///
/// Pure: no I/O, only optional progress events.
pub struct Merger<'a> {
    strategy: &'a ExtractionStrategy,
    detector: &'a dyn HeaderDetector,
    dates: DateResolver,
    observer: Option<&'a dyn SyncObserver>,
}

impl<'a> Merger<'a> {
    /// Merger with the default header heuristic and date chain.
    pub fn new(strategy: &'a ExtractionStrategy) -> Self {
        Self {
            strategy,
            detector: &NonNumericHeader,
            dates: DateResolver::default(),
            observer: None,
        }
    }

    pub fn with_detector(mut self, detector: &'a dyn HeaderDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_dates(mut self, dates: DateResolver) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn SyncObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Concatenate accepted rows in file order, then stably sort by timestamp.
    ///
    /// The first row of the first non-empty file is always a header. Later files have their
    /// first row classified by the header detector; a header there only rebinds the plan when the
    /// strategy looks headers up per file. Otherwise it is just skipped.
    ///
    /// # Errors
    ///
    /// [`SyncError::NoHeaderResolved`] if the strategy needs a leading header and the first file
    /// has no rows.
    pub fn merge(&self, sources: &[ParsedSource]) -> SyncResult<MergedDataset> {
        if self.strategy.requires_leading_header()
            && sources.first().is_none_or(|s| s.rows.is_empty())
        {
            return Err(SyncError::NoHeaderResolved);
        }

        let mut header: Option<Vec<String>> = None;
        let mut plan: Option<RowPlan> = None;
        let mut rows: Vec<OutputRow> = Vec::new();

        for source in sources {
            let Some(first) = source.rows.first() else {
                self.report_file(&source.name, 0, 0);
                continue;
            };

            let has_header = plan.is_none() || self.detector.is_header(first);
            let active = match plan.take() {
                None => {
                    header = Some(self.strategy.header(first));
                    self.strategy.plan(first)
                }
                Some(_) if has_header && self.strategy.rebinds_per_file() => {
                    self.strategy.plan(first)
                }
                Some(existing) => existing,
            };

            let body = if has_header {
                &source.rows[1..]
            } else {
                &source.rows[..]
            };

            let before = rows.len();
            for raw in body {
                if let Extraction::Accepted(row) = active.extract(raw, &self.dates) {
                    rows.push(row);
                }
            }
            let accepted = rows.len() - before;
            self.report_file(&source.name, accepted, body.len() - accepted);

            plan = Some(active);
        }

        sort_by_timestamp(&mut rows);
        emit(self.observer, SyncEvent::RowsSorted { rows: rows.len() });

        let header = header.unwrap_or_else(|| self.strategy.header(&RawRow::default()));
        Ok(MergedDataset::new(header, rows))
    }

    fn report_file(&self, name: &str, accepted: usize, rejected: usize) {
        emit(
            self.observer,
            SyncEvent::FileMerged {
                name: name.to_string(),
                accepted,
                rejected,
            },
        );
    }
}

/// Merge with default settings. See [`Merger::merge`].
pub fn merge_sources(
    sources: &[ParsedSource],
    strategy: &ExtractionStrategy,
) -> SyncResult<MergedDataset> {
    Merger::new(strategy).merge(sources)
}

/// Stable ascending sort; rows without a timestamp go last in arrival order.
pub fn sort_by_timestamp(rows: &mut [OutputRow]) {
    rows.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
