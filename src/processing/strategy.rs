//! Extraction strategies: how a raw row becomes an output row.
//!
//! Both variants share one interface. A strategy produces the dataset header and, for a given
//! header row, a [`RowPlan`] that is applied to every data row of a file.
//!
//! - [`ExtractionStrategy::Positional`]: fixed report layout addressed by column index. The
//!   header comes from the first file only; dropped columns vanish from header and data alike.
//! - [`ExtractionStrategy::NamedMapping`]: fixed logical-field schema; each file's own header row
//!   is searched for the caller-selected source headers.

use crate::types::{ColumnMapping, LogicalField, OutputRow, RawRow};

use super::columns::{ColumnSpec, FilterRule};
use super::dates::DateResolver;

/// Caller-level strategy selector; the upload pipeline turns it into an [`ExtractionStrategy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Fixed column layout, no mapping required.
    #[default]
    Positional,
    /// Caller-supplied [`ColumnMapping`] required.
    NamedMapping,
}

/// One of the two interchangeable extraction policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStrategy {
    Positional(ColumnSpec),
    NamedMapping(ColumnMapping),
}

/// Why a data row was excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The cell at `column` did not contain `required`.
    FilterMismatch { column: usize, required: String },
    /// A date is required and the date cell did not resolve.
    UnresolvedDate,
}

/// Outcome of extracting one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Accepted(OutputRow),
    Rejected(Rejection),
}

/// Per-file extraction plan derived from a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPlan {
    /// Source index for each output column; `None` yields an empty cell.
    columns: Vec<Option<usize>>,
    filters: Vec<FilterRule>,
    date_column: Option<usize>,
    date_required: bool,
    normalize_cells: bool,
}

impl ExtractionStrategy {
    /// Whether every file's header row rebinds the plan (`true`) or only the first file's does.
    pub fn rebinds_per_file(&self) -> bool {
        matches!(self, Self::NamedMapping(_))
    }

    /// Whether the first file must supply a header row.
    pub fn requires_leading_header(&self) -> bool {
        matches!(self, Self::Positional(_))
    }

    /// Output header.
    ///
    /// Positional: `header_row` minus dropped columns. Named mapping: the logical-field names,
    /// independent of `header_row`.
    pub fn header(&self, header_row: &RawRow) -> Vec<String> {
        match self {
            Self::Positional(spec) => spec
                .kept_indices(header_row.len())
                .into_iter()
                .map(|i| header_row.cell(i).to_string())
                .collect(),
            Self::NamedMapping(_) => LogicalField::ALL
                .iter()
                .map(|f| f.display_name().to_string())
                .collect(),
        }
    }

    /// Build the plan used for data rows governed by `header_row`.
    pub fn plan(&self, header_row: &RawRow) -> RowPlan {
        match self {
            Self::Positional(spec) => RowPlan {
                columns: spec
                    .kept_indices(header_row.len())
                    .into_iter()
                    .map(Some)
                    .collect(),
                filters: spec.filters.clone(),
                date_column: Some(spec.date_column),
                date_required: true,
                normalize_cells: false,
            },
            Self::NamedMapping(mapping) => {
                let locate = |field: LogicalField| {
                    mapping
                        .source_for(field)
                        .and_then(|name| find_header(header_row, name))
                };
                RowPlan {
                    columns: LogicalField::ALL.iter().map(|f| locate(*f)).collect(),
                    filters: Vec::new(),
                    date_column: locate(LogicalField::Date),
                    date_required: mapping.source_for(LogicalField::Date).is_some(),
                    normalize_cells: true,
                }
            }
        }
    }
}

impl RowPlan {
    /// Number of output cells this plan produces.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Extract one data row.
    ///
    /// Filters are checked against the original row, before any column is dropped.
    pub fn extract(&self, row: &RawRow, dates: &DateResolver) -> Extraction {
        if let Some(rule) = self.filters.iter().find(|f| !f.matches(row)) {
            return Extraction::Rejected(Rejection::FilterMismatch {
                column: rule.column,
                required: rule.required.clone(),
            });
        }

        let timestamp = self.date_column.and_then(|idx| dates.resolve(row.cell(idx)));
        if self.date_required && timestamp.is_none() {
            return Extraction::Rejected(Rejection::UnresolvedDate);
        }

        let cells = self
            .columns
            .iter()
            .map(|src| {
                let raw = src.map(|i| row.cell(i)).unwrap_or("");
                if self.normalize_cells {
                    collapse_whitespace(raw)
                } else {
                    raw.to_string()
                }
            })
            .collect();

        Extraction::Accepted(OutputRow::new(cells, timestamp))
    }
}

fn find_header(header_row: &RawRow, name: &str) -> Option<usize> {
    let wanted = collapse_whitespace(name);
    header_row
        .cells()
        .position(|h| collapse_whitespace(h) == wanted)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
