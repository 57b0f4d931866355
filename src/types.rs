//! Core data model types shared by the parser, merge engine and sheet writer.
//!
//! Sources enter as [`SourceFile`]s, are parsed into [`RawRow`]s, reduced to [`OutputRow`]s by an
//! extraction strategy, and leave as one [`MergedDataset`] that is published to a
//! [`SheetTarget`].

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Resolved calendar instant used for ordering rows.
pub type Timestamp = NaiveDateTime;

/// A single tabular file taken out of an uploaded archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Entry name inside the archive.
    pub name: String,
    /// Raw (decompressed) file content.
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Create a source file.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// One physical CSV record, position-significant.
///
/// Rows may be ragged; [`RawRow::cell`] returns `""` for any index past the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow(pub Vec<String>);

impl RawRow {
    /// Create a row from anything that yields cell strings.
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(cells.into_iter().map(Into::into).collect())
    }

    /// Cell at `idx`, or `""` if the row is shorter.
    pub fn cell(&self, idx: usize) -> &str {
        self.0.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Number of physical cells in this row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this row has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate cells in order.
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// A row that survived extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    /// Output cells, aligned with [`MergedDataset::header`].
    pub cells: Vec<String>,
    /// Resolved date used for sorting; never published.
    pub timestamp: Option<Timestamp>,
}

impl OutputRow {
    /// Create an output row.
    pub fn new(cells: Vec<String>, timestamp: Option<Timestamp>) -> Self {
        Self { cells, timestamp }
    }
}

/// Header plus merged, sorted rows.
///
/// Every row has exactly `header.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDataset {
    /// Output column names.
    pub header: Vec<String>,
    /// Rows in publish order.
    pub rows: Vec<OutputRow>,
}

impl MergedDataset {
    /// Create a dataset from header and rows.
    pub fn new(header: Vec<String>, rows: Vec<OutputRow>) -> Self {
        Self { header, rows }
    }

    /// Number of data rows (header excluded).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Header followed by every row's cells, padded with `""` to the header width.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let width = self.header.len();
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.header.clone());
        for row in &self.rows {
            let mut cells: Vec<String> = row.cells.iter().take(width).cloned().collect();
            cells.resize(width, String::new());
            values.push(cells);
        }
        values
    }
}

/// Destination spreadsheet and tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    /// Spreadsheet identifier (the id segment of the sheet URL).
    pub spreadsheet_id: String,
    /// Name of the tab that receives the dataset.
    pub tab_name: String,
}

impl SheetTarget {
    /// Create a target.
    pub fn new(spreadsheet_id: impl Into<String>, tab_name: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            tab_name: tab_name.into(),
        }
    }

    /// A1-notation range covering every cell of the tab.
    pub fn whole_tab_range(&self) -> String {
        quote_tab(&self.tab_name)
    }

    /// A1-notation range starting at `cell` (e.g. `A1`).
    pub fn range_from(&self, cell: &str) -> String {
        format!("{}!{cell}", quote_tab(&self.tab_name))
    }
}

fn quote_tab(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Semantic output column used by the named-mapping strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogicalField {
    Station,
    Cluster,
    Type,
    Region,
    Remark,
    Date,
}

impl LogicalField {
    /// All fields in output order.
    pub const ALL: [LogicalField; 6] = [
        Self::Station,
        Self::Cluster,
        Self::Type,
        Self::Region,
        Self::Remark,
        Self::Date,
    ];

    /// Column name used in the synthesized header.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Station => "Station",
            Self::Cluster => "Cluster",
            Self::Type => "Type",
            Self::Region => "Region",
            Self::Remark => "Remark",
            Self::Date => "Date",
        }
    }

    /// Key of this field in the caller's JSON mapping.
    pub fn key(self) -> &'static str {
        match self {
            Self::Station => "stationName",
            Self::Cluster => "cluster",
            Self::Type => "type",
            Self::Region => "region",
            Self::Remark => "remark",
            Self::Date => "dateColumn",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Caller-selected source header for each logical field.
///
/// Deserializes from the camelCase JSON the upload form sends, e.g.
/// `{"stationName": "Station", "dateColumn": "Date"}`. Blank names count as unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnMapping {
    pub station_name: Option<String>,
    pub cluster: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub region: Option<String>,
    pub remark: Option<String>,
    pub date_column: Option<String>,
}

impl ColumnMapping {
    /// Parse a mapping from its JSON form.
    pub fn from_json(json: &str) -> SyncResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| SyncError::missing_input(format!("invalid column mapping format: {e}")))
    }

    /// Source header selected for `field`, ignoring blank selections.
    pub fn source_for(&self, field: LogicalField) -> Option<&str> {
        let raw = match field {
            LogicalField::Station => &self.station_name,
            LogicalField::Cluster => &self.cluster,
            LogicalField::Type => &self.type_name,
            LogicalField::Region => &self.region,
            LogicalField::Remark => &self.remark,
            LogicalField::Date => &self.date_column,
        };
        raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Set the source header for `field`.
    pub fn with(mut self, field: LogicalField, header: impl Into<String>) -> Self {
        let slot = match field {
            LogicalField::Station => &mut self.station_name,
            LogicalField::Cluster => &mut self.cluster,
            LogicalField::Type => &mut self.type_name,
            LogicalField::Region => &mut self.region,
            LogicalField::Remark => &mut self.remark,
            LogicalField::Date => &mut self.date_column,
        };
        *slot = Some(header.into());
        self
    }

    /// Fail with [`SyncError::InvalidMapping`] if any of `required` is unmapped.
    pub fn validate(&self, required: &[LogicalField]) -> SyncResult<()> {
        let missing: Vec<LogicalField> = required
            .iter()
            .copied()
            .filter(|f| self.source_for(*f).is_none())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SyncError::InvalidMapping { missing })
        }
    }
}
