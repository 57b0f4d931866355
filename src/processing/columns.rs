//! Column-letter arithmetic and the positional column layout.
//!
//! Spreadsheet-style letters (`A`, `Z`, `AA`, ...) address columns in the fixed upstream report.
//! [`ColumnSpec`] names which columns are dropped, which must contain a given substring, and which
//! holds the row date.

use crate::error::{SyncError, SyncResult};
use crate::types::RawRow;

/// Zero-based index of a column letter sequence (`"A"` → 0, `"AA"` → 26). Case-insensitive.
///
/// Returns `None` for an empty string, non-letters, or overflow.
pub const fn letter_to_index(letters: &str) -> Option<usize> {
    let bytes = letters.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i].to_ascii_uppercase();
        if !b.is_ascii_uppercase() {
            return None;
        }
        n = match n.checked_mul(26) {
            Some(v) => v + (b - b'A' + 1) as usize,
            None => return None,
        };
        i += 1;
    }
    Some(n - 1)
}

/// Column letters for a zero-based index (`0` → `"A"`, `26` → `"AA"`).
pub fn index_to_letters(idx: usize) -> String {
    let mut n = idx + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

const fn col(letters: &str) -> usize {
    match letter_to_index(letters) {
        Some(idx) => idx,
        None => panic!("invalid column letters"),
    }
}

/// Inclusive range of column indices excluded from output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropRange {
    pub first: usize,
    pub last: usize,
}

impl DropRange {
    /// Create a range; bounds are swapped if given in reverse.
    pub const fn new(first: usize, last: usize) -> Self {
        if first <= last {
            Self { first, last }
        } else {
            Self {
                first: last,
                last: first,
            }
        }
    }

    const fn letters(first: &str, last: &str) -> Self {
        Self::new(col(first), col(last))
    }

    pub fn contains(&self, idx: usize) -> bool {
        idx >= self.first && idx <= self.last
    }
}

/// A row is kept only if the cell at `column` contains `required` (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub column: usize,
    pub required: String,
}

impl FilterRule {
    pub fn new(column: usize, required: impl Into<String>) -> Self {
        Self {
            column,
            required: required.into(),
        }
    }

    /// Checks the original (pre-drop) row.
    pub fn matches(&self, row: &RawRow) -> bool {
        row.cell(self.column).contains(self.required.as_str())
    }
}

/// Columns `C..=I`, `K..=M`, `O..=U`, `Y..=AA` and `AE..=AH` of the station report.
pub const REPORT_DROP_RANGES: [DropRange; 5] = [
    DropRange::letters("C", "I"),
    DropRange::letters("K", "M"),
    DropRange::letters("O", "U"),
    DropRange::letters("Y", "AA"),
    DropRange::letters("AE", "AH"),
];

/// `(column, required substring)` rules of the station report.
pub const REPORT_FILTERS: [(usize, &str); 2] = [(col("K"), "Station"), (col("M"), "SOC 5")];

/// Date column of the station report.
pub const REPORT_DATE_COLUMN: usize = col("X");

/// Positional layout: dropped columns, substring filters and the date column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub drop_ranges: Vec<DropRange>,
    pub filters: Vec<FilterRule>,
    pub date_column: usize,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self::report_layout()
    }
}

impl ColumnSpec {
    /// The fixed station report layout.
    pub fn report_layout() -> Self {
        Self {
            drop_ranges: REPORT_DROP_RANGES.to_vec(),
            filters: REPORT_FILTERS
                .iter()
                .map(|(column, text)| FilterRule::new(*column, *text))
                .collect(),
            date_column: REPORT_DATE_COLUMN,
        }
    }

    /// Build a layout from column letters, e.g. `from_letters(&[("C", "I")], &[("K", "Station")], "X")`.
    pub fn from_letters(
        drop_ranges: &[(&str, &str)],
        filters: &[(&str, &str)],
        date_column: &str,
    ) -> SyncResult<Self> {
        let resolve = |letters: &str| {
            letter_to_index(letters)
                .ok_or_else(|| SyncError::config(format!("invalid column letters '{letters}'")))
        };

        let mut ranges = Vec::with_capacity(drop_ranges.len());
        for (first, last) in drop_ranges {
            ranges.push(DropRange::new(resolve(first)?, resolve(last)?));
        }
        let mut rules = Vec::with_capacity(filters.len());
        for (column, text) in filters {
            rules.push(FilterRule::new(resolve(column)?, *text));
        }

        Ok(Self {
            drop_ranges: ranges,
            filters: rules,
            date_column: resolve(date_column)?,
        })
    }

    pub fn is_dropped(&self, idx: usize) -> bool {
        self.drop_ranges.iter().any(|r| r.contains(idx))
    }

    /// Indices below `width` that survive the drop-ranges, in order.
    pub fn kept_indices(&self, width: usize) -> Vec<usize> {
        (0..width).filter(|i| !self.is_dropped(*i)).collect()
    }

    /// First filter the row fails, if any.
    pub fn failed_filter(&self, row: &RawRow) -> Option<&FilterRule> {
        self.filters.iter().find(|f| !f.matches(row))
    }
}
