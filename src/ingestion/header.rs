//! Header-row detection.
//!
//! There is no real schema detection: a file's first row is judged to be a header by a runtime
//! predicate. Rows made only of numbers are classified as data, so a header whose every column
//! name is numeric is misread. That limitation is accepted; swap in another [`HeaderDetector`] to
//! change it without touching the merge engine.

use crate::types::RawRow;

/// Decides whether a file's first row is a header.
pub trait HeaderDetector: Send + Sync {
    fn is_header(&self, row: &RawRow) -> bool;
}

/// A row is a header if at least one cell fails to parse as a plain number.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonNumericHeader;

impl HeaderDetector for NonNumericHeader {
    fn is_header(&self, row: &RawRow) -> bool {
        row.cells().any(|cell| !looks_numeric(cell))
    }
}

/// Treat every first row as a header.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysHeader;

impl HeaderDetector for AlwaysHeader {
    fn is_header(&self, _row: &RawRow) -> bool {
        true
    }
}
/// Whether a cell coerces to a number under JavaScript `Number()` rules.
/// Whether a cell reads as a number the way a spreadsheet export's numeric coercion does.
///
/// Blank counts as numeric (it reads as zero). Unsigned `0x`/`0o`/`0b` literals are numeric, and
/// `Infinity` is only recognized with that exact spelling. `NaN`, `inf` and `infinity` are not.
pub fn looks_numeric(cell: &str) -> bool {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return true;
    }
    if let Some(radix) = radix_literal(trimmed) {
        return radix;
    }
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return true;
    }
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return false;
    }
    trimmed.parse::<f64>().is_ok()
}

fn radix_literal(s: &str) -> Option<bool> {
    let (prefix, digits) = s.split_at_checked(2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some(!digits.is_empty() && digits.chars().all(|c| c.is_digit(radix)))
}
