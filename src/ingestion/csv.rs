//! CSV row parsing.

use encoding_rs::Encoding;

use crate::error::{SyncError, SyncResult};
use crate::types::{RawRow, SourceFile};

/// Parse a source into raw rows.
///
/// Rules:
///
/// - A leading byte-order mark selects the encoding and is stripped; otherwise `encoding` is used.
/// - Decoding is strict: malformed byte sequences fail with [`SyncError::MalformedSource`].
/// - Rows may be ragged; no header handling is done here.
/// - Empty (or whitespace-only) lines are skipped.
pub fn parse_rows(source: &SourceFile, encoding: &'static Encoding) -> SyncResult<Vec<RawRow>> {
    let text = decode(source, encoding)?;
    parse_text(&source.name, &text)
}

fn decode(source: &SourceFile, declared: &'static Encoding) -> SyncResult<String> {
    let (encoding, body) = match Encoding::for_bom(&source.bytes) {
        Some((bom_encoding, bom_len)) => (bom_encoding, &source.bytes[bom_len..]),
        None => (declared, source.bytes.as_slice()),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or_else(|| SyncError::MalformedSource {
            name: source.name.clone(),
            message: format!("content is not valid {}", encoding.name()),
        })
}

fn parse_text(name: &str, text: &str) -> SyncResult<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| SyncError::MalformedSource {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        if is_blank_line(&record) {
            continue;
        }
        rows.push(RawRow::new(record.iter()));
    }
    Ok(rows)
}

fn is_blank_line(record: &csv::StringRecord) -> bool {
    record.len() <= 1 && record.get(0).is_none_or(|c| c.trim().is_empty())
}
