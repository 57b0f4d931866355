//! In-memory ZIP collection.
//!
//! Reads an uploaded archive held entirely in memory and returns every tabular entry as a
//! [`SourceFile`], in archive order.

use std::io::{Cursor, Read};

use glob::{MatchOptions, Pattern};

use crate::error::{SyncError, SyncResult};
use crate::observability::{emit, SyncEvent, SyncObserver};
use crate::types::SourceFile;

/// Default per-file ceiling: 25 MiB of decompressed content.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 25 * 1024 * 1024;

/// Default entry pattern for tabular files.
pub const DEFAULT_ENTRY_PATTERN: &str = "*.csv";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Options controlling which entries are collected.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Entry names (full path inside the archive) must match this pattern, case-insensitively.
    pub entry_pattern: Pattern,
    /// Largest accepted decompressed entry size, in bytes.
    pub max_file_bytes: u64,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            entry_pattern: default_entry_pattern(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

pub(crate) fn default_entry_pattern() -> Pattern {
    Pattern::new(DEFAULT_ENTRY_PATTERN).unwrap_or_default()
}

/// Collect every matching file entry from a ZIP archive.
///
/// Rules:
///
/// - Directory entries and macOS resource-fork entries (`__MACOSX/`) are skipped.
/// - An entry larger than `options.max_file_bytes` fails the whole collection with
///   [`SyncError::OversizedSource`]; nothing is truncated.
/// - Zero matching entries is [`SyncError::MissingInput`].
pub fn collect_sources(
    archive: &[u8],
    options: &CollectOptions,
    observer: Option<&dyn SyncObserver>,
) -> SyncResult<Vec<SourceFile>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    let mut sources = Vec::new();

    for idx in 0..zip.len() {
        let entry = zip.by_index(idx)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if name.starts_with("__MACOSX/") || !options.entry_pattern.matches_with(&name, MATCH_OPTIONS) {
            continue;
        }

        let limit = options.max_file_bytes;
        if entry.size() > limit {
            return Err(SyncError::OversizedSource {
                name,
                size: entry.size(),
                limit,
            });
        }

        // Declared sizes can lie; never read more than one byte past the ceiling.
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.take(limit + 1).read_to_end(&mut bytes)?;
        if bytes.len() as u64 > limit {
            return Err(SyncError::OversizedSource {
                name,
                size: bytes.len() as u64,
                limit,
            });
        }

        emit(
            observer,
            SyncEvent::SourceCollected {
                name: name.clone(),
                bytes: bytes.len() as u64,
            },
        );
        sources.push(SourceFile { name, bytes });
    }

    if sources.is_empty() {
        return Err(SyncError::missing_input("No CSV files found in ZIP"));
    }
    Ok(sources)
}
