//! Source collection and row parsing.
//!
//! - [`archive`]: pull tabular entries out of an in-memory ZIP, enforcing the size ceiling
//! - [`csv`]: decode bytes and split them into ragged [`crate::types::RawRow`]s
//! - [`header`]: the swappable "is this row a header" predicate

pub mod archive;
pub mod csv;
pub mod header;

pub use archive::{collect_sources, CollectOptions, DEFAULT_ENTRY_PATTERN, DEFAULT_MAX_FILE_BYTES};
pub use csv::parse_rows;
pub use header::{looks_numeric, AlwaysHeader, HeaderDetector, NonNumericHeader};
