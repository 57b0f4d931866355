//! Row extraction, date resolution and merging.
//!
//! The processing layer turns parsed [`crate::types::RawRow`]s into one
//! [`crate::types::MergedDataset`]. It is purely in-memory and performs no I/O.
//!
//! - [`columns`]: column-letter arithmetic and the positional layout
//! - [`dates`]: the date fallback chain
//! - [`strategy`]: positional and named-mapping extraction behind one enum
//! - [`merge`]: concatenation across files and the stable date sort
//!
//! ## Example: named mapping across two files
//!
//! ```rust
//! use csv_sheet_sync::processing::{merge_sources, ExtractionStrategy, ParsedSource};
//! use csv_sheet_sync::types::{ColumnMapping, LogicalField, RawRow};
//!
//! let mapping = ColumnMapping::default()
//!     .with(LogicalField::Station, "Station")
//!     .with(LogicalField::Date, "Date");
//! let strategy = ExtractionStrategy::NamedMapping(mapping);
//!
//! let files = vec![
//!     ParsedSource::new("a.csv", vec![RawRow::new(["Date", "Station"]), RawRow::new(["1/2/2024 9:00", "A"])]),
//!     ParsedSource::new("b.csv", vec![RawRow::new(["Date", "Station"]), RawRow::new(["1/2/2024 8:00", "B"])]),
//! ];
//!
//! let ds = merge_sources(&files, &strategy).unwrap();
//! let stations: Vec<&str> = ds.rows.iter().map(|r| r.cells[0].as_str()).collect();
//! assert_eq!(stations, vec!["B", "A"]);
//! ```

pub mod columns;
pub mod dates;
pub mod merge;
pub mod strategy;

pub use columns::{letter_to_index, ColumnSpec, DropRange, FilterRule};
pub use dates::{resolve_date, DatePattern, DateResolver};
pub use merge::{merge_sources, sort_by_timestamp, Merger, ParsedSource};
pub use strategy::{Extraction, ExtractionMode, ExtractionStrategy, Rejection, RowPlan};
