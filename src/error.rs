use thiserror::Error;

use crate::sheets::PublishFailure;
use crate::types::LogicalField;

/// Convenience result type for merge and publish operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Error type returned by the collector, parser, merge engine and upload pipeline.
///
/// This is a single error enum shared across every stage so callers can map any failure to an
/// [`StatusClass`] in one place.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Underlying I/O error (e.g. reading an archive entry).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The uploaded archive could not be opened or read.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// No archive, no tabular entries, or no column mapping where one is required.
    #[error("missing input: {message}")]
    MissingInput { message: String },

    /// A single decompressed source exceeds the configured ceiling.
    #[error("{name} exceeds {limit} byte limit ({size} bytes)")]
    OversizedSource { name: String, size: u64, limit: u64 },

    /// A source could not be decoded or parsed as CSV text.
    #[error("malformed source '{name}': {message}")]
    MalformedSource { name: String, message: String },

    /// Positional strategy: the first file produced no rows to take a header from.
    #[error("no header found in CSV files")]
    NoHeaderResolved,

    /// Named-mapping strategy: required logical fields have no source header selected.
    #[error("invalid column mapping: no source header selected for {}", field_list(.missing))]
    InvalidMapping { missing: Vec<LogicalField> },

    /// The destination tab could not be prepared, cleared or written.
    #[error(transparent)]
    Publish(#[from] PublishFailure),

    /// Publish configuration is missing or unusable.
    #[error("configuration error: {message}")]
    Config { message: String },
}

/// Response status classification for a failed upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Missing or invalid caller input (HTTP 400).
    ClientError,
    /// A source exceeded the size ceiling (HTTP 413).
    PayloadTooLarge,
    /// Anything else (HTTP 500).
    ServerError,
}

impl StatusClass {
    /// HTTP status code conventionally used for this class.
    pub fn http_status(self) -> u16 {
        match self {
            Self::ClientError => 400,
            Self::PayloadTooLarge => 413,
            Self::ServerError => 500,
        }
    }
}

impl SyncError {
    pub(crate) fn missing_input(message: impl Into<String>) -> Self {
        Self::MissingInput {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify this error for the upload response.
    pub fn status_class(&self) -> StatusClass {
        match self {
            Self::MissingInput { .. } | Self::InvalidMapping { .. } => StatusClass::ClientError,
            Self::OversizedSource { .. } => StatusClass::PayloadTooLarge,
            Self::Io(_)
            | Self::Archive(_)
            | Self::MalformedSource { .. }
            | Self::NoHeaderResolved
            | Self::Publish(_)
            | Self::Config { .. } => StatusClass::ServerError,
        }
    }
}

fn field_list(fields: &[LogicalField]) -> String {
    fields
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}
