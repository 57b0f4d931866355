//! Date resolution for row ordering.
//!
//! A [`DateResolver`] tries its explicit `chrono` formats in order and falls back to a permissive
//! set of common date/time shapes. A cell that matches nothing resolves to `None`, which is a
//! normal outcome: the extraction strategy decides whether that rejects the row.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::types::Timestamp;

/// A single `chrono` format string, either with a time part or date-only (midnight).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatePattern {
    DateTime(String),
    DateOnly(String),
}

impl DatePattern {
    fn parse(&self, s: &str) -> Option<Timestamp> {
        match self {
            Self::DateTime(fmt) => NaiveDateTime::parse_from_str(s, fmt).ok(),
            Self::DateOnly(fmt) => NaiveDate::parse_from_str(s, fmt)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN)),
        }
    }
}

const FALLBACK_DATE_TIMES: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    // 12-hour spreadsheet exports
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y, %I:%M:%S %p",
];

const FALLBACK_DATES: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
];

/// Ordered chain of explicit formats plus a permissive fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateResolver {
    explicit: Vec<DatePattern>,
}

impl Default for DateResolver {
    /// `M/d/yyyy H:mm`, then `M/d/yyyy HH:mm:ss`, then `M/d/yyyy`.
    ///
    /// `%H` accepts one or two digits, so the first pattern also covers zero-padded hours.
    fn default() -> Self {
        Self {
            explicit: vec![
                DatePattern::DateTime("%m/%d/%Y %H:%M".to_string()),
                DatePattern::DateTime("%m/%d/%Y %H:%M:%S".to_string()),
                DatePattern::DateOnly("%m/%d/%Y".to_string()),
            ],
        }
    }
}

impl DateResolver {
    /// Resolver with only the given explicit patterns (the fallback still applies).
    pub fn with_patterns(explicit: Vec<DatePattern>) -> Self {
        Self { explicit }
    }

    /// Append an explicit pattern after the existing ones.
    pub fn push(&mut self, pattern: DatePattern) {
        self.explicit.push(pattern);
    }

    pub fn patterns(&self) -> &[DatePattern] {
        &self.explicit
    }

    /// Resolve a cell to a timestamp; `None` when nothing matches.
    pub fn resolve(&self, cell: &str) -> Option<Timestamp> {
        let s = cell.trim();
        if s.is_empty() {
            return None;
        }
        self.explicit
            .iter()
            .find_map(|p| p.parse(s))
            .or_else(|| fallback(s))
    }
}

fn fallback(s: &str) -> Option<Timestamp> {
    // Inputs with an explicit offset are compared as UTC instants.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }
    FALLBACK_DATE_TIMES
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            FALLBACK_DATES
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

static DEFAULT_RESOLVER: LazyLock<DateResolver> = LazyLock::new(DateResolver::default);

/// Resolve with the default chain.
pub fn resolve_date(cell: &str) -> Option<Timestamp> {
    DEFAULT_RESOLVER.resolve(cell)
}
