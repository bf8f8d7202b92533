//! Core type definitions for awcache.

use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use std::fmt;

/// A calendar month: the unit one cache file covers.
///
/// Orders by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    /// Four-digit year.
    pub year: i32,
    /// Month, 1 to 12.
    pub month: u32,
}

impl YearMonth {
    /// Creates a year/month pair, or `None` if `month` is not 1 to 12.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// The version tag from a cache file's header line.
///
/// Header lines read `AWSTATS DATA FILE 6.9 (build 1.925)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FormatVersion {
    /// Version string, e.g. `6.9`.
    pub version: String,
    /// Build string, e.g. `1.925`.
    pub build: String,
}

impl FormatVersion {
    /// Creates a version tag.
    pub fn new(version: impl Into<String>, build: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            build: build.into(),
        }
    }

    /// Parses a header line.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFormat`] if the line is not
    /// `<TOOL> DATA FILE <version> (build <build>)`.
    pub fn parse_header(line: &str) -> CoreResult<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [_, "DATA", "FILE", version, "(build", build, ..] => {
                let build = build.strip_suffix(')').unwrap_or(*build);
                if build.is_empty() {
                    return Err(CoreError::invalid_format(format!(
                        "empty build tag in header: '{line}'"
                    )));
                }
                Ok(Self::new(*version, build))
            }
            _ => Err(CoreError::invalid_format(format!(
                "header is not '<TOOL> DATA FILE <version> (build <build>)': '{line}'"
            ))),
        }
    }

    /// Renders the header line for `tool`.
    #[must_use]
    pub fn header(&self, tool: &str) -> String {
        format!("{tool} DATA FILE {} (build {})", self.version, self.build)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (build {})", self.version, self.build)
    }
}
