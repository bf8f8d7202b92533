//! Cache file naming.
//!
//! One cache file covers one month of one domain:
//!
//! ```text
//! awstats<MM><YYYY>.<domain>.txt
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::YearMonth;
use regex::Regex;

/// Builds the pattern matching cache file names for `domain`.
///
/// # Errors
///
/// Returns [`CoreError::Configuration`] if the pattern cannot be compiled.
pub fn cache_file_pattern(domain: &str) -> CoreResult<Regex> {
    Regex::new(&format!(
        r"^awstats(\d{{2}})(\d{{4}})\.{}\.txt$",
        regex::escape(domain)
    ))
    .map_err(|e| CoreError::configuration(format!("bad domain '{domain}': {e}")))
}

/// Extracts the year and month from a cache file name.
///
/// Returns `None` if the name does not match the pattern or the month is
/// not 1 to 12.
#[must_use]
pub fn match_cache_file_name(pattern: &Regex, name: &str) -> Option<YearMonth> {
    let caps = pattern.captures(name)?;
    let month = caps.get(1)?.as_str().parse().ok()?;
    let year = caps.get(2)?.as_str().parse().ok()?;
    YearMonth::new(year, month)
}

/// Extracts the year and month from a cache file name for `domain`.
#[must_use]
pub fn parse_cache_file_name(name: &str, domain: &str) -> Option<YearMonth> {
    let pattern = cache_file_pattern(domain).ok()?;
    match_cache_file_name(&pattern, name)
}

/// Builds the cache file name for `domain` and `ym`.
#[must_use]
pub fn cache_file_name(domain: &str, ym: YearMonth) -> String {
    format!("awstats{:02}{:04}.{domain}.txt", ym.month, ym.year)
}
