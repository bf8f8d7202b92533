//! Year/month navigation over a directory of cache files.

use crate::error::{CoreError, CoreResult};
use crate::month::MonthFile;
use crate::paths::{cache_file_pattern, match_cache_file_name};
use crate::types::YearMonth;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// All months on file for one year.
#[derive(Debug)]
pub struct Year {
    year: i32,
    months: BTreeMap<u32, MonthFile>,
}

impl Year {
    fn new(year: i32) -> Self {
        Self {
            year,
            months: BTreeMap::new(),
        }
    }

    /// The year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Months on file, ascending.
    #[must_use]
    pub fn months(&self) -> Vec<u32> {
        self.months.keys().copied().collect()
    }

    /// Looks up a month.
    #[must_use]
    pub fn get(&self, month: u32) -> Option<&MonthFile> {
        self.months.get(&month)
    }

    /// Looks up a month, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MonthNotFound`] if there is no file for the
    /// month.
    pub fn month(&self, month: u32) -> CoreResult<&MonthFile> {
        self.get(month).ok_or(CoreError::MonthNotFound {
            year: self.year,
            month,
        })
    }

    /// Returns true if there is a file for the month.
    #[must_use]
    pub fn contains_month(&self, month: u32) -> bool {
        self.months.contains_key(&month)
    }

    /// Month files, ascending.
    pub fn iter(&self) -> impl Iterator<Item = &MonthFile> {
        self.months.values()
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.year, join(self.months.keys()))
    }
}

/// The cache files of one domain in one directory, grouped by year and
/// month.
///
/// The directory is scanned once, when the catalog is opened. No cache
/// file is opened until one of its sections is requested.
#[derive(Debug)]
pub struct Catalog {
    dir: PathBuf,
    domain: String,
    years: BTreeMap<i32, Year>,
}

impl Catalog {
    /// Scans `dir` for `awstats<MM><YYYY>.<domain>.txt` files.
    ///
    /// Files whose month digits are not 1 to 12 are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DirectoryNotFound`] if `dir` does not exist or
    /// is not a directory, or an I/O error if it cannot be listed.
    pub fn open(dir: impl AsRef<Path>, domain: &str) -> CoreResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(CoreError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let pattern = cache_file_pattern(domain)?;
        let mut years: BTreeMap<i32, Year> = BTreeMap::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !pattern.is_match(name) {
                continue;
            }
            let Some(ym) = match_cache_file_name(&pattern, name) else {
                debug!(file = name, "skipping cache file with invalid month");
                continue;
            };

            years
                .entry(ym.year)
                .or_insert_with(|| Year::new(ym.year))
                .months
                .insert(ym.month, MonthFile::new(ym, entry.path()));
        }

        debug!(
            dir = %dir.display(),
            domain,
            years = years.len(),
            "scanned cache directory"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            domain: domain.to_string(),
            years,
        })
    }

    /// The scanned directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Years on file, ascending.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    /// Looks up a year.
    #[must_use]
    pub fn get(&self, year: i32) -> Option<&Year> {
        self.years.get(&year)
    }

    /// Looks up a year, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::YearNotFound`] if no file covers the year.
    pub fn year(&self, year: i32) -> CoreResult<&Year> {
        self.get(year).ok_or(CoreError::YearNotFound { year })
    }

    /// Looks up one month.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::YearNotFound`] or [`CoreError::MonthNotFound`].
    pub fn month(&self, ym: YearMonth) -> CoreResult<&MonthFile> {
        self.year(ym.year)?.month(ym.month)
    }

    /// Returns true if any file covers the year.
    #[must_use]
    pub fn contains_year(&self, year: i32) -> bool {
        self.years.contains_key(&year)
    }

    /// Returns true if a file covers the month.
    #[must_use]
    pub fn contains(&self, ym: YearMonth) -> bool {
        self.get(ym.year).is_some_and(|y| y.contains_month(ym.month))
    }

    /// Years, ascending.
    pub fn iter(&self) -> impl Iterator<Item = &Year> {
        self.years.values()
    }

    /// Every month on file, ascending.
    pub fn months(&self) -> impl Iterator<Item = &MonthFile> {
        self.iter().flat_map(Year::iter)
    }

    /// Every year/month on file, ascending.
    #[must_use]
    pub fn year_months(&self) -> Vec<YearMonth> {
        self.months().map(MonthFile::year_month).collect()
    }

    /// Returns true if no cache file was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.domain, join(self.years.keys()))
    }
}

fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn groups_by_year_and_month() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "awstats112009.example.com.txt");
        touch(dir.path(), "awstats122009.example.com.txt");
        touch(dir.path(), "awstats122008.example.com.txt");
        touch(dir.path(), "awstats112009.other.com.txt");
        touch(dir.path(), "notes.txt");

        let catalog = Catalog::open(dir.path(), "example.com").unwrap();
        assert_eq!(catalog.years(), [2008, 2009]);
        assert_eq!(catalog.year(2009).unwrap().months(), [11, 12]);
        assert_eq!(catalog.to_string(), "example.com: 2008, 2009");
        assert_eq!(catalog.year(2009).unwrap().to_string(), "2009: 11, 12");
        assert_eq!(
            catalog.year_months().iter().map(ToString::to_string).collect::<Vec<_>>(),
            ["2008-12", "2009-11", "2009-12"]
        );
    }

    #[test]
    fn missing_year_and_month() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "awstats112009.example.com.txt");
        let catalog = Catalog::open(dir.path(), "example.com").unwrap();

        assert!(matches!(
            catalog.year(9999),
            Err(CoreError::YearNotFound { year: 9999 })
        ));
        assert!(matches!(
            catalog.year(2009).unwrap().month(1),
            Err(CoreError::MonthNotFound { year: 2009, month: 1 })
        ));
        assert!(catalog.contains_year(2009));
        assert!(!catalog.year(2009).unwrap().contains_month(10));
    }

    #[test]
    fn invalid_month_is_skipped() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "awstats132009.example.com.txt");
        let catalog = Catalog::open(dir.path(), "example.com").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn missing_directory() {
        let dir = tempdir().unwrap();
        let err = Catalog::open(dir.path().join("nope"), "example.com").unwrap_err();
        assert!(matches!(err, CoreError::DirectoryNotFound { .. }));
        assert_eq!(err.category(), awcache_codec::ErrorCategory::Io);
    }

    #[test]
    fn file_is_not_a_directory() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "plain");
        assert!(Catalog::open(dir.path().join("plain"), "example.com").is_err());
    }

    #[test]
    fn files_are_not_opened() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "awstats112009.example.com.txt");
        let catalog = Catalog::open(dir.path(), "example.com").unwrap();
        let month = catalog.month(YearMonth::new(2009, 11).unwrap()).unwrap();
        assert!(!month.is_indexed());
        assert!(month.ensure_indexed().is_err());
    }
}
