//! Merging two whole cache directories.

use crate::catalog::Catalog;
use crate::emit::{copy_month, write_month};
use crate::error::{CoreError, CoreResult};
use crate::merge::MergeEngine;
use crate::types::YearMonth;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One side of a merge: a directory and a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLocation {
    /// Directory holding the cache files.
    pub dir: PathBuf,
    /// Domain in the cache file names.
    pub domain: String,
}

impl CacheLocation {
    /// Creates a location.
    pub fn new(dir: impl Into<PathBuf>, domain: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            domain: domain.into(),
        }
    }

    fn same_as(&self, other: &CacheLocation) -> bool {
        self.domain == other.domain && absolute(&self.dir) == absolute(&other.dir)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Unresolved merge options, as given on a command line.
///
/// Missing values default the way `resolve` documents.
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    /// First input directory; defaults to `.`.
    pub dir1: Option<PathBuf>,
    /// First input domain; required.
    pub domain1: Option<String>,
    /// Second input directory; defaults to `dir1`.
    pub dir2: Option<PathBuf>,
    /// Second input domain; defaults to `domain1`.
    pub domain2: Option<String>,
    /// Output directory; required.
    pub outdir: Option<PathBuf>,
    /// Output domain; defaults to `domain1`.
    pub outdomain: Option<String>,
}

/// Fully resolved inputs and output of a merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPlan {
    /// First (older) input.
    pub left: CacheLocation,
    /// Second (more recent) input.
    pub right: CacheLocation,
    /// Output.
    pub output: CacheLocation,
}

impl JobOptions {
    /// Applies defaults and rejects unusable combinations.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if `domain1` or `outdir` is
    /// missing, if both inputs name the same directory and domain, or if
    /// the output would overwrite either input.
    pub fn resolve(self) -> CoreResult<JobPlan> {
        let domain1 = self
            .domain1
            .ok_or_else(|| CoreError::configuration("domain1 must be specified"))?;
        let outdir = self
            .outdir
            .ok_or_else(|| CoreError::configuration("outdir must be specified"))?;
        let dir1 = self.dir1.unwrap_or_else(|| PathBuf::from("."));

        let left = CacheLocation::new(dir1.clone(), domain1.clone());
        let right = CacheLocation::new(
            self.dir2.unwrap_or(dir1),
            self.domain2.unwrap_or_else(|| domain1.clone()),
        );
        let output = CacheLocation::new(outdir, self.outdomain.unwrap_or(domain1));

        if left.same_as(&right) {
            return Err(CoreError::configuration(
                "the two inputs are identical: give a different dir2 or domain2",
            ));
        }
        if output.same_as(&left) || output.same_as(&right) {
            return Err(CoreError::configuration(
                "output directory and domain would overwrite an input",
            ));
        }

        Ok(JobPlan {
            left,
            right,
            output,
        })
    }
}

/// What a merge run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Months present on both sides and merged.
    pub merged: Vec<YearMonth>,
    /// Months present only in the first input and copied.
    pub copied_from_left: Vec<YearMonth>,
    /// Months present only in the second input and copied.
    pub copied_from_right: Vec<YearMonth>,
    /// Every file written, in order.
    pub written: Vec<PathBuf>,
}

impl MergeReport {
    /// Number of output files.
    #[must_use]
    pub fn total(&self) -> usize {
        self.written.len()
    }
}

/// Merges every month of two catalogs into an output directory.
///
/// A month on one side only is copied byte for byte under the output
/// name; a month on both sides is merged and emitted. Months are handled
/// in ascending order, and the first failure stops the run.
#[derive(Debug, Clone)]
pub struct MergeJob {
    engine: MergeEngine,
    output: CacheLocation,
}

impl MergeJob {
    /// Creates a job writing to `output`.
    #[must_use]
    pub fn new(engine: MergeEngine, output: CacheLocation) -> Self {
        Self { engine, output }
    }

    /// Runs the job over two catalogs; `right` is the more recent data.
    ///
    /// The output directory is created if needed.
    ///
    /// # Errors
    ///
    /// Fails on the first month that cannot be read, merged or written.
    pub fn run(&self, left: &Catalog, right: &Catalog) -> CoreResult<MergeReport> {
        fs::create_dir_all(&self.output.dir)?;

        let months: BTreeSet<YearMonth> = left
            .year_months()
            .into_iter()
            .chain(right.year_months())
            .collect();

        let mut report = MergeReport::default();
        for ym in months {
            let path = match (left.month(ym).ok(), right.month(ym).ok()) {
                (Some(l), Some(r)) => {
                    let merged = self.engine.merge_months(l, r)?;
                    let path = write_month(
                        &self.output.dir,
                        &self.output.domain,
                        ym,
                        &merged,
                        self.engine.config(),
                    )?;
                    info!(month = %ym, path = %path.display(), "merged month");
                    report.merged.push(ym);
                    path
                }
                (Some(only), None) | (None, Some(only)) => {
                    let source = only.path().ok_or_else(|| {
                        CoreError::invalid_format(format!("month {ym} has no backing file"))
                    })?;
                    let path = copy_month(source, &self.output.dir, &self.output.domain, ym)?;
                    info!(month = %ym, from = %source.display(), "copied unmatched month");
                    if left.contains(ym) {
                        report.copied_from_left.push(ym);
                    } else {
                        report.copied_from_right.push(ym);
                    }
                    path
                }
                (None, None) => continue,
            };
            report.written.push(path);
        }
        Ok(report)
    }
}
