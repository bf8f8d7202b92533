//! # awcache Core
//!
//! Reading, merging and writing AWStats cache files.
//!
//! This crate provides:
//! - [`MonthFile`] - one cache file, indexed lazily, sections decoded on demand
//! - [`Catalog`] / [`Year`] - the cache files of a domain in a directory
//! - [`MergeEngine`] - per-field merging of two months with re-sorting
//! - [`emit`] - rendering and atomically writing cache files
//! - [`MergeJob`] - merging two whole directories
//!
//! Section layouts, field types and merge rules come from the schema table
//! in `awcache_codec`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod config;
pub mod emit;
mod error;
mod job;
mod merge;
mod month;
pub mod paths;
mod types;

pub use catalog::{Catalog, Year};
pub use config::{Config, RuleOverride};
pub use emit::{render_month, write_month};
pub use error::{CoreError, CoreResult};
pub use job::{CacheLocation, JobOptions, JobPlan, MergeJob, MergeReport};
pub use merge::{sort_rows, MergeEngine, MergedMonth};
pub use month::MonthFile;
pub use paths::{cache_file_name, parse_cache_file_name};
pub use types::{FormatVersion, YearMonth};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use awcache_codec::{ErrorCategory, FieldValue, Record, Section, Timestamp};
