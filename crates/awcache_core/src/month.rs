//! The month store: one cache file, indexed and decoded on demand.
//!
//! A cache file starts with a header line and an offset map:
//!
//! ```text
//! AWSTATS DATA FILE 6.9 (build 1.925)
//!
//! BEGIN_MAP 28
//! POS_GENERAL 2032
//! POS_TIME 2630
//! ...
//! END_MAP
//! ```
//!
//! Each `POS_` entry is the byte offset of that section's `BEGIN_` line.
//! Nothing is read until the first accessor runs; the map is then parsed
//! once, and each section is read and decoded the first time it is asked
//! for.

use crate::error::{CoreError, CoreResult};
use crate::types::{FormatVersion, YearMonth};
use awcache_codec::{begin_marker, end_marker, ErrorCategory, RawSection, Section};
use awcache_storage::{FileBackend, SourceBackend};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// The parsed header and offset map of a cache file.
#[derive(Debug, Clone)]
struct OffsetIndex {
    version: FormatVersion,
    offsets: HashMap<String, u64>,
    order: Vec<String>,
}

#[derive(Debug)]
enum IndexState {
    Pending,
    Ready(OffsetIndex),
    Failed {
        message: String,
        category: ErrorCategory,
    },
}

struct MonthState {
    path: Option<PathBuf>,
    backend: Option<Box<dyn SourceBackend>>,
    index: IndexState,
    cache: HashMap<String, Arc<Section>>,
}

impl MonthState {
    fn backend(&mut self) -> CoreResult<&mut dyn SourceBackend> {
        let backend = match self.backend.take() {
            Some(backend) => backend,
            None => {
                let path = self
                    .path
                    .as_deref()
                    .ok_or_else(|| CoreError::invalid_format("month file has no source"))?;
                Box::new(FileBackend::open(path)?) as Box<dyn SourceBackend>
            }
        };
        Ok(self.backend.insert(backend).as_mut())
    }

    fn ensure_indexed(&mut self) -> CoreResult<&OffsetIndex> {
        if matches!(self.index, IndexState::Pending) {
            match self.backend().and_then(read_offset_index) {
                Ok(index) => self.index = IndexState::Ready(index),
                Err(err) => {
                    self.index = IndexState::Failed {
                        message: err.to_string(),
                        category: err.category(),
                    };
                    return Err(err);
                }
            }
        }

        match &self.index {
            IndexState::Ready(index) => Ok(index),
            IndexState::Failed { message, category } => Err(CoreError::IndexFailed {
                message: message.clone(),
                category: *category,
            }),
            IndexState::Pending => Err(CoreError::invalid_format("cache file was not indexed")),
        }
    }
}

fn read_offset_index(backend: &mut dyn SourceBackend) -> CoreResult<OffsetIndex> {
    backend.seek(0)?;
    let header = backend
        .read_line()?
        .ok_or_else(|| CoreError::invalid_format("empty cache file"))?;
    let version = FormatVersion::parse_header(&header)?;

    let mut offsets = HashMap::new();
    let mut order = Vec::new();
    loop {
        let line = backend
            .read_line()?
            .ok_or_else(|| CoreError::invalid_format("no END_MAP before end of file"))?;
        if line.starts_with("END_MAP") {
            break;
        }
        let Some(entry) = line.strip_prefix("POS_") else {
            continue;
        };

        let mut parts = entry.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| CoreError::invalid_format(format!("empty map entry: '{line}'")))?
            .to_ascii_lowercase();
        let offset = parts
            .next()
            .and_then(|t| t.parse::<u64>().ok())
            .ok_or_else(|| {
                CoreError::invalid_format(format!("map entry without integer offset: '{line}'"))
            })?;

        if offsets.insert(name.clone(), offset).is_none() {
            order.push(name);
        }
    }

    Ok(OffsetIndex {
        version,
        offsets,
        order,
    })
}

fn read_raw_section(
    backend: &mut dyn SourceBackend,
    name: &str,
    offset: u64,
) -> CoreResult<RawSection> {
    backend.seek(offset)?;
    let begin = backend.read_line()?.ok_or_else(|| {
        CoreError::invalid_format(format!("section '{name}': offset {offset} is at end of file"))
    })?;

    let mut parts = begin.split_whitespace();
    let verb_ok = parts
        .next()
        .is_some_and(|verb| verb.eq_ignore_ascii_case(&begin_marker(name)));
    if !verb_ok {
        return Err(CoreError::invalid_format(format!(
            "section '{name}': expected {} at offset {offset}, found '{begin}'",
            begin_marker(name)
        )));
    }
    let count = parts
        .next()
        .and_then(|t| t.parse::<usize>().ok())
        .ok_or_else(|| {
            CoreError::invalid_format(format!("section '{name}': bad row count in '{begin}'"))
        })?;

    let end = end_marker(name);
    let mut raw = RawSection::new(name);
    for read in 0..count {
        let line = backend.read_line()?.ok_or_else(|| {
            CoreError::invalid_format(format!(
                "section '{name}': end of file after {read} of {count} rows"
            ))
        })?;
        let line = line.trim();
        if line.eq_ignore_ascii_case(&end) {
            warn!(section = name, read, count, "section ended before its declared row count");
            break;
        }
        raw.push_line(line);
    }
    Ok(raw)
}

/// One month's cache file.
///
/// The store is shared through `&self`: the file handle, the offset index
/// and the decoded-section cache sit behind one mutex, so a seek and the
/// reads that follow it are never interleaved with another caller's.
///
/// # Example
///
/// ```rust,ignore
/// use awcache_core::{MonthFile, YearMonth};
///
/// let month = MonthFile::new(ym, "stats/awstats112009.example.com.txt".into());
/// let general = month.section("general")?;
/// println!("{:?}", general.get("TotalVisits"));
/// ```
pub struct MonthFile {
    ym: YearMonth,
    path: Option<PathBuf>,
    state: Mutex<MonthState>,
}

impl MonthFile {
    /// Creates a store over a file on disk. The file is not opened yet.
    #[must_use]
    pub fn new(ym: YearMonth, path: PathBuf) -> Self {
        Self {
            ym,
            path: Some(path.clone()),
            state: Mutex::new(MonthState {
                path: Some(path),
                backend: None,
                index: IndexState::Pending,
                cache: HashMap::new(),
            }),
        }
    }

    /// Creates a store over an already-open backend.
    #[must_use]
    pub fn from_backend(ym: YearMonth, backend: Box<dyn SourceBackend>) -> Self {
        Self {
            ym,
            path: None,
            state: Mutex::new(MonthState {
                path: None,
                backend: Some(backend),
                index: IndexState::Pending,
                cache: HashMap::new(),
            }),
        }
    }

    /// The month this file covers.
    #[must_use]
    pub fn year_month(&self) -> YearMonth {
        self.ym
    }

    /// Path of the backing file, if it came from disk.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reads the header and offset map, if that has not happened yet.
    ///
    /// Every accessor indexes on first use. After a failure, every later call
    /// fails with [`CoreError::IndexFailed`] carrying the original message.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFormat`] for a malformed header or map,
    /// or a storage error if the file cannot be read.
    pub fn ensure_indexed(&self) -> CoreResult<()> {
        self.with_index(|_| ())
    }

    fn index_in<'s>(&self, state: &'s mut MonthState) -> CoreResult<&'s OffsetIndex> {
        let first = matches!(state.index, IndexState::Pending);
        let index = state.ensure_indexed()?;
        if first {
            debug!(month = %self.ym, sections = index.order.len(), "indexed cache file");
        }
        Ok(index)
    }

    fn with_index<T>(&self, read: impl FnOnce(&OffsetIndex) -> T) -> CoreResult<T> {
        let mut state = self.state.lock();
        self.index_in(&mut state).map(read)
    }

    /// Returns true once the offset map has been read successfully.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        matches!(self.state.lock().index, IndexState::Ready(_))
    }

    /// The header's format version.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be indexed.
    pub fn version(&self) -> CoreResult<FormatVersion> {
        self.with_index(|index| index.version.clone())
    }

    /// Section names (lowercase) in offset-map order.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be indexed.
    pub fn section_names(&self) -> CoreResult<Vec<String>> {
        self.with_index(|index| index.order.clone())
    }

    /// Number of sections in the offset map.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be indexed.
    pub fn len(&self) -> CoreResult<usize> {
        self.with_index(|index| index.order.len())
    }

    /// Returns true if the offset map has an entry for `name`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be indexed.
    pub fn contains_section(&self, name: &str) -> CoreResult<bool> {
        let key = name.to_ascii_lowercase();
        self.with_index(|index| index.offsets.contains_key(&key))
    }

    /// Reads one section without decoding it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SectionNotFound`] if the offset map has no
    /// entry for `name`, or [`CoreError::InvalidFormat`] if the section
    /// body is malformed.
    pub fn raw_section(&self, name: &str) -> CoreResult<RawSection> {
        let key = name.to_ascii_lowercase();
        let mut state = self.state.lock();
        let offset = self
            .index_in(&mut state)?
            .offsets
            .get(&key)
            .copied()
            .ok_or_else(|| CoreError::section_not_found(&key))?;
        read_raw_section(state.backend()?, &key, offset)
    }

    /// Returns a decoded section, reading and decoding it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SectionNotFound`] if the offset map has no
    /// entry for `name`, a format error for a malformed section body, or a
    /// codec error if a row does not fit the section's schema.
    pub fn section(&self, name: &str) -> CoreResult<Arc<Section>> {
        let key = name.to_ascii_lowercase();
        {
            let mut state = self.state.lock();
            self.index_in(&mut state)?;
            if let Some(section) = state.cache.get(&key) {
                return Ok(Arc::clone(section));
            }
        }

        let raw = self.raw_section(&key)?;
        let section = Arc::new(Section::decode(&raw)?);
        debug!(month = %self.ym, section = %key, rows = section.len(), "decoded section");

        let mut state = self.state.lock();
        let cached = state.cache.entry(key).or_insert(section);
        Ok(Arc::clone(cached))
    }

    /// Returns a decoded section, or `None` if the file has no such
    /// section.
    ///
    /// # Errors
    ///
    /// Fails like [`MonthFile::section`] for anything but a missing
    /// section.
    pub fn get(&self, name: &str) -> CoreResult<Option<Arc<Section>>> {
        match self.section(name) {
            Ok(section) => Ok(Some(section)),
            Err(CoreError::SectionNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Decodes every section, in offset-map order.
    ///
    /// # Errors
    ///
    /// Fails on the first section that cannot be read or decoded.
    pub fn sections(&self) -> CoreResult<Vec<Arc<Section>>> {
        self.section_names()?
            .iter()
            .map(|name| self.section(name))
            .collect()
    }
}

impl fmt::Debug for MonthFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonthFile")
            .field("ym", &self.ym)
            .field("path", &self.path)
            .field("indexed", &self.is_indexed())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for MonthFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ym)
    }
}
