//! File-based source backend.

use crate::backend::{next_line, SourceBackend};
use crate::error::{StorageError, StorageResult};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A buffered, read-only source over an OS file.
///
/// The file handle is held for the lifetime of the backend and released
/// on drop.
///
/// # Example
///
/// ```no_run
/// use awcache_storage::{FileBackend, SourceBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("awstats112009.example.com.txt")).unwrap();
/// let header = backend.read_line().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    reader: BufReader<File>,
    size: u64,
}

impl FileBackend {
    /// Opens the file at `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            size,
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceBackend for FileBackend {
    fn seek(&mut self, offset: u64) -> StorageResult<()> {
        if offset > self.size {
            return Err(StorageError::SeekPastEnd {
                offset,
                size: self.size,
            });
        }
        self.reader.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn read_line(&mut self) -> StorageResult<Option<String>> {
        Ok(next_line(&mut self.reader)?)
    }

    fn position(&mut self) -> StorageResult<u64> {
        Ok(self.reader.stream_position()?)
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.size)
    }
}
