//! In-memory source backend.

use crate::backend::{next_line, SourceBackend};
use crate::error::{StorageError, StorageResult};
use std::io::Cursor;

/// An in-memory source backend.
///
/// Suitable for:
/// - Unit and integration tests
/// - Cache data received from somewhere other than the local disk
///
/// # Example
///
/// ```rust
/// use awcache_storage::{InMemoryBackend, SourceBackend};
///
/// let mut backend = InMemoryBackend::from_text("line\n");
/// assert_eq!(backend.size().unwrap(), 5);
/// assert_eq!(backend.read_line().unwrap().as_deref(), Some("line"));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    cursor: Cursor<Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates a backend over the given bytes.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Creates a backend over the given text.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }

    /// Returns the backing bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.cursor.get_ref()
    }
}

impl SourceBackend for InMemoryBackend {
    fn seek(&mut self, offset: u64) -> StorageResult<()> {
        let size = self.cursor.get_ref().len() as u64;
        if offset > size {
            return Err(StorageError::SeekPastEnd { offset, size });
        }
        self.cursor.set_position(offset);
        Ok(())
    }

    fn read_line(&mut self) -> StorageResult<Option<String>> {
        Ok(next_line(&mut self.cursor)?)
    }

    fn position(&mut self) -> StorageResult<u64> {
        Ok(self.cursor.position())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.cursor.get_ref().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_backend() {
        let mut backend = InMemoryBackend::default();
        assert_eq!(backend.size().unwrap(), 0);
        assert_eq!(backend.read_line().unwrap(), None);
    }

    #[test]
    fn seek_and_reread() {
        let mut backend = InMemoryBackend::from_text("one\ntwo\nthree\n");
        assert_eq!(backend.read_line().unwrap().as_deref(), Some("one"));
        assert_eq!(backend.read_line().unwrap().as_deref(), Some("two"));

        backend.seek(4).unwrap();
        assert_eq!(backend.position().unwrap(), 4);
        assert_eq!(backend.read_line().unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn seek_to_end_yields_eof() {
        let mut backend = InMemoryBackend::from_text("abc\n");
        backend.seek(4).unwrap();
        assert_eq!(backend.read_line().unwrap(), None);
    }

    #[test]
    fn seek_past_end_fails() {
        let mut backend = InMemoryBackend::from_text("abc");
        assert!(matches!(
            backend.seek(10),
            Err(StorageError::SeekPastEnd { offset: 10, size: 3 })
        ));
    }

    #[test]
    fn data_accessor() {
        let backend = InMemoryBackend::new(vec![b'x', b'\n']);
        assert_eq!(backend.data(), b"x\n");
    }
}
