//! Source backend trait definition.

use crate::error::StorageResult;
use std::io::{self, BufRead};

/// A seekable, line-oriented source for cache file text.
///
/// Cache files are addressed by byte offsets recorded in their own header,
/// so a backend must support absolute seeks followed by sequential line
/// reads.
///
/// # Invariants
///
/// - `seek(n)` followed by `read_line` returns the line starting at byte `n`
/// - `read_line` strips the trailing `\n` (and a preceding `\r`)
/// - `read_line` returns `None` only at end of input
///
/// Backends carry a single read position, so every method takes
/// `&mut self`; callers that share a backend must serialize access.
pub trait SourceBackend: Send {
    /// Moves the read position to `offset` bytes from the start.
    ///
    /// # Errors
    ///
    /// Returns an error if `offset` is beyond the end of the source or an
    /// I/O error occurs.
    fn seek(&mut self, offset: u64) -> StorageResult<()>;

    /// Reads the next line.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn read_line(&mut self) -> StorageResult<Option<String>>;

    /// Returns the current read position in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the position cannot be determined.
    fn position(&mut self) -> StorageResult<u64>;

    /// Returns the total size of the source in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;
}

/// Reads one `\n`-terminated line from `reader`.
pub(crate) fn next_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
