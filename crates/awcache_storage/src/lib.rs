//! # awcache Storage
//!
//! Source backends for reading AWStats cache files.
//!
//! A backend is a **seekable line source**: it can jump to a byte offset
//! and hand back the lines that follow. Backends know nothing about
//! sections, offset maps or records; `awcache_core` owns all format
//! interpretation.
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - Buffered reader over an OS file
//! - [`InMemoryBackend`] - For tests and for data that never touched disk
//!
//! ## Example
//!
//! ```rust
//! use awcache_storage::{InMemoryBackend, SourceBackend};
//!
//! let mut backend = InMemoryBackend::from_text("first\nsecond\n");
//! backend.seek(6).unwrap();
//! assert_eq!(backend.read_line().unwrap().as_deref(), Some("second"));
//! assert_eq!(backend.read_line().unwrap(), None);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::SourceBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
