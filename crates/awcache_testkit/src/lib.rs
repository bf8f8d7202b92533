//! # awcache Testkit
//!
//! Test utilities for awcache.
//!
//! This crate provides:
//! - Cache file fixtures with a correct offset map and the quirks of real files
//! - Sample months covering every known section
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use awcache_testkit::prelude::*;
//!
//! #[test]
//! fn reads_a_month() {
//!     let dir = CacheDir::new();
//!     dir.add_month("example.com", 2009, 11, &november_2009());
//!     // ... open a catalog on dir.path()
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod samples;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::samples::*;
}

pub use fixtures::*;
pub use generators::*;
pub use samples::*;
