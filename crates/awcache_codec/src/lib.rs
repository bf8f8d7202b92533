//! # awcache Codec
//!
//! Typed values and the section schema table for AWStats cache files.
//!
//! This crate turns the positional tokens of a cache-file row into a typed
//! [`Record`] and back:
//!
//! - [`Timestamp`] - date, date/time and the `0` sentinel
//! - [`FieldValue`] - integer, text or timestamp
//! - [`schema`] - the static table of row shapes, merge rules and sort orders
//! - [`RawSection`] / [`Section`] - undecoded and decoded section rows
//!
//! No I/O happens here; `awcache_core` locates sections in a file and hands
//! their lines to this crate.
//!
//! ## Usage
//!
//! ```
//! use awcache_codec::{FieldValue, RawSection, Section};
//!
//! let mut raw = RawSection::new("general");
//! raw.push_line("TotalVisits 1475");
//!
//! let section = Section::decode(&raw).unwrap();
//! let visits = section.get("TotalVisits").unwrap();
//! assert_eq!(visits.get("value"), Some(&FieldValue::Int(1475)));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod record;
pub mod schema;
mod section;
mod timestamp;
mod value;

pub use decoder::decode_row;
pub use encoder::{begin_marker, encode_row, encode_section, end_marker, pos_marker};
pub use error::{CodecError, CodecResult, ErrorCategory};
pub use record::Record;
pub use schema::{
    section_schema, validate_table, Decoder, FieldSpec, MergeRule, SectionSchema, SortDirection,
    SortKey, SortMeta,
};
pub use section::{RawSection, Section};
pub use timestamp::Timestamp;
pub use value::FieldValue;
