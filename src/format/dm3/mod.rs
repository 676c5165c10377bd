//! DM3 parser for GATAN DigitalMicrograph files.
//!
//! # Key Concepts
//!
//! - **Header**: 12 big-endian bytes (version 3, declared size, byte order 1).
//!
//! - **Tag tree**: groups of entries, each entry either a nested group or a
//!   data value. Structural fields (counts, lengths, type codes) are
//!   big-endian; data values are little-endian.
//!
//! - **Flattening**: every data value is stored under its dot-joined path in
//!   a [`TagStore`]. Unlabeled entries use their position in the parent.
//!
//! - **Binary blocks**: arrays that are not short text are skipped during
//!   parsing and recorded as `<path>.Size` / `<path>.Offset`, so pixel data is
//!   only read when an image is requested.

mod header;
mod parser;
mod tags;
mod types;

pub use header::{Dm3Header, DM3_HEADER_SIZE};
pub use parser::{
    parse_tag_tree, ParseOptions, DATA_DELIMITER, DATA_ENTRY, DEFAULT_MAX_DEPTH,
    MAX_STRUCT_FIELDS, OFFSET_SUFFIX, SIZE_SUFFIX,
};
pub use tags::{TagPath, TagStore, TagValue, ROOT_LABEL};
pub use types::{item_width, EncodedType, VALUE_ORDER};
