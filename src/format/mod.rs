//! File format parsers.
//!
//! DM3 is the only supported container. Files are recognised by their
//! 12-byte header alone; there is no content sniffing beyond that.

pub mod dm3;

pub use dm3::{parse_tag_tree, Dm3Header, ParseOptions, TagPath, TagStore, TagValue};
