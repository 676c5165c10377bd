//! DM3 file header parsing.
//!
//! # Header Structure (12 bytes, big-endian)
//! ```text
//! Bytes 0-3:  File format version (must be 3)
//! Bytes 4-7:  Declared file size in bytes (advisory)
//! Bytes 8-11: Byte order of tag data (1 = little-endian, required)
//! ```
//!
//! The root tag group starts immediately after the header.

use crate::error::ParseError;
use crate::io::{ByteOrder, Primitive};

/// Size of the DM3 header in bytes
pub const DM3_HEADER_SIZE: usize = 12;

/// The only supported file format version
const VERSION_DM3: i32 = 3;

/// Byte order flag for little-endian tag data
const BYTE_ORDER_LITTLE_ENDIAN: i32 = 1;

/// Parsed DM3 file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dm3Header {
    /// File format version (always 3 once validated)
    pub version: i32,

    /// File size as declared by the writer. Not checked against the real size.
    pub declared_size: i32,

    /// Byte order of the data values in the tag tree
    pub value_order: ByteOrder,
}

impl Dm3Header {
    /// Parse and validate a DM3 header from raw bytes.
    ///
    /// # Errors
    /// - `NotADm3File` if the version is not 3 or the byte order flag is not 1
    ///
    /// # Panics
    /// Panics if `bytes` holds fewer than [`DM3_HEADER_SIZE`] bytes; callers
    /// read exactly that many first.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let version = i32::from_bytes(&bytes[0..4], ByteOrder::BigEndian);
        let declared_size = i32::from_bytes(&bytes[4..8], ByteOrder::BigEndian);
        let byte_order = i32::from_bytes(&bytes[8..12], ByteOrder::BigEndian);

        if version != VERSION_DM3 || byte_order != BYTE_ORDER_LITTLE_ENDIAN {
            return Err(ParseError::NotADm3File {
                version,
                byte_order,
            });
        }

        Ok(Dm3Header {
            version,
            declared_size,
            value_order: ByteOrder::LittleEndian,
        })
    }
}
