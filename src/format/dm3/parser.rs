//! Tag tree parsing.
//!
//! The tag tree is read in a single recursive-descent pass right after the
//! header. Three states call each other:
//!
//! ## Group
//! ```text
//! 1 byte   sorted flag (ignored)
//! 1 byte   open flag (ignored)
//! 4 bytes  number of entries (BE)
//! entries...
//! ```
//!
//! ## Entry
//! ```text
//! 1 byte   kind: 21 = data, 20 = nested group
//! 2 bytes  label length (BE), 0 = unlabeled
//! n bytes  label
//! group or data...
//! ```
//! Unlabeled entries are named by their 0-based position in the parent.
//!
//! ## Data
//! ```text
//! 4 bytes  "%%%%"
//! 4 bytes  number of type descriptors that follow (BE, unused)
//! 4 bytes  encoded type (BE)
//! type-specific layout, then little-endian values
//! ```
//!
//! Arrays that are not short text are not read: their byte span and absolute
//! offset are stored as `<path>.Size` and `<path>.Offset` and the cursor
//! jumps past them. This is how image payloads are skipped.

use crate::error::ParseError;
use crate::io::{decode_slice, ByteOrder, ByteSource, Cursor};

use super::header::{Dm3Header, DM3_HEADER_SIZE};
use super::tags::{TagPath, TagStore, TagValue};
use super::types::{item_width, EncodedType, VALUE_ORDER};

// =============================================================================
// Constants
// =============================================================================

/// Byte order of the structural fields of the tag tree
const STRUCTURE_ORDER: ByteOrder = ByteOrder::BigEndian;

/// Entry kind marking a data entry (anything else opens a group)
pub const DATA_ENTRY: u8 = 21;

/// Marker preceding every data value
pub const DATA_DELIMITER: [u8; 4] = *b"%%%%";

/// Corruption guard on the number of fields in a struct
pub const MAX_STRUCT_FIELDS: u32 = 100;

/// Default bound on group and array nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// USHORT arrays shorter than this are decoded as text
const TEXT_ARRAY_LIMIT: u32 = 256;

/// Arrays under this path suffix are always pixel data, never text
const IMAGE_DATA_SUFFIX: &str = "ImageData.Data";

/// Suffix of the synthetic byte-length tag of a skipped array
pub const SIZE_SUFFIX: &str = "Size";

/// Suffix of the synthetic absolute-offset tag of a skipped array
pub const OFFSET_SUFFIX: &str = "Offset";

// =============================================================================
// ParseOptions
// =============================================================================

/// Tunables for the tag tree pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum depth of nested groups, and of nested array type descriptors.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

// =============================================================================
// Entry point
// =============================================================================

/// Parse the header and the whole tag tree of a DM3 source.
///
/// Either the complete tree is returned or the first fatal error; there is
/// no partial result.
pub fn parse_tag_tree<S: ByteSource + ?Sized>(
    source: &mut S,
    options: ParseOptions,
) -> Result<(Dm3Header, TagStore), ParseError> {
    let mut cursor = Cursor::new(source);
    let header_bytes = cursor.read_array::<DM3_HEADER_SIZE>()?;
    let header = Dm3Header::parse(&header_bytes)?;

    let mut parser = TagTreeParser {
        cursor,
        options,
        store: TagStore::new(),
    };
    parser.read_group(&TagPath::root())?;

    Ok((header, parser.store))
}

// =============================================================================
// TagTreeParser
// =============================================================================

struct TagTreeParser<'a, S: ByteSource + ?Sized> {
    cursor: Cursor<'a, S>,
    options: ParseOptions,
    store: TagStore,
}

impl<S: ByteSource + ?Sized> TagTreeParser<'_, S> {
    fn read_group(&mut self, path: &TagPath) -> Result<(), ParseError> {
        if path.depth() > self.options.max_depth {
            return Err(ParseError::MaxDepthExceeded {
                max_depth: self.options.max_depth,
                path: path.key(),
            });
        }

        let _sorted = self.cursor.read_bool()?;
        let _open = self.cursor.read_bool()?;
        let entry_count = self.cursor.read_u32(STRUCTURE_ORDER)?;

        for index in 0..entry_count {
            self.read_entry(path, index)?;
        }
        Ok(())
    }

    fn read_entry(&mut self, parent: &TagPath, index: u32) -> Result<(), ParseError> {
        let kind = self.cursor.read_u8()?;
        let label_len = self.cursor.read_u16(STRUCTURE_ORDER)?;

        let label = if label_len != 0 {
            let bytes = self.cursor.read_bytes(label_len as usize)?;
            decode_label(&bytes)
        } else {
            index.to_string()
        };

        let path = parent.child(label);
        if kind == DATA_ENTRY {
            self.read_data(&path)
        } else {
            self.read_group(&path)
        }
    }

    fn read_data(&mut self, path: &TagPath) -> Result<(), ParseError> {
        let delimiter_offset = self.cursor.position();
        let delimiter = self.cursor.read_array::<4>()?;
        if delimiter != DATA_DELIMITER {
            return Err(ParseError::BadDelimiter {
                offset: delimiter_offset,
                found: delimiter,
            });
        }

        // Type descriptor count; the descriptors themselves are self-describing.
        let _descriptor_count = self.cursor.read_u32(STRUCTURE_ORDER)?;

        let encoded_type = self.read_encoded_type()?;
        match encoded_type {
            EncodedType::String => {
                let byte_len = self.cursor.read_i32(STRUCTURE_ORDER)?;
                let text = self.read_utf16(path, byte_len.max(0) as u64)?;
                self.store.insert(path.key(), TagValue::String(text));
            }
            EncodedType::Struct => {
                let fields = self.read_struct_layout()?;
                self.read_struct_values(&fields)?;
            }
            EncodedType::Array => {
                let item_types = self.read_array_layout(path, 0)?;
                self.read_array_data(path, &item_types)?;
            }
            scalar => {
                let value = scalar.read_scalar(&mut self.cursor)?;
                self.store.insert(path.key(), value);
            }
        }
        Ok(())
    }

    fn read_encoded_type(&mut self) -> Result<EncodedType, ParseError> {
        let offset = self.cursor.position();
        let code = self.cursor.read_i32(STRUCTURE_ORDER)?;
        EncodedType::from_code(code, offset)
    }

    /// Read `byte_len` bytes of UTF-16LE text.
    ///
    /// An odd byte count or an unpaired surrogate is `InvalidText`.
    fn read_utf16(&mut self, path: &TagPath, byte_len: u64) -> Result<String, ParseError> {
        if byte_len == 0 {
            return Ok(String::new());
        }
        let offset = self.cursor.position();
        let bytes = self.cursor.read_bytes(byte_len as usize)?;
        let invalid = || ParseError::InvalidText {
            path: path.key(),
            offset,
        };
        if bytes.len() % 2 != 0 {
            return Err(invalid());
        }
        let units: Vec<u16> = decode_slice(&bytes, VALUE_ORDER);
        String::from_utf16(&units).map_err(|_| invalid())
    }

    // -------------------------------------------------------------------------
    // Structs
    // -------------------------------------------------------------------------

    /// Read a struct type layout, returning the field types in order.
    fn read_struct_layout(&mut self) -> Result<Vec<EncodedType>, ParseError> {
        let _name_len = self.cursor.read_u32(STRUCTURE_ORDER)?;

        let count_offset = self.cursor.position();
        // Unsigned, so a count with the high bit set is rejected as oversized
        let field_count = self.cursor.read_u32(STRUCTURE_ORDER)?;
        if field_count > MAX_STRUCT_FIELDS {
            return Err(ParseError::TooManyFields {
                count: field_count,
                offset: count_offset,
            });
        }

        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            let _field_name_len = self.cursor.read_u32(STRUCTURE_ORDER)?;
            fields.push(self.read_encoded_type()?);
        }
        Ok(fields)
    }

    /// Consume one value per field. Struct fields are not stored as tags.
    fn read_struct_values(&mut self, fields: &[EncodedType]) -> Result<(), ParseError> {
        for field in fields {
            field.read_scalar(&mut self.cursor)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Arrays
    // -------------------------------------------------------------------------

    /// Read an array's element type descriptor.
    ///
    /// Struct elements expand to their field types; nested arrays collapse to
    /// the innermost element types.
    fn read_array_layout(
        &mut self,
        path: &TagPath,
        nesting: usize,
    ) -> Result<Vec<EncodedType>, ParseError> {
        if nesting > self.options.max_depth {
            return Err(ParseError::MaxDepthExceeded {
                max_depth: self.options.max_depth,
                path: path.key(),
            });
        }

        match self.read_encoded_type()? {
            EncodedType::Struct => self.read_struct_layout(),
            EncodedType::Array => self.read_array_layout(path, nesting + 1),
            element => Ok(vec![element]),
        }
    }

    fn read_array_data(
        &mut self,
        path: &TagPath,
        item_types: &[EncodedType],
    ) -> Result<(), ParseError> {
        let count = self.cursor.read_u32(STRUCTURE_ORDER)?;
        let span = count as u64 * item_width(item_types);
        let key = path.key();

        if is_text_array(&key, item_types, count) {
            let text = self.read_utf16(path, span)?;
            self.store.insert(key, TagValue::String(text));
        } else {
            let offset = self.cursor.position();
            self.store
                .insert(format!("{}.{}", key, SIZE_SUFFIX), TagValue::UInt64(span));
            self.store
                .insert(format!("{}.{}", key, OFFSET_SUFFIX), TagValue::UInt64(offset));
            self.cursor.skip(span)?;
        }
        Ok(())
    }
}

/// Map each label byte to the char with the same code point (Latin-1).
///
/// Distinct byte strings always give distinct labels, so sibling entries
/// never collide on one path.
fn decode_label(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Whether an array holds text rather than binary data.
///
/// Short USHORT arrays are UTF-16 strings, unless they sit under an
/// `ImageData.Data` path, where they are always pixels.
fn is_text_array(key: &str, item_types: &[EncodedType], count: u32) -> bool {
    !key.ends_with(IMAGE_DATA_SUFFIX)
        && item_types == [EncodedType::UShort]
        && count < TEXT_ARRAY_LIMIT
}

// =============================================================================
// Tests
// =============================================================================
