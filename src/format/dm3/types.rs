//! DM3 encoded type codes.
//!
//! Every data value in the tag tree is preceded by an encoded type code that
//! says how to read it. Scalar codes have a fixed width; STRING, STRUCT and
//! ARRAY are composite and carry their own layout descriptors.

use crate::error::ParseError;
use crate::io::{ByteOrder, ByteSource, Cursor};

use super::tags::TagValue;

/// Byte order of every data value inside the tag tree.
pub const VALUE_ORDER: ByteOrder = ByteOrder::LittleEndian;

// =============================================================================
// EncodedType
// =============================================================================

/// Type codes for values stored in the tag tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum EncodedType {
    /// Signed 16-bit integer (2 bytes)
    Short = 2,

    /// Signed 32-bit integer (4 bytes)
    Long = 3,

    /// Unsigned 16-bit integer (2 bytes). Also the element type of text arrays.
    UShort = 4,

    /// Unsigned 32-bit integer (4 bytes)
    ULong = 5,

    /// 32-bit float (4 bytes)
    Float = 6,

    /// 64-bit float (8 bytes)
    Double = 7,

    /// Boolean (1 byte, nonzero is true)
    Boolean = 8,

    /// Single character (1 byte)
    Char = 9,

    /// Raw byte (1 byte)
    Octet = 10,

    /// Fixed-order tuple of scalar fields
    Struct = 15,

    /// UTF-16 string with a byte-length prefix
    String = 18,

    /// Homogeneous run of scalars or structs
    Array = 20,
}

impl EncodedType {
    /// Create an EncodedType from its numeric code.
    ///
    /// Returns `None` for unknown codes.
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            2 => Some(EncodedType::Short),
            3 => Some(EncodedType::Long),
            4 => Some(EncodedType::UShort),
            5 => Some(EncodedType::ULong),
            6 => Some(EncodedType::Float),
            7 => Some(EncodedType::Double),
            8 => Some(EncodedType::Boolean),
            9 => Some(EncodedType::Char),
            10 => Some(EncodedType::Octet),
            15 => Some(EncodedType::Struct),
            18 => Some(EncodedType::String),
            20 => Some(EncodedType::Array),
            _ => None,
        }
    }

    /// Resolve a code read at `offset`, failing on unknown codes.
    pub fn from_code(code: i32, offset: u64) -> Result<Self, ParseError> {
        Self::from_i32(code).ok_or(ParseError::UnknownTagType { code, offset })
    }

    /// Get the numeric code.
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Width in bytes of a scalar of this type, `None` for composite types.
    #[inline]
    pub const fn scalar_width(self) -> Option<u64> {
        match self {
            EncodedType::Boolean | EncodedType::Char | EncodedType::Octet => Some(1),
            EncodedType::Short | EncodedType::UShort => Some(2),
            EncodedType::Long | EncodedType::ULong | EncodedType::Float => Some(4),
            EncodedType::Double => Some(8),
            EncodedType::Struct | EncodedType::String | EncodedType::Array => None,
        }
    }

    /// Whether this type is read as a single fixed-width value.
    #[inline]
    pub const fn is_scalar(self) -> bool {
        self.scalar_width().is_some()
    }

    /// Read one scalar value of this type (little-endian).
    ///
    /// Composite types cannot be read this way and yield `UnknownTagType`.
    pub fn read_scalar<S: ByteSource + ?Sized>(
        self,
        cursor: &mut Cursor<'_, S>,
    ) -> Result<TagValue, ParseError> {
        let offset = cursor.position();
        let value = match self {
            EncodedType::Short => TagValue::Short(cursor.read_i16(VALUE_ORDER)?),
            EncodedType::Long => TagValue::Long(cursor.read_i32(VALUE_ORDER)?),
            EncodedType::UShort => TagValue::UShort(cursor.read_u16(VALUE_ORDER)?),
            EncodedType::ULong => TagValue::ULong(cursor.read_u32(VALUE_ORDER)?),
            EncodedType::Float => TagValue::Float(cursor.read_f32(VALUE_ORDER)?),
            EncodedType::Double => TagValue::Double(cursor.read_f64(VALUE_ORDER)?),
            EncodedType::Boolean => TagValue::Bool(cursor.read_bool()?),
            EncodedType::Char => TagValue::Char(cursor.read_u8()?),
            EncodedType::Octet => TagValue::Octet(cursor.read_u8()?),
            EncodedType::Struct | EncodedType::String | EncodedType::Array => {
                return Err(ParseError::UnknownTagType {
                    code: self.as_i32(),
                    offset,
                })
            }
        };
        Ok(value)
    }
}

/// Byte width of one array item made of `types`, composites counting as zero.
pub fn item_width(types: &[EncodedType]) -> u64 {
    types.iter().filter_map(|t| t.scalar_width()).sum()
}

// =============================================================================
// Tests
// =============================================================================
