//! Image pixel encodings.
//!
//! The `ImageData.DataType` tag selects how the pixel block is encoded. This
//! is a separate enumeration from the tag tree's encoded types.

use crate::io::ByteOrder;

/// DigitalMicrograph image data types.
///
/// All known codes are listed so unsupported images can be reported by
/// name; only a subset can be decoded (see [`DataType::is_supported`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    Null = 0,
    SignedInt16 = 1,
    Real4 = 2,
    Complex8 = 3,
    Obsolete = 4,
    /// Half-plane FFT output, see [`crate::image::unpack_packed_complex`]
    Packed = 5,
    UnsignedInt8 = 6,
    SignedInt32 = 7,
    Rgb = 8,
    SignedInt8 = 9,
    UnsignedInt16 = 10,
    UnsignedInt32 = 11,
    Real8 = 12,
    Complex16 = 13,
    /// One byte per pixel, nonzero is set
    Binary = 14,
    RgbUInt8_0 = 15,
    RgbUInt8_1 = 16,
    RgbUInt16 = 17,
    RgbFloat32 = 18,
    RgbFloat64 = 19,
    RgbaUInt8_0 = 20,
    RgbaUInt8_1 = 21,
    RgbaUInt8_2 = 22,
    RgbaUInt8_3 = 23,
    RgbaUInt16 = 24,
    RgbaFloat32 = 25,
    RgbaFloat64 = 26,
    Point2SInt16_0 = 27,
    Point2SInt16_1 = 28,
    Point2SInt32_0 = 29,
    Point2Float32_0 = 30,
    RectSInt16_1 = 31,
    RectSInt32_1 = 32,
    RectFloat32_1 = 33,
    RectFloat32_0 = 34,
    SignedInt64 = 35,
    UnsignedInt64 = 36,
    Last = 37,
}

/// Raw element layout of a decodable data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawElement {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl RawElement {
    /// Size of one element in bytes.
    pub const fn width(self) -> u64 {
        match self {
            RawElement::I8 | RawElement::U8 => 1,
            RawElement::I16 | RawElement::U16 => 2,
            RawElement::I32 | RawElement::U32 | RawElement::F32 => 4,
            RawElement::F64 => 8,
        }
    }
}

impl DataType {
    /// Create a DataType from its numeric code.
    ///
    /// Returns `None` for codes outside the known table.
    pub fn from_code(code: i64) -> Option<Self> {
        use DataType::*;
        let data_type = match code {
            0 => Null,
            1 => SignedInt16,
            2 => Real4,
            3 => Complex8,
            4 => Obsolete,
            5 => Packed,
            6 => UnsignedInt8,
            7 => SignedInt32,
            8 => Rgb,
            9 => SignedInt8,
            10 => UnsignedInt16,
            11 => UnsignedInt32,
            12 => Real8,
            13 => Complex16,
            14 => Binary,
            15 => RgbUInt8_0,
            16 => RgbUInt8_1,
            17 => RgbUInt16,
            18 => RgbFloat32,
            19 => RgbFloat64,
            20 => RgbaUInt8_0,
            21 => RgbaUInt8_1,
            22 => RgbaUInt8_2,
            23 => RgbaUInt8_3,
            24 => RgbaUInt16,
            25 => RgbaFloat32,
            26 => RgbaFloat64,
            27 => Point2SInt16_0,
            28 => Point2SInt16_1,
            29 => Point2SInt32_0,
            30 => Point2Float32_0,
            31 => RectSInt16_1,
            32 => RectSInt32_1,
            33 => RectFloat32_1,
            34 => RectFloat32_0,
            35 => SignedInt64,
            36 => UnsignedInt64,
            37 => Last,
            _ => return None,
        };
        Some(data_type)
    }

    /// Get the numeric code.
    #[inline]
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// The raw element read from disk, `None` for types without a decoder.
    pub const fn raw_element(self) -> Option<(RawElement, ByteOrder)> {
        use ByteOrder::*;
        match self {
            DataType::SignedInt16 => Some((RawElement::I16, LittleEndian)),
            DataType::Real4 | DataType::Complex8 | DataType::Packed => {
                Some((RawElement::F32, LittleEndian))
            }
            DataType::UnsignedInt8 | DataType::Binary => Some((RawElement::U8, BigEndian)),
            DataType::SignedInt32 => Some((RawElement::I32, LittleEndian)),
            DataType::SignedInt8 => Some((RawElement::I8, BigEndian)),
            DataType::UnsignedInt16 => Some((RawElement::U16, LittleEndian)),
            DataType::UnsignedInt32 => Some((RawElement::U32, LittleEndian)),
            DataType::Real8 | DataType::Complex16 => Some((RawElement::F64, LittleEndian)),
            _ => None,
        }
    }

    /// Check if pixel data of this type can be materialized.
    #[inline]
    pub const fn is_supported(self) -> bool {
        self.raw_element().is_some()
    }

    /// Whether raw values are (real, imaginary) pairs.
    #[inline]
    pub const fn is_complex_pairs(self) -> bool {
        matches!(self, DataType::Complex8 | DataType::Complex16)
    }

    /// DigitalMicrograph's symbolic name for the type.
    pub const fn name(self) -> &'static str {
        use DataType::*;
        match self {
            Null => "NULL_DATA",
            SignedInt16 => "SIGNED_INT16_DATA",
            Real4 => "REAL4_DATA",
            Complex8 => "COMPLEX8_DATA",
            Obsolete => "OBSOLETE_DATA",
            Packed => "PACKED_DATA",
            UnsignedInt8 => "UNSIGNED_INT8_DATA",
            SignedInt32 => "SIGNED_INT32_DATA",
            Rgb => "RGB_DATA",
            SignedInt8 => "SIGNED_INT8_DATA",
            UnsignedInt16 => "UNSIGNED_INT16_DATA",
            UnsignedInt32 => "UNSIGNED_INT32_DATA",
            Real8 => "REAL8_DATA",
            Complex16 => "COMPLEX16_DATA",
            Binary => "BINARY_DATA",
            RgbUInt8_0 => "RGB_UINT8_0_DATA",
            RgbUInt8_1 => "RGB_UINT8_1_DATA",
            RgbUInt16 => "RGB_UINT16_DATA",
            RgbFloat32 => "RGB_FLOAT32_DATA",
            RgbFloat64 => "RGB_FLOAT64_DATA",
            RgbaUInt8_0 => "RGBA_UINT8_0_DATA",
            RgbaUInt8_1 => "RGBA_UINT8_1_DATA",
            RgbaUInt8_2 => "RGBA_UINT8_2_DATA",
            RgbaUInt8_3 => "RGBA_UINT8_3_DATA",
            RgbaUInt16 => "RGBA_UINT16_DATA",
            RgbaFloat32 => "RGBA_FLOAT32_DATA",
            RgbaFloat64 => "RGBA_FLOAT64_DATA",
            Point2SInt16_0 => "POINT2_SINT16_0_DATA",
            Point2SInt16_1 => "POINT2_SINT16_1_DATA",
            Point2SInt32_0 => "POINT2_SINT32_0_DATA",
            Point2Float32_0 => "POINT2_FLOAT32_0_DATA",
            RectSInt16_1 => "RECT_SINT16_1_DATA",
            RectSInt32_1 => "RECT_SINT32_1_DATA",
            RectFloat32_1 => "RECT_FLOAT32_1_DATA",
            RectFloat32_0 => "RECT_FLOAT32_0_DATA",
            SignedInt64 => "SIGNED_INT64_DATA",
            UnsignedInt64 => "UNSIGNED_INT64_DATA",
            Last => "LAST_DATA",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
