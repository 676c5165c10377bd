//! Sequential binary reader over a [`ByteSource`].
//!
//! DM3 mixes byte orders: the file header and the structural fields of the
//! tag tree are big-endian, while the data values are little-endian. Every
//! read therefore names its byte order at the call site.

use bytes::Bytes;

use crate::error::IoError;

use super::byte_source::{check_range, ByteSource};

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

/// Fixed-width numeric types that can be decoded from raw bytes.
pub trait Primitive: Sized + Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Decode a value from the first `WIDTH` bytes of `bytes`.
    ///
    /// # Panics
    /// Panics if the slice has fewer than `WIDTH` bytes.
    fn from_bytes(bytes: &[u8], order: ByteOrder) -> Self;
}

macro_rules! impl_primitive {
    ($($t:ty => $n:expr),* $(,)?) => {
        $(
            impl Primitive for $t {
                const WIDTH: usize = $n;

                #[inline]
                fn from_bytes(bytes: &[u8], order: ByteOrder) -> Self {
                    let mut raw = [0u8; $n];
                    raw.copy_from_slice(&bytes[..$n]);
                    match order {
                        ByteOrder::LittleEndian => <$t>::from_le_bytes(raw),
                        ByteOrder::BigEndian => <$t>::from_be_bytes(raw),
                    }
                }
            }
        )*
    };
}

impl_primitive! {
    i8 => 1, u8 => 1,
    i16 => 2, u16 => 2,
    i32 => 4, u32 => 4,
    i64 => 8, u64 => 8,
    f32 => 4, f64 => 8,
}

/// Decode a packed run of values.
///
/// Trailing bytes that do not fill a whole value are ignored.
pub fn decode_slice<T: Primitive>(bytes: &[u8], order: ByteOrder) -> Vec<T> {
    bytes
        .chunks_exact(T::WIDTH)
        .map(|chunk| T::from_bytes(chunk, order))
        .collect()
}

// =============================================================================
// Cursor
// =============================================================================

/// Reads primitives sequentially from a byte source, tracking the absolute
/// offset of the next byte.
pub struct Cursor<'a, S: ByteSource + ?Sized> {
    source: &'a mut S,
    position: u64,
}

impl<'a, S: ByteSource + ?Sized> Cursor<'a, S> {
    /// Create a cursor positioned at the start of the source.
    pub fn new(source: &'a mut S) -> Self {
        Self::at(source, 0)
    }

    /// Create a cursor positioned at `offset`.
    pub fn at(source: &'a mut S, offset: u64) -> Self {
        Self {
            source,
            position: offset,
        }
    }

    /// Absolute offset of the next byte to be read.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total size of the underlying source.
    #[inline]
    pub fn size(&self) -> u64 {
        self.source.size()
    }

    /// Move to an absolute offset. Seeking to the very end is allowed.
    pub fn seek(&mut self, offset: u64) -> Result<(), IoError> {
        check_range(offset, 0, self.source.size())?;
        self.position = offset;
        Ok(())
    }

    /// Advance past `len` bytes without reading them.
    pub fn skip(&mut self, len: u64) -> Result<(), IoError> {
        check_range(self.position, len, self.source.size())?;
        self.position += len;
        Ok(())
    }

    /// Fill `buf` from the current position.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<(), IoError> {
        self.source.read_exact_at(self.position, buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }

    /// Read a fixed number of raw bytes.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], IoError> {
        let mut buf = [0u8; N];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    /// Read `len` raw bytes; the caller decodes them.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes, IoError> {
        let bytes = self.source.read_bytes_at(self.position, len)?;
        self.position += len as u64;
        Ok(bytes)
    }

    /// Read one primitive value in the given byte order.
    pub fn read<T: Primitive>(&mut self, order: ByteOrder) -> Result<T, IoError> {
        let mut buf = [0u8; 8];
        let buf = &mut buf[..T::WIDTH];
        self.read_into(buf)?;
        Ok(T::from_bytes(buf, order))
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, IoError> {
        self.read(ByteOrder::BigEndian)
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, IoError> {
        self.read(ByteOrder::BigEndian)
    }

    #[inline]
    pub fn read_u16(&mut self, order: ByteOrder) -> Result<u16, IoError> {
        self.read(order)
    }

    #[inline]
    pub fn read_i16(&mut self, order: ByteOrder) -> Result<i16, IoError> {
        self.read(order)
    }

    #[inline]
    pub fn read_u32(&mut self, order: ByteOrder) -> Result<u32, IoError> {
        self.read(order)
    }

    #[inline]
    pub fn read_i32(&mut self, order: ByteOrder) -> Result<i32, IoError> {
        self.read(order)
    }

    #[inline]
    pub fn read_i64(&mut self, order: ByteOrder) -> Result<i64, IoError> {
        self.read(order)
    }

    #[inline]
    pub fn read_f32(&mut self, order: ByteOrder) -> Result<f32, IoError> {
        self.read(order)
    }

    #[inline]
    pub fn read_f64(&mut self, order: ByteOrder) -> Result<f64, IoError> {
        self.read(order)
    }

    /// Read one byte as a boolean (any nonzero value is true).
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, IoError> {
        Ok(self.read_u8()? != 0)
    }
}

// =============================================================================
// Tests
// =============================================================================
