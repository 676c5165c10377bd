//! Test utilities for integration tests.
//!
//! This module provides a read-counting byte source and builders for
//! synthetic DM3 files. Structural fields (counts, lengths, type codes) are
//! written big-endian and values little-endian, as in files written by
//! DigitalMicrograph.

use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dm3_reader::error::IoError;
use dm3_reader::io::{ByteSource, MemorySource};

// =============================================================================
// Byte Source with Read Tracking
// =============================================================================

/// An in-memory source that counts every read.
///
/// Clones share the counter, so a clone kept by the test observes reads made
/// through a source moved into a document.
#[derive(Clone)]
pub struct CountingSource {
    inner: MemorySource,
    reads: Arc<AtomicUsize>,
}

impl CountingSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            inner: MemorySource::with_identifier(data, "counting://test.dm3"),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ByteSource for CountingSource {
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), IoError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_exact_at(offset, buf)
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn identifier(&self) -> &str {
        self.inner.identifier()
    }

    fn read_bytes_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_bytes_at(offset, len)
    }
}

// =============================================================================
// Encoded Types
// =============================================================================

pub const GROUP_ENTRY: u8 = 20;
pub const DATA_ENTRY: u8 = 21;

pub const SHORT: i32 = 2;
pub const LONG: i32 = 3;
pub const USHORT: i32 = 4;
pub const ULONG: i32 = 5;
pub const FLOAT: i32 = 6;
pub const DOUBLE: i32 = 7;
pub const BOOLEAN: i32 = 8;
pub const CHAR: i32 = 9;
pub const OCTET: i32 = 10;
pub const STRUCT: i32 = 15;
pub const STRING: i32 = 18;
pub const ARRAY: i32 = 20;

/// Byte width of a scalar type code.
pub fn scalar_width(code: i32) -> usize {
    match code {
        SHORT | USHORT => 2,
        LONG | ULONG | FLOAT => 4,
        DOUBLE => 8,
        BOOLEAN | CHAR | OCTET => 1,
        other => panic!("not a scalar type: {}", other),
    }
}

/// A scalar tag value to encode.
#[derive(Debug, Clone, Copy)]
pub enum Scalar {
    Short(i16),
    Long(i32),
    UShort(u16),
    ULong(u32),
    Float(f32),
    Double(f64),
    Bool(bool),
    Char(u8),
    Octet(u8),
}

impl Scalar {
    pub fn type_code(&self) -> i32 {
        match self {
            Scalar::Short(_) => SHORT,
            Scalar::Long(_) => LONG,
            Scalar::UShort(_) => USHORT,
            Scalar::ULong(_) => ULONG,
            Scalar::Float(_) => FLOAT,
            Scalar::Double(_) => DOUBLE,
            Scalar::Bool(_) => BOOLEAN,
            Scalar::Char(_) => CHAR,
            Scalar::Octet(_) => OCTET,
        }
    }

    pub fn le_bytes(&self) -> Vec<u8> {
        match *self {
            Scalar::Short(v) => v.to_le_bytes().to_vec(),
            Scalar::Long(v) => v.to_le_bytes().to_vec(),
            Scalar::UShort(v) => v.to_le_bytes().to_vec(),
            Scalar::ULong(v) => v.to_le_bytes().to_vec(),
            Scalar::Float(v) => v.to_le_bytes().to_vec(),
            Scalar::Double(v) => v.to_le_bytes().to_vec(),
            Scalar::Bool(v) => vec![v as u8],
            Scalar::Char(v) | Scalar::Octet(v) => vec![v],
        }
    }
}

fn utf16_le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

// =============================================================================
// Group Builder
// =============================================================================

/// Builder for one tag group.
///
/// Entries are encoded as they are added. An empty label produces an
/// unlabeled entry, which readers name by its index in the group.
#[derive(Debug, Clone, Default)]
pub struct GroupBuilder {
    entries: Vec<Vec<u8>>,
}

impl GroupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_entry(&mut self, kind: u8, label: &str, body: &[u8]) {
        let mut bytes = vec![kind];
        bytes.extend_from_slice(&(label.len() as u16).to_be_bytes());
        bytes.extend_from_slice(label.as_bytes());
        bytes.extend_from_slice(body);
        self.entries.push(bytes);
    }

    /// Add a data entry from raw type descriptors and value bytes.
    pub fn raw_data(mut self, label: &str, descriptors: &[i32], values: &[u8]) -> Self {
        let mut body = b"%%%%".to_vec();
        body.extend_from_slice(&(descriptors.len() as u32).to_be_bytes());
        for descriptor in descriptors {
            body.extend_from_slice(&descriptor.to_be_bytes());
        }
        body.extend_from_slice(values);
        self.push_entry(DATA_ENTRY, label, &body);
        self
    }

    pub fn group(mut self, label: &str, child: GroupBuilder) -> Self {
        let body = child.encode();
        self.push_entry(GROUP_ENTRY, label, &body);
        self
    }

    pub fn scalar(self, label: &str, value: Scalar) -> Self {
        self.raw_data(label, &[value.type_code()], &value.le_bytes())
    }

    /// A STRING value: byte length, then UTF-16LE text.
    pub fn string(self, label: &str, text: &str) -> Self {
        let units = utf16_le(text);
        let mut values = (units.len() as i32).to_be_bytes().to_vec();
        values.extend_from_slice(&units);
        self.raw_data(label, &[STRING], &values)
    }

    /// A USHORT array holding UTF-16LE text, the usual encoding of labels
    /// and units.
    pub fn text_array(self, label: &str, text: &str) -> Self {
        let units = utf16_le(text);
        self.array(label, USHORT, &units)
    }

    /// An array of scalar `element_type` items with the given payload.
    pub fn array(self, label: &str, element_type: i32, payload: &[u8]) -> Self {
        let count = (payload.len() / scalar_width(element_type)) as u32;
        let mut values = count.to_be_bytes().to_vec();
        values.extend_from_slice(payload);
        self.raw_data(label, &[ARRAY, element_type], &values)
    }

    /// A struct value: zero name length, field count, then per field a zero
    /// name length and its type, followed by the field values.
    pub fn structure(self, label: &str, fields: &[Scalar]) -> Self {
        let mut descriptors = vec![STRUCT, 0, fields.len() as i32];
        for field in fields {
            descriptors.push(0);
            descriptors.push(field.type_code());
        }
        let values: Vec<u8> = fields.iter().flat_map(|f| f.le_bytes()).collect();
        self.raw_data(label, &descriptors, &values)
    }

    /// Encoded group: sorted and open flags, entry count, entries.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = vec![0u8, 0u8];
        bytes.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        for entry in &self.entries {
            bytes.extend_from_slice(entry);
        }
        bytes
    }
}

/// Encode a complete file: 12-byte header followed by the root group.
pub fn dm3_file(root: &GroupBuilder) -> Vec<u8> {
    let body = root.encode();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&3i32.to_be_bytes());
    bytes.extend_from_slice(&((body.len() + 12) as i32).to_be_bytes());
    bytes.extend_from_slice(&1i32.to_be_bytes());
    bytes.extend_from_slice(&body);
    bytes
}

// =============================================================================
// Image Builders
// =============================================================================

/// An `ImageData` group with a pixel array and its describing tags.
pub fn image_data(
    data_type: i32,
    pixel_depth: u32,
    dimensions: &[u32],
    element_type: i32,
    payload: &[u8],
) -> GroupBuilder {
    let dims = dimensions
        .iter()
        .fold(GroupBuilder::new(), |group, &d| group.scalar("", Scalar::ULong(d)));
    GroupBuilder::new()
        .array("Data", element_type, payload)
        .scalar("DataType", Scalar::Long(data_type))
        .scalar("PixelDepth", Scalar::ULong(pixel_depth))
        .group("Dimensions", dims)
}

/// A `Calibrations` group with one `(origin, scale, units)` per axis.
pub fn calibrations(axes: &[(f32, f32, &str)], brightness: Option<&str>) -> GroupBuilder {
    let dimension = axes
        .iter()
        .fold(GroupBuilder::new(), |group, &(origin, scale, units)| {
            group.group(
                "",
                GroupBuilder::new()
                    .scalar("Origin", Scalar::Float(origin))
                    .scalar("Scale", Scalar::Float(scale))
                    .text_array("Units", units),
            )
        });
    let mut group = GroupBuilder::new().group("Dimension", dimension);
    if let Some(units) = brightness {
        group = group.group("Brightness", GroupBuilder::new().text_array("Units", units));
    }
    group
}

/// A 2x2 thumbnail entry whose pixels are 32-bit words.
pub fn thumbnail_entry(pixels: [u32; 4]) -> GroupBuilder {
    let payload: Vec<u8> = pixels.iter().flat_map(|p| p.to_le_bytes()).collect();
    GroupBuilder::new().group("ImageData", image_data(23, 4, &[2, 2], ULONG, &payload))
}

/// Root group holding an `ImageList` of the given entries, thumbnail first.
pub fn document(entries: Vec<GroupBuilder>) -> GroupBuilder {
    let list = entries
        .into_iter()
        .fold(GroupBuilder::new(), |group, entry| group.group("", entry));
    GroupBuilder::new().group("ImageList", list)
}

pub fn f32_le(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn i16_le(values: &[i16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}
