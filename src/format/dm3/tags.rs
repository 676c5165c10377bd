//! Tag values, paths and the flat tag store.
//!
//! The DM3 tag tree is flattened during parsing: every terminal value is
//! stored under its dot-joined path (`root.ImageList.1.ImageData.DataType`).
//! Well-known metadata is then resolved by looking up fixed paths.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;

// =============================================================================
// TagValue
// =============================================================================

/// A decoded terminal value of the tag tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Short(i16),
    Long(i32),
    UShort(u16),
    ULong(u32),
    Float(f32),
    Double(f64),
    Bool(bool),
    Char(u8),
    Octet(u8),
    /// UTF-16 text, from a STRING value or a short USHORT array
    String(String),
    Int64(i64),
    /// Synthetic values such as the `.Size` and `.Offset` of a binary block
    UInt64(u64),
}

impl TagValue {
    /// Integer view of the value.
    ///
    /// Integer variants convert directly; strings are parsed as decimal.
    /// Floats are not truncated here, use [`TagValue::as_f64`] for those.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            TagValue::Short(v) => Some(v as i64),
            TagValue::Long(v) => Some(v as i64),
            TagValue::UShort(v) => Some(v as i64),
            TagValue::ULong(v) => Some(v as i64),
            TagValue::Int64(v) => Some(v),
            TagValue::UInt64(v) => i64::try_from(v).ok(),
            TagValue::Char(v) | TagValue::Octet(v) => Some(v as i64),
            TagValue::Bool(v) => Some(v as i64),
            TagValue::String(ref s) => s.trim().parse().ok(),
            TagValue::Float(_) | TagValue::Double(_) => None,
        }
    }

    /// Non-negative integer view of the value.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            TagValue::UInt64(v) => Some(v),
            _ => self.as_i64().and_then(|v| u64::try_from(v).ok()),
        }
    }

    /// Floating point view of any numeric value; strings are parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            TagValue::Float(v) => Some(v as f64),
            TagValue::Double(v) => Some(v),
            TagValue::UInt64(v) => Some(v as f64),
            TagValue::String(ref s) => s.trim().parse().ok(),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    /// Text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Short(v) => write!(f, "{}", v),
            TagValue::Long(v) => write!(f, "{}", v),
            TagValue::UShort(v) => write!(f, "{}", v),
            TagValue::ULong(v) => write!(f, "{}", v),
            TagValue::Float(v) => write!(f, "{}", v),
            TagValue::Double(v) => write!(f, "{}", v),
            TagValue::Bool(v) => write!(f, "{}", v),
            TagValue::Char(v) | TagValue::Octet(v) => write!(f, "{}", *v as char),
            TagValue::String(s) => f.write_str(s),
            TagValue::Int64(v) => write!(f, "{}", v),
            TagValue::UInt64(v) => write!(f, "{}", v),
        }
    }
}

// =============================================================================
// TagPath
// =============================================================================

/// Name of the synthetic root group.
pub const ROOT_LABEL: &str = "root";

/// Ordered path segments from the root group down to a tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagPath {
    segments: Vec<String>,
}

impl TagPath {
    /// The path of the root group.
    pub fn root() -> Self {
        Self {
            segments: vec![ROOT_LABEL.to_string()],
        }
    }

    /// A new path one level below this one.
    pub fn child(&self, label: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(label.into());
        Self { segments }
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The flat lookup key: segments joined with `.`.
    pub fn key(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

// =============================================================================
// TagStore
// =============================================================================

/// Flat mapping from tag path to value, plus the ordered record of every
/// value as it was read.
///
/// Built once by the parser and read-only afterwards. If the same path is
/// written twice the later value wins in the map, while the record keeps both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagStore {
    values: HashMap<String, TagValue>,
    records: Vec<(String, TagValue)>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: String, value: TagValue) {
        self.records.push((key.clone(), value.clone()));
        self.values.insert(key, value);
    }

    /// Look up a tag by its flat path.
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Every stored value in file order.
    pub fn records(&self) -> &[(String, TagValue)] {
        &self.records
    }

    /// Records whose path starts with `prefix`, in file order.
    pub fn records_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a (String, TagValue)> + 'a {
        self.records
            .iter()
            .filter(move |(key, _)| key.starts_with(prefix))
    }

    /// Write one `path = value` line per record, in file order.
    pub fn write_dump<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for (key, value) in &self.records {
            writeln!(writer, "{} = {}", key, value)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
