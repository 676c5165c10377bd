use thiserror::Error;

/// I/O errors that can occur when reading from a byte source
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// A read requested more bytes than remain in the source
    #[error("Truncated input: requested {requested} bytes at offset {offset}, only {available} available")]
    TruncatedInput {
        offset: u64,
        requested: u64,
        available: u64,
    },

    /// The underlying source failed while reading
    #[error("Read error on {identifier}: {message}")]
    Read { identifier: String, message: String },

    /// The file could not be opened
    #[error("Cannot open {path}: {message}")]
    Open { path: String, message: String },
}

/// Errors that abort parsing of a DM3 document.
///
/// Parsing is all-or-nothing: any of these conditions discards the whole
/// tag tree.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Header version or byte-order flag is not that of a DM3 file
    #[error("Not a DM3 file: version {version}, byte order flag {byte_order} (expected 3 and 1)")]
    NotADm3File { version: i32, byte_order: i32 },

    /// The `%%%%` marker before a data value is missing
    #[error("Bad tag delimiter at offset 0x{offset:x}: expected \"%%%%\", got {found:?}")]
    BadDelimiter { offset: u64, found: [u8; 4] },

    /// An encoded type code outside the known enumeration
    #[error("Unknown tag type {code} at offset 0x{offset:x}")]
    UnknownTagType { code: i32, offset: u64 },

    /// Struct declares more fields than the corruption guard allows
    #[error("Too many struct fields at offset 0x{offset:x}: {count}")]
    TooManyFields { count: u32, offset: u64 },

    /// STRING or text array bytes are not valid UTF-16LE
    #[error("Invalid UTF-16 text at offset 0x{offset:x} in {path}")]
    InvalidText { path: String, offset: u64 },

    /// Group or array nesting exceeds the configured bound
    #[error("Maximum nesting depth {max_depth} exceeded at {path}")]
    MaxDepthExceeded { max_depth: usize, path: String },
}

/// Errors that can occur when resolving image data, thumbnails or
/// calibration from a parsed document.
///
/// These never invalidate the tag store; a failed query can be retried or
/// another query issued on the same document.
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// I/O error while reading pixel data
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Required tag is missing from the tag store
    #[error("Missing required tag: {0}")]
    MissingTag(String),

    /// Tag exists but its value cannot be interpreted as needed
    #[error("Invalid value for {path}: {value}")]
    InvalidTagValue { path: String, value: String },

    /// Thumbnail dimensions disagree with its stored byte span
    #[error("Thumbnail size mismatch: dimensions give {expected} bytes, data block holds {actual}")]
    ThumbnailSizeMismatch { expected: u64, actual: u64 },

    /// Image dimensions and pixel depth disagree with the stored byte span
    #[error("Image size mismatch: dimensions give {expected} bytes, data block holds {actual}")]
    ImageSizeMismatch { expected: u64, actual: u64 },

    /// Image DataType has no decoder
    #[error("Unsupported image data type {code} ({name})")]
    UnsupportedDataType { code: i64, name: &'static str },

    /// Packed complex data needs a 2-D image with even sides
    #[error("Cannot unpack packed complex data of shape {width}x{height}x{depth}")]
    PackedShape {
        width: usize,
        height: usize,
        depth: usize,
    },

    /// Image has no pixels to derive contrast limits from
    #[error("Image contains no pixels")]
    EmptyImage,
}
