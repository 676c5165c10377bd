use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;

use crate::error::IoError;

/// Trait for reading byte ranges from a seekable resource.
///
/// This abstraction lets the DM3 parser and image materializer work the same
/// way over local files and in-memory buffers. One source has one read
/// position, so reads take `&mut self`.
pub trait ByteSource {
    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// Returns `TruncatedInput` if the range extends past the end of the
    /// resource, or `Read` if the underlying read fails.
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), IoError>;

    /// Get the total size of the resource in bytes.
    fn size(&self) -> u64;

    /// Get a human-readable identifier for this resource (for logging and errors).
    fn identifier(&self) -> &str;

    /// Read exactly `len` bytes starting at `offset` into a new buffer.
    fn read_bytes_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        // Reject before allocating; lengths come from untrusted input.
        check_range(offset, len as u64, self.size())?;
        let mut buf = vec![0u8; len];
        self.read_exact_at(offset, &mut buf)?;
        Ok(Bytes::from(buf))
    }
}

/// Check that `len` bytes at `offset` lie inside a resource of `size` bytes.
pub(crate) fn check_range(offset: u64, len: u64, size: u64) -> Result<(), IoError> {
    let end = offset.checked_add(len);
    match end {
        Some(end) if end <= size => Ok(()),
        _ => Err(IoError::TruncatedInput {
            offset,
            requested: len,
            available: size.saturating_sub(offset),
        }),
    }
}

// =============================================================================
// FileSource
// =============================================================================

/// A buffered local file.
///
/// Sequential reads (the tag tree pass) are served from the buffer; a read
/// at a different offset seeks relative to the current position so nearby
/// jumps keep the buffer.
pub struct FileSource {
    reader: BufReader<File>,
    /// Current position of `reader`, `None` after a failed read.
    position: Option<u64>,
    size: u64,
    identifier: String,
}

impl FileSource {
    /// Open a file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let identifier = path.display().to_string();

        let file = File::open(path).map_err(|e| IoError::Open {
            path: identifier.clone(),
            message: e.to_string(),
        })?;
        let size = file
            .metadata()
            .map_err(|e| IoError::Open {
                path: identifier.clone(),
                message: e.to_string(),
            })?
            .len();

        Ok(Self {
            reader: BufReader::new(file),
            position: Some(0),
            size,
            identifier,
        })
    }

    fn read_error(&self, e: std::io::Error) -> IoError {
        IoError::Read {
            identifier: self.identifier.clone(),
            message: e.to_string(),
        }
    }
}

impl ByteSource for FileSource {
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), IoError> {
        check_range(offset, buf.len() as u64, self.size)?;

        match self.position {
            Some(current) if current == offset => {}
            Some(current) => {
                let delta = offset as i64 - current as i64;
                if let Err(e) = self.reader.seek_relative(delta) {
                    self.position = None;
                    return Err(self.read_error(e));
                }
            }
            None => {
                if let Err(e) = self.reader.seek(SeekFrom::Start(offset)) {
                    return Err(self.read_error(e));
                }
            }
        }

        if let Err(e) = self.reader.read_exact(buf) {
            self.position = None;
            return Err(self.read_error(e));
        }

        self.position = Some(offset + buf.len() as u64);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// MemorySource
// =============================================================================

/// An in-memory buffer, used for embedded data and tests.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
    identifier: String,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::with_identifier(data, "<memory>")
    }

    pub fn with_identifier(data: impl Into<Bytes>, identifier: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            identifier: identifier.into(),
        }
    }
}

impl ByteSource for MemorySource {
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), IoError> {
        check_range(offset, buf.len() as u64, self.size())?;
        let start = offset as usize;
        buf.copy_from_slice(&self.data[start..start + buf.len()]);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    // Zero-copy: hand out a view of the shared buffer.
    fn read_bytes_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        check_range(offset, len as u64, self.size())?;
        let start = offset as usize;
        Ok(self.data.slice(start..start + len))
    }
}
