//! # DM3 Reader
//!
//! A reader for GATAN DigitalMicrograph 3 (`.dm3`) files, the container used
//! by electron microscopes to store images, spectra and acquisition metadata.
//!
//! This library parses the file's hierarchical tag tree into a flat store
//! of dot-separated paths, resolves well-known metadata from that store,
//! and materializes the embedded image and thumbnail as typed
//! [`ndarray`] arrays.
//!
//! ## Features
//!
//! - **Single pass parsing**: The tag tree is read once; large binary blocks are recorded by offset and size and skipped
//! - **Lazy pixel access**: Image data is only read when requested, after its layout has been validated
//! - **Typed arrays**: Integer, float, complex, packed FFT and binary images decode to the matching element type
//! - **Calibration**: Per-axis origin, scale and unit, plus intensity units and display limits
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`io`] - Byte sources (files, memory) and a cursor for typed reads
//! - [`mod@format`] - DM3 header and tag tree parser
//! - [`image`] - Pixel layout validation, decoding and calibration
//! - [`metadata`] - Acquisition info and contrast limits
//! - [`document`] - The [`Dm3Document`] tying parser and decoders together
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use dm3_reader::Dm3Document;
//!
//! let mut doc = Dm3Document::open("sample.dm3")?;
//!
//! for (key, value) in doc.info().iter() {
//!     println!("{}: {}", key, value);
//! }
//!
//! let image = doc.image()?;
//! let pixel = doc.pixel_size()?;
//! println!("{:?} pixels of {} {}", image.shape(), pixel.scale, pixel.unit);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod image;
pub mod io;
pub mod metadata;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, InfoConfig, OutputFormat, ReaderArgs, TagsConfig};
pub use document::Dm3Document;
pub use error::{ImageError, IoError, ParseError};
pub use format::dm3::{
    Dm3Header, EncodedType, ParseOptions, TagPath, TagStore, TagValue, DEFAULT_MAX_DEPTH,
};
pub use image::{
    unpack_packed_complex, AxisCalibration, DataType, Image, ImageData, ImageLayout,
    ThumbnailLayout,
};
pub use io::{ByteOrder, ByteSource, FileSource, MemorySource};
pub use metadata::{ContrastLimits, Dm3Info};
