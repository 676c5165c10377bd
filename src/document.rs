//! Parsed DM3 document.
//!
//! [`Dm3Document`] owns the byte source and the tag store built from it.
//! Metadata queries only consult the store; image and thumbnail queries
//! validate their layout from the store first and then read exactly the
//! stored span from the source.
//!
//! # Example
//!
//! ```rust,no_run
//! use dm3_reader::Dm3Document;
//!
//! let mut doc = Dm3Document::open("sample.dm3")?;
//! let image = doc.image()?;
//! println!("{:?} {}", image.shape(), image.data_type.name());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::Write;
use std::path::Path;

use bytes::Bytes;
use ndarray::Array2;
use tracing::debug;

use crate::error::{ImageError, ParseError};
use crate::format::{parse_tag_tree, Dm3Header, ParseOptions, TagStore, TagValue};
use crate::image::{
    brightness_units, decode_image, decode_thumbnail, AxisCalibration, DataType, Image,
    ImageLayout, ThumbnailLayout, IMAGE_DATA, THUMBNAIL_DATA,
};
use crate::io::{ByteSource, FileSource, MemorySource};
use crate::metadata::{stored_limits, ContrastLimits, Dm3Info};

/// A DM3 file with its complete tag tree.
pub struct Dm3Document<S: ByteSource = FileSource> {
    source: S,
    header: Dm3Header,
    tags: TagStore,
}

impl Dm3Document<FileSource> {
    /// Open and parse a file with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        Self::open_with(path, ParseOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: ParseOptions) -> Result<Self, ParseError> {
        let source = FileSource::open(path)?;
        Self::from_source(source, options)
    }
}

impl Dm3Document<MemorySource> {
    /// Parse an in-memory DM3 image with default options.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self, ParseError> {
        Self::from_source(MemorySource::new(data), ParseOptions::default())
    }
}

impl<S: ByteSource> Dm3Document<S> {
    /// Parse the tag tree of an arbitrary byte source.
    pub fn from_source(mut source: S, options: ParseOptions) -> Result<Self, ParseError> {
        let (header, tags) = parse_tag_tree(&mut source, options)?;

        debug!(
            identifier = source.identifier(),
            version = header.version,
            declared_size = header.declared_size,
            tag_count = tags.len(),
            "Parsed DM3 tag tree"
        );

        Ok(Self {
            source,
            header,
            tags,
        })
    }

    // -------------------------------------------------------------------------
    // Tags
    // -------------------------------------------------------------------------

    pub fn header(&self) -> &Dm3Header {
        &self.header
    }

    pub fn identifier(&self) -> &str {
        self.source.identifier()
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    /// Look up one tag by its dot-joined path.
    pub fn tag(&self, path: &str) -> Option<&TagValue> {
        self.tags.get(path)
    }

    /// Write the ordered `path = value` record of every tag.
    pub fn write_tag_dump<W: Write>(&self, writer: W) -> std::io::Result<()> {
        self.tags.write_dump(writer)
    }

    // -------------------------------------------------------------------------
    // Metadata
    // -------------------------------------------------------------------------

    pub fn info(&self) -> Dm3Info {
        Dm3Info::from_tags(&self.tags)
    }

    /// Raw `DataType` code of the main image, `-1` when the tag is absent
    /// or not an integer.
    pub fn data_type_code(&self) -> i64 {
        self.tags
            .get(&format!("{}.DataType", IMAGE_DATA))
            .and_then(TagValue::as_i64)
            .unwrap_or(-1)
    }

    pub fn data_type(&self) -> Option<DataType> {
        DataType::from_code(self.data_type_code())
    }

    /// Calibration of image axis `index` (0 is the width axis).
    pub fn axis_units(&self, index: usize) -> Result<AxisCalibration, ImageError> {
        AxisCalibration::from_tags(&self.tags, index)
    }

    /// Calibration of the first axis.
    pub fn pixel_size(&self) -> Result<AxisCalibration, ImageError> {
        self.axis_units(0)
    }

    pub fn brightness_units(&self) -> Result<String, ImageError> {
        brightness_units(&self.tags)
    }

    // -------------------------------------------------------------------------
    // Pixel data
    // -------------------------------------------------------------------------

    fn read_span(&mut self, offset: u64, size: u64, size_tag: &str) -> Result<Bytes, ImageError> {
        let len = usize::try_from(size).map_err(|_| ImageError::InvalidTagValue {
            path: size_tag.to_string(),
            value: size.to_string(),
        })?;
        Ok(self.source.read_bytes_at(offset, len)?)
    }

    /// Layout of the main image, validated against its stored span.
    pub fn image_layout(&self) -> Result<ImageLayout, ImageError> {
        let layout = ImageLayout::from_tags(&self.tags)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Read and decode the embedded thumbnail.
    pub fn thumbnail(&mut self) -> Result<Array2<i16>, ImageError> {
        let layout = ThumbnailLayout::from_tags(&self.tags)?;
        layout.validate()?;

        debug!(
            offset = layout.offset,
            width = layout.width,
            height = layout.height,
            "Reading thumbnail"
        );

        let bytes = self.read_span(
            layout.offset,
            layout.size,
            &format!("{}.Data.Size", THUMBNAIL_DATA),
        )?;
        decode_thumbnail(&layout, &bytes)
    }

    /// Read and decode the main image.
    ///
    /// The layout is checked before anything is read, so a size mismatch or
    /// unsupported data type never touches the source. Axes without stored
    /// calibration get the identity calibration.
    pub fn image(&mut self) -> Result<Image, ImageError> {
        let layout = ImageLayout::from_tags(&self.tags)?;
        let data_type = layout.validate()?;

        debug!(
            offset = layout.offset,
            size = layout.size,
            data_type = data_type.name(),
            shape = ?layout.shape(),
            "Reading image data"
        );

        let bytes = self.read_span(
            layout.offset,
            layout.size,
            &format!("{}.Data.Size", IMAGE_DATA),
        )?;
        let data = decode_image(&layout, &bytes)?;

        let calibrations = (0..data.ndim())
            .map(|axis| match AxisCalibration::from_tags(&self.tags, axis) {
                Err(ImageError::MissingTag(_)) => Ok(AxisCalibration::uncalibrated()),
                other => other,
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Image {
            data_type,
            data,
            calibrations,
        })
    }

    /// Display range of the main image.
    ///
    /// Stored limits are used when present; the image is only read when a
    /// limit has to fall back to the pixel range.
    pub fn cuts(&mut self) -> Result<ContrastLimits, ImageError> {
        let (low, high) = stored_limits(&self.tags)?;
        if low.is_some() && high.is_some() {
            return ContrastLimits::resolve(low, high, None);
        }
        let image = self.image()?;
        ContrastLimits::resolve(low, high, Some(&image.data))
    }
}

impl<S: ByteSource> std::fmt::Debug for Dm3Document<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dm3Document")
            .field("identifier", &self.source.identifier())
            .field("header", &self.header)
            .field("tag_count", &self.tags.len())
            .finish()
    }
}
