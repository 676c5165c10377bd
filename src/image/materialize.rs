//! Pixel block layout and decoding.
//!
//! Decoding is split in two so callers can validate before touching the
//! byte source: a layout is resolved from tags and checked against the
//! stored span, then the span is read and handed to [`decode_image`] or
//! [`decode_thumbnail`].

use ndarray::{Array2, ArrayD, IxDyn};
use num_complex::{Complex32, Complex64};

use super::data_type::DataType;
use super::lookup::{optional_u64, require_i64, require_u64, to_usize};
use super::packed::unpack_packed_complex;
use super::ImageData;
use crate::error::ImageError;
use crate::format::TagStore;
use crate::io::{decode_slice, ByteOrder, Primitive};

/// Tag group of the main image.
pub const IMAGE_DATA: &str = "root.ImageList.1.ImageData";

/// Tag group of the embedded thumbnail.
pub const THUMBNAIL_DATA: &str = "root.ImageList.0.ImageData";

/// Bytes per thumbnail pixel.
const THUMBNAIL_PIXEL_BYTES: u64 = 4;

fn checked_product(factors: &[u64]) -> Option<u64> {
    factors.iter().try_fold(1u64, |acc, &f| acc.checked_mul(f))
}

/// Optional dimension, 1 when absent.
fn dimension(store: &TagStore, key: &str) -> Result<usize, ImageError> {
    match optional_u64(store, key)? {
        Some(value) => to_usize(key, value),
        None => Ok(1),
    }
}

// =============================================================================
// ImageLayout
// =============================================================================

/// Location, type and dimensions of the main image's pixel block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLayout {
    /// Absolute file offset of the first pixel byte
    pub offset: u64,
    /// Length of the pixel block in bytes
    pub size: u64,
    pub data_type_code: i64,
    /// Declared bytes per pixel
    pub pixel_depth: u64,
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl ImageLayout {
    /// Resolve the layout from the tag store.
    ///
    /// Offset, size, data type, pixel depth and the first dimension are
    /// required; height and depth default to 1.
    pub fn from_tags(store: &TagStore) -> Result<Self, ImageError> {
        let key = |suffix: &str| format!("{}.{}", IMAGE_DATA, suffix);

        let offset = require_u64(store, &key("Data.Offset"))?;
        let size = require_u64(store, &key("Data.Size"))?;
        let data_type_code = require_i64(store, &key("DataType"))?;
        let pixel_depth = require_u64(store, &key("PixelDepth"))?;
        let width_key = key("Dimensions.0");
        let width = to_usize(&width_key, require_u64(store, &width_key)?)?;
        let height = dimension(store, &key("Dimensions.1"))?;
        let depth = dimension(store, &key("Dimensions.2"))?;

        Ok(Self {
            offset,
            size,
            data_type_code,
            pixel_depth,
            width,
            height,
            depth,
        })
    }

    /// Array shape of the decoded image.
    ///
    /// Trailing dimensions of size 1 are dropped: a volume is `[w, h, d]`,
    /// an image `[w, h]` and a spectrum `[w]`.
    pub fn shape(&self) -> Vec<usize> {
        if self.depth > 1 {
            vec![self.width, self.height, self.depth]
        } else if self.height > 1 {
            vec![self.width, self.height]
        } else {
            vec![self.width]
        }
    }

    fn pixel_count(&self) -> Result<u64, ImageError> {
        checked_product(&[self.width as u64, self.height as u64, self.depth as u64]).ok_or_else(
            || ImageError::InvalidTagValue {
                path: format!("{}.Dimensions", IMAGE_DATA),
                value: format!("{}x{}x{}", self.width, self.height, self.depth),
            },
        )
    }

    /// Check the layout against the stored span and resolve the data type.
    ///
    /// Nothing is read. The span must equal `pixel_depth * w * h * d` and
    /// also match the element count of the data type's decoder.
    pub fn validate(&self) -> Result<DataType, ImageError> {
        let pixels = self.pixel_count()?;
        let declared = pixels.checked_mul(self.pixel_depth);
        if declared != Some(self.size) {
            return Err(ImageError::ImageSizeMismatch {
                expected: declared.unwrap_or(u64::MAX),
                actual: self.size,
            });
        }

        let data_type = DataType::from_code(self.data_type_code);
        let (data_type, element) =
            match data_type.and_then(|t| t.raw_element().map(|(element, _)| (t, element))) {
                Some(resolved) => resolved,
                None => {
                    return Err(ImageError::UnsupportedDataType {
                        code: self.data_type_code,
                        name: data_type.map_or("UNKNOWN_DATA", DataType::name),
                    })
                }
            };

        let values = if data_type.is_complex_pairs() {
            pixels.checked_mul(2)
        } else {
            Some(pixels)
        };
        let raw = values.and_then(|v| v.checked_mul(element.width()));
        if raw != Some(self.size) {
            return Err(ImageError::ImageSizeMismatch {
                expected: raw.unwrap_or(u64::MAX),
                actual: self.size,
            });
        }

        if data_type == DataType::Packed && self.depth > 1 {
            return Err(ImageError::PackedShape {
                width: self.width,
                height: self.height,
                depth: self.depth,
            });
        }

        Ok(data_type)
    }
}

// =============================================================================
// Image Decoding
// =============================================================================

fn reshape<T>(shape: &[usize], values: Vec<T>) -> Result<ArrayD<T>, ImageError> {
    let actual = values.len() as u64;
    ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|_| ImageError::ImageSizeMismatch {
        expected: shape.iter().product::<usize>() as u64,
        actual,
    })
}

fn pair_up<T: Copy, C>(values: &[T], make: impl Fn(T, T) -> C) -> Vec<C> {
    values.chunks_exact(2).map(|p| make(p[0], p[1])).collect()
}

/// Decode the main image's pixel block.
///
/// `bytes` must be exactly the `size` bytes at `layout.offset`.
pub fn decode_image(layout: &ImageLayout, bytes: &[u8]) -> Result<ImageData, ImageError> {
    let data_type = layout.validate()?;
    if bytes.len() as u64 != layout.size {
        return Err(ImageError::ImageSizeMismatch {
            expected: layout.size,
            actual: bytes.len() as u64,
        });
    }

    let order = data_type
        .raw_element()
        .map_or(ByteOrder::LittleEndian, |(_, order)| order);
    let shape = layout.shape();

    fn values<T: Primitive>(bytes: &[u8], order: ByteOrder) -> Vec<T> {
        decode_slice(bytes, order)
    }

    let data = match data_type {
        DataType::SignedInt16 => ImageData::Int16(reshape(&shape, values(bytes, order))?),
        DataType::Real4 if layout.depth > 1 => {
            // Stored slice-major; present as [x, y, z] like every other type
            let (w, h, d) = (layout.width, layout.height, layout.depth);
            let volume = reshape(&[d, h, w], values::<f32>(bytes, order))?;
            ImageData::Float32(volume.reversed_axes().as_standard_layout().into_owned())
        }
        DataType::Real4 => ImageData::Float32(reshape(&shape, values(bytes, order))?),
        DataType::Complex8 => {
            let reals = values::<f32>(bytes, order);
            ImageData::Complex32(reshape(&shape, pair_up(&reals, Complex32::new))?)
        }
        DataType::Complex16 => {
            let reals = values::<f64>(bytes, order);
            ImageData::Complex64(reshape(&shape, pair_up(&reals, Complex64::new))?)
        }
        DataType::Packed => {
            let packed = Array2::from_shape_vec(
                (layout.width, layout.height),
                values::<f32>(bytes, order),
            )
            .map_err(|_| ImageError::PackedShape {
                width: layout.width,
                height: layout.height,
                depth: layout.depth,
            })?;
            ImageData::Complex32(unpack_packed_complex(&packed)?.into_dyn())
        }
        DataType::UnsignedInt8 => ImageData::UInt8(reshape(&shape, bytes.to_vec())?),
        DataType::SignedInt8 => ImageData::Int8(reshape(&shape, values(bytes, order))?),
        DataType::SignedInt32 => ImageData::Int32(reshape(&shape, values(bytes, order))?),
        DataType::UnsignedInt16 => ImageData::UInt16(reshape(&shape, values(bytes, order))?),
        DataType::UnsignedInt32 => ImageData::UInt32(reshape(&shape, values(bytes, order))?),
        DataType::Real8 => ImageData::Float64(reshape(&shape, values(bytes, order))?),
        DataType::Binary => {
            ImageData::Binary(reshape(&shape, bytes.iter().map(|&b| b > 0).collect())?)
        }
        other => {
            return Err(ImageError::UnsupportedDataType {
                code: other.code(),
                name: other.name(),
            })
        }
    };

    Ok(data)
}

// =============================================================================
// Thumbnail
// =============================================================================

/// Location and dimensions of the embedded thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailLayout {
    pub offset: u64,
    pub size: u64,
    pub width: usize,
    pub height: usize,
}

impl ThumbnailLayout {
    /// Resolve the thumbnail layout; all four tags are required.
    pub fn from_tags(store: &TagStore) -> Result<Self, ImageError> {
        let key = |suffix: &str| format!("{}.{}", THUMBNAIL_DATA, suffix);

        let size = require_u64(store, &key("Data.Size"))?;
        let offset = require_u64(store, &key("Data.Offset"))?;
        let width_key = key("Dimensions.0");
        let width = to_usize(&width_key, require_u64(store, &width_key)?)?;
        let height_key = key("Dimensions.1");
        let height = to_usize(&height_key, require_u64(store, &height_key)?)?;

        Ok(Self {
            offset,
            size,
            width,
            height,
        })
    }

    /// Each 4-byte pixel decodes to two 16-bit words, doubling the second
    /// axis.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, 2 * self.height)
    }

    /// Require `width * height * 4 == size`.
    pub fn validate(&self) -> Result<(), ImageError> {
        let expected =
            checked_product(&[self.width as u64, self.height as u64, THUMBNAIL_PIXEL_BYTES]);
        if expected != Some(self.size) {
            return Err(ImageError::ThumbnailSizeMismatch {
                expected: expected.unwrap_or(u64::MAX),
                actual: self.size,
            });
        }
        Ok(())
    }
}

/// Decode the thumbnail block as little-endian `i16` words.
pub fn decode_thumbnail(layout: &ThumbnailLayout, bytes: &[u8]) -> Result<Array2<i16>, ImageError> {
    layout.validate()?;
    let mismatch = || ImageError::ThumbnailSizeMismatch {
        expected: layout.size,
        actual: bytes.len() as u64,
    };
    if bytes.len() as u64 != layout.size {
        return Err(mismatch());
    }
    let words = decode_slice::<i16>(bytes, ByteOrder::LittleEndian);
    Array2::from_shape_vec(layout.shape(), words).map_err(|_| mismatch())
}

// =============================================================================
// Tests
// =============================================================================
