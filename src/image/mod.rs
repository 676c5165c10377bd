//! Image materialization.
//!
//! The tag tree only records where the pixel block lives. This module turns
//! that block into a typed [`ndarray`] array:
//!
//! - [`data_type`] maps the `DataType` tag to an element decoding
//! - [`materialize`] validates the layout, decodes and reshapes
//! - [`packed`] rebuilds full spectra from packed half-plane FFT data
//! - [`calibration`] resolves per-axis origin, scale and unit
//!
//! Arrays are indexed `[x, y, z]`: the first axis is the image width.

mod calibration;
mod data_type;
mod lookup;
mod materialize;
mod packed;

pub use calibration::{brightness_units, AxisCalibration, CALIBRATIONS};
pub use data_type::{DataType, RawElement};
pub use materialize::{
    decode_image, decode_thumbnail, ImageLayout, ThumbnailLayout, IMAGE_DATA, THUMBNAIL_DATA,
};
pub use packed::unpack_packed_complex;

use ndarray::ArrayD;
use num_complex::{Complex32, Complex64};

// =============================================================================
// ImageData
// =============================================================================

/// Decoded pixel values, one variant per element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    Int8(ArrayD<i8>),
    UInt8(ArrayD<u8>),
    Int16(ArrayD<i16>),
    UInt16(ArrayD<u16>),
    Int32(ArrayD<i32>),
    UInt32(ArrayD<u32>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    Complex32(ArrayD<Complex32>),
    Complex64(ArrayD<Complex64>),
    Binary(ArrayD<bool>),
}

macro_rules! with_array {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            ImageData::Int8($arr) => $body,
            ImageData::UInt8($arr) => $body,
            ImageData::Int16($arr) => $body,
            ImageData::UInt16($arr) => $body,
            ImageData::Int32($arr) => $body,
            ImageData::UInt32($arr) => $body,
            ImageData::Float32($arr) => $body,
            ImageData::Float64($arr) => $body,
            ImageData::Complex32($arr) => $body,
            ImageData::Complex64($arr) => $body,
            ImageData::Binary($arr) => $body,
        }
    };
}

impl ImageData {
    pub fn shape(&self) -> &[usize] {
        with_array!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        with_array!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the element type.
    pub fn element_name(&self) -> &'static str {
        match self {
            ImageData::Int8(_) => "i8",
            ImageData::UInt8(_) => "u8",
            ImageData::Int16(_) => "i16",
            ImageData::UInt16(_) => "u16",
            ImageData::Int32(_) => "i32",
            ImageData::UInt32(_) => "u32",
            ImageData::Float32(_) => "f32",
            ImageData::Float64(_) => "f64",
            ImageData::Complex32(_) => "complex64",
            ImageData::Complex64(_) => "complex128",
            ImageData::Binary(_) => "bool",
        }
    }

    /// Smallest and largest pixel value, `None` for an empty image.
    ///
    /// Complex pixels are ordered by their real part and binary pixels count
    /// as 0 and 1. NaN samples are skipped.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        match self {
            ImageData::Int8(a) => range(a.iter().map(|&v| v as f64)),
            ImageData::UInt8(a) => range(a.iter().map(|&v| v as f64)),
            ImageData::Int16(a) => range(a.iter().map(|&v| v as f64)),
            ImageData::UInt16(a) => range(a.iter().map(|&v| v as f64)),
            ImageData::Int32(a) => range(a.iter().map(|&v| v as f64)),
            ImageData::UInt32(a) => range(a.iter().map(|&v| v as f64)),
            ImageData::Float32(a) => range(a.iter().map(|&v| v as f64)),
            ImageData::Float64(a) => range(a.iter().copied()),
            ImageData::Complex32(a) => range(a.iter().map(|v| v.re as f64)),
            ImageData::Complex64(a) => range(a.iter().map(|v| v.re)),
            ImageData::Binary(a) => range(a.iter().map(|&v| if v { 1.0 } else { 0.0 })),
        }
    }
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

// =============================================================================
// Image
// =============================================================================

/// A materialized image with one calibration per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub data_type: DataType,
    pub data: ImageData,
    pub calibrations: Vec<AxisCalibration>,
}

impl Image {
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Physical extent of each axis: pixel count times scale.
    pub fn physical_size(&self) -> Vec<(f64, &str)> {
        self.shape()
            .iter()
            .zip(&self.calibrations)
            .map(|(&n, cal)| (n as f64 * cal.scale, cal.unit.as_str()))
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
