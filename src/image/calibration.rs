//! Spatial and intensity calibration.

use serde::Serialize;

use super::lookup::{require, require_f64};
use crate::error::ImageError;
use crate::format::TagStore;

/// Group holding the calibrations of the main image.
pub const CALIBRATIONS: &str = "root.ImageList.1.ImageData.Calibrations";

/// Origin, scale and unit of one image axis.
///
/// A pixel index `i` maps to the physical coordinate `(i - origin) * scale`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisCalibration {
    pub origin: f64,
    pub scale: f64,
    pub unit: String,
}

impl AxisCalibration {
    pub fn new(origin: f64, scale: f64, unit: impl Into<String>) -> Self {
        Self {
            origin,
            scale,
            unit: unit.into(),
        }
    }

    /// Identity calibration: origin 0, scale 1, no unit.
    pub fn uncalibrated() -> Self {
        Self::new(0.0, 1.0, "")
    }

    /// Read the calibration of axis `index`.
    ///
    /// `Origin`, `Scale` and `Units` must all be present. Units are taken
    /// verbatim, so a decoded micro sign stays a micro sign.
    pub fn from_tags(store: &TagStore, index: usize) -> Result<Self, ImageError> {
        let group = format!("{}.Dimension.{}", CALIBRATIONS, index);
        let origin = require_f64(store, &format!("{}.Origin", group))?;
        let scale = require_f64(store, &format!("{}.Scale", group))?;
        let unit = require(store, &format!("{}.Units", group))?.to_string();
        Ok(Self {
            origin,
            scale,
            unit,
        })
    }

    /// Physical coordinate of a pixel index along this axis.
    pub fn to_physical(&self, pixel: f64) -> f64 {
        (pixel - self.origin) * self.scale
    }
}

impl Default for AxisCalibration {
    fn default() -> Self {
        Self::uncalibrated()
    }
}

/// Unit of the pixel values, such as `counts` or `e-`.
pub fn brightness_units(store: &TagStore) -> Result<String, ImageError> {
    let key = format!("{}.Brightness.Units", CALIBRATIONS);
    Ok(require(store, &key)?.to_string())
}
