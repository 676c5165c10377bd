//! Well-known acquisition metadata and display settings.
//!
//! DigitalMicrograph keeps microscope and acquisition details at fixed tag
//! paths under the main image. They are resolved here into plain structs
//! for display and JSON output.

use serde::Serialize;

use crate::error::ImageError;
use crate::format::TagStore;
use crate::image::ImageData;

/// Tag group of the main image entry.
pub const IMAGE_ROOT: &str = "root.ImageList.1";

/// Tag group of the display settings of the first document object.
pub const DISPLAY_INFO: &str = "root.DocumentObjectList.0.ImageDisplayInfo";

// =============================================================================
// Dm3Info
// =============================================================================

/// Acquisition metadata of the main image.
///
/// Every field is optional; a field is `None` when its tag is absent.
/// Values are the display form of the stored tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dm3Info {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descrip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acq_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acq_time: Option<String>,
    /// Acquiring user or session name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub micro: Option<String>,
    /// Accelerating voltage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specimen: Option<String>,
}

impl Dm3Info {
    /// Resolve all ten fields from the tag store.
    pub fn from_tags(store: &TagStore) -> Self {
        let lookup = |path: &str| {
            store
                .get(&format!("{}.{}", IMAGE_ROOT, path))
                .map(|value| value.to_string())
        };
        let microscope = |name: &str| lookup(&format!("ImageTags.Microscope Info.{}", name));

        Self {
            descrip: lookup("Description"),
            acq_date: lookup("ImageTags.DataBar.Acquisition Date"),
            acq_time: lookup("ImageTags.DataBar.Acquisition Time"),
            name: microscope("Name"),
            micro: microscope("Microscope"),
            hv: microscope("Voltage"),
            mag: microscope("Indicated Magnification"),
            mode: microscope("Operation Mode"),
            operator: microscope("Operator"),
            specimen: microscope("Specimen"),
        }
    }

    /// Present fields as `(key, value)` pairs, in the fixed key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("descrip", &self.descrip),
            ("acq_date", &self.acq_date),
            ("acq_time", &self.acq_time),
            ("name", &self.name),
            ("micro", &self.micro),
            ("hv", &self.hv),
            ("mag", &self.mag),
            ("mode", &self.mode),
            ("operator", &self.operator),
            ("specimen", &self.specimen),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

// =============================================================================
// Contrast Limits
// =============================================================================

/// Display range of the main image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContrastLimits {
    pub low: i64,
    pub high: i64,
}

/// Stored display limits, each `None` when its tag is absent.
///
/// Stored limits are parsed as floats and truncated toward zero.
pub fn stored_limits(store: &TagStore) -> Result<(Option<i64>, Option<i64>), ImageError> {
    let limit = |name: &str| -> Result<Option<i64>, ImageError> {
        let key = format!("{}.{}", DISPLAY_INFO, name);
        match store.get(&key) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .filter(|v| v.is_finite())
                .map(|v| Some(v.trunc() as i64))
                .ok_or_else(|| ImageError::InvalidTagValue {
                    path: key,
                    value: value.to_string(),
                }),
        }
    };
    Ok((limit("LowLimit")?, limit("HighLimit")?))
}

impl ContrastLimits {
    /// Combine stored limits with the image's value range.
    ///
    /// A missing stored limit falls back to the image minimum or maximum,
    /// truncated like stored limits are.
    pub fn resolve(
        low: Option<i64>,
        high: Option<i64>,
        data: Option<&ImageData>,
    ) -> Result<Self, ImageError> {
        if let (Some(low), Some(high)) = (low, high) {
            return Ok(Self { low, high });
        }
        let (min, max) = data
            .and_then(ImageData::value_range)
            .ok_or(ImageError::EmptyImage)?;
        Ok(Self {
            low: low.unwrap_or(min.trunc() as i64),
            high: high.unwrap_or(max.trunc() as i64),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
