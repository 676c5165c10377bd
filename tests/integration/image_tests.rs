//! Image, thumbnail and metadata integration tests.
//!
//! Tests verify:
//! - Pixel data decodes to the declared shape with the stored values
//! - Layout errors are detected before any pixel byte is read
//! - Calibration, contrast limits and acquisition info resolve from tags
//! - Documents open from files on disk

use std::io::Write;

use num_complex::Complex32;

use dm3_reader::error::{ImageError, IoError, ParseError};
use dm3_reader::{DataType, Dm3Document, ImageData, ParseOptions};

use super::test_utils::{
    calibrations, dm3_file, document, f32_le, i16_le, image_data, thumbnail_entry,
    CountingSource, GroupBuilder, Scalar, FLOAT, SHORT,
};

fn open(root: &GroupBuilder) -> Dm3Document<dm3_reader::MemorySource> {
    Dm3Document::from_bytes(dm3_file(root)).unwrap()
}

/// Document whose main image is the given `ImageData` group plus extra
/// entries on the image itself.
fn with_image(image: GroupBuilder) -> GroupBuilder {
    document(vec![thumbnail_entry([1, 2, 3, 4]), image])
}

// =============================================================================
// Image Decoding
// =============================================================================

#[test]
fn test_real4_image_shape_and_values() {
    let (w, h) = (4usize, 3usize);
    let values: Vec<f32> = (0..w * h).map(|v| v as f32 * 0.5).collect();
    let root = with_image(GroupBuilder::new().group(
        "ImageData",
        image_data(2, 4, &[w as u32, h as u32], FLOAT, &f32_le(&values)),
    ));
    let mut doc = open(&root);

    let image = doc.image().unwrap();
    assert_eq!(image.data_type, DataType::Real4);
    assert_eq!(image.shape(), &[w, h]);

    let ImageData::Float32(array) = image.data else {
        panic!("expected Float32 data");
    };
    for x in 0..w {
        for y in 0..h {
            assert_eq!(array[[x, y]], values[x * h + y]);
        }
    }
}

#[test]
fn test_complex8_pairs_halve_the_count() {
    let floats = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let root = with_image(GroupBuilder::new().group(
        "ImageData",
        image_data(3, 8, &[4], FLOAT, &f32_le(&floats)),
    ));
    let mut doc = open(&root);

    let image = doc.image().unwrap();
    let ImageData::Complex32(array) = image.data else {
        panic!("expected Complex32 data");
    };
    assert_eq!(array.len(), floats.len() / 2);
    assert_eq!(array[[0]], Complex32::new(1.0, 2.0));
    assert_eq!(array[[3]], Complex32::new(7.0, 8.0));
}

#[test]
fn test_int16_volume() {
    let values: Vec<i16> = (0..8).collect();
    let root = with_image(GroupBuilder::new().group(
        "ImageData",
        image_data(1, 2, &[2, 2, 2], SHORT, &i16_le(&values)),
    ));
    let mut doc = open(&root);

    let image = doc.image().unwrap();
    assert_eq!(image.shape(), &[2, 2, 2]);
    assert_eq!(image.calibrations.len(), 3);
    let ImageData::Int16(array) = image.data else {
        panic!("expected Int16 data");
    };
    assert_eq!(array[[1, 0, 1]], 5);
}

#[test]
fn test_size_mismatch_reads_nothing() {
    // Declared pixel depth disagrees with the stored span
    let root = with_image(GroupBuilder::new().group(
        "ImageData",
        image_data(2, 8, &[2, 2], FLOAT, &f32_le(&[0.0; 4])),
    ));
    let source = CountingSource::new(dm3_file(&root));
    let tracker = source.clone();
    let mut doc = Dm3Document::from_source(source, ParseOptions::default()).unwrap();

    let reads_after_parse = tracker.read_count();
    let err = doc.image().unwrap_err();
    assert!(matches!(
        err,
        ImageError::ImageSizeMismatch {
            expected: 32,
            actual: 16
        }
    ));
    assert_eq!(tracker.read_count(), reads_after_parse);
}

#[test]
fn test_unsupported_type_reads_nothing() {
    let root = with_image(GroupBuilder::new().group(
        "ImageData",
        image_data(8, 4, &[2, 2], FLOAT, &f32_le(&[0.0; 4])),
    ));
    let source = CountingSource::new(dm3_file(&root));
    let tracker = source.clone();
    let mut doc = Dm3Document::from_source(source, ParseOptions::default()).unwrap();

    let reads_after_parse = tracker.read_count();
    assert!(matches!(
        doc.image(),
        Err(ImageError::UnsupportedDataType {
            code: 8,
            name: "RGB_DATA"
        })
    ));
    assert_eq!(tracker.read_count(), reads_after_parse);

    // The document stays usable after a failed query
    assert_eq!(doc.data_type_code(), 8);
    assert_eq!(doc.data_type(), Some(DataType::Rgb));
}

#[test]
fn test_missing_image_tags() {
    let mut doc = open(&GroupBuilder::new().scalar("x", Scalar::Long(1)));
    assert!(matches!(doc.image(), Err(ImageError::MissingTag(_))));
    assert!(matches!(doc.thumbnail(), Err(ImageError::MissingTag(_))));
    assert_eq!(doc.data_type_code(), -1);
    assert_eq!(doc.data_type(), None);
}

// =============================================================================
// Thumbnail
// =============================================================================

#[test]
fn test_thumbnail_words() {
    let root = with_image(GroupBuilder::new());
    let mut doc = open(&root);

    let thumbnail = doc.thumbnail().unwrap();
    assert_eq!(thumbnail.dim(), (2, 4));
    // Each little-endian 32-bit pixel splits into low and high words
    assert_eq!(thumbnail.row(0).to_vec(), vec![1, 0, 2, 0]);
    assert_eq!(thumbnail.row(1).to_vec(), vec![3, 0, 4, 0]);
}

#[test]
fn test_thumbnail_size_mismatch() {
    let entry = GroupBuilder::new().group(
        "ImageData",
        image_data(23, 4, &[3, 2], FLOAT, &f32_le(&[0.0; 4])),
    );
    let mut doc = open(&document(vec![entry]));
    assert!(matches!(
        doc.thumbnail(),
        Err(ImageError::ThumbnailSizeMismatch {
            expected: 24,
            actual: 16
        })
    ));
}

// =============================================================================
// Calibration and Display
// =============================================================================

#[test]
fn test_axis_calibration() {
    let image = GroupBuilder::new().group(
        "ImageData",
        image_data(2, 4, &[2, 2], FLOAT, &f32_le(&[0.0; 4]))
            .group("Calibrations", calibrations(&[(1.0, 0.25, "nm")], Some("e-"))),
    );
    let mut doc = open(&with_image(image));

    let pixel = doc.pixel_size().unwrap();
    assert_eq!(pixel.origin, 1.0);
    assert_eq!(pixel.scale, 0.25);
    assert_eq!(pixel.unit, "nm");
    assert!(matches!(doc.axis_units(1), Err(ImageError::MissingTag(_))));
    assert_eq!(doc.brightness_units().unwrap(), "e-");

    // Axes without stored calibration fall back to the identity
    let image = doc.image().unwrap();
    assert_eq!(image.calibrations[0].unit, "nm");
    assert_eq!(image.calibrations[1].scale, 1.0);
    assert_eq!(image.calibrations[1].unit, "");
    assert_eq!(image.physical_size()[0], (0.5, "nm"));
}

#[test]
fn test_micro_sign_units_pass_through() {
    let image = GroupBuilder::new().group(
        "ImageData",
        image_data(2, 4, &[1], FLOAT, &f32_le(&[0.0]))
            .group("Calibrations", calibrations(&[(0.0, 2.0, "\u{b5}m")], None)),
    );
    let doc = open(&with_image(image));
    assert_eq!(doc.axis_units(0).unwrap().unit, "\u{b5}m");
}

fn display_info(low: Option<f32>, high: Option<f32>) -> GroupBuilder {
    let mut info = GroupBuilder::new();
    if let Some(low) = low {
        info = info.scalar("LowLimit", Scalar::Float(low));
    }
    if let Some(high) = high {
        info = info.scalar("HighLimit", Scalar::Float(high));
    }
    GroupBuilder::new().group("ImageDisplayInfo", info)
}

fn with_display(image: GroupBuilder, low: Option<f32>, high: Option<f32>) -> GroupBuilder {
    with_image(image).group(
        "DocumentObjectList",
        GroupBuilder::new().group("", display_info(low, high)),
    )
}

#[test]
fn test_cuts_from_stored_limits() {
    let image = GroupBuilder::new().group(
        "ImageData",
        image_data(2, 4, &[2], FLOAT, &f32_le(&[-5.0, 5.0])),
    );
    let mut doc = open(&with_display(image, Some(10.9), Some(250.2)));
    let cuts = doc.cuts().unwrap();
    assert_eq!((cuts.low, cuts.high), (10, 250));
}

#[test]
fn test_cuts_fall_back_to_image_range() {
    let image = GroupBuilder::new().group(
        "ImageData",
        image_data(2, 4, &[3], FLOAT, &f32_le(&[-5.5, 0.0, 7.9])),
    );
    let mut doc = open(&with_display(image.clone(), Some(1.0), None));
    let cuts = doc.cuts().unwrap();
    assert_eq!((cuts.low, cuts.high), (1, 7));

    let mut doc = open(&with_image(image));
    let cuts = doc.cuts().unwrap();
    assert_eq!((cuts.low, cuts.high), (-5, 7));
}

#[test]
fn test_cuts_of_empty_image() {
    let image = GroupBuilder::new().group("ImageData", image_data(2, 4, &[0], FLOAT, &[]));
    let mut doc = open(&with_image(image));
    assert!(matches!(doc.cuts(), Err(ImageError::EmptyImage)));
}

// =============================================================================
// Acquisition Info
// =============================================================================

#[test]
fn test_info_keys() {
    let microscope = GroupBuilder::new()
        .text_array("Microscope", "Titan")
        .scalar("Voltage", Scalar::Double(300000.0))
        .text_array("Operation Mode", "TEM");
    let image = GroupBuilder::new()
        .text_array("Description", "grain boundary")
        .group(
            "ImageTags",
            GroupBuilder::new()
                .group(
                    "DataBar",
                    GroupBuilder::new().text_array("Acquisition Date", "2024-03-01"),
                )
                .group("Microscope Info", microscope),
        );
    let doc = open(&with_image(image));

    let info = doc.info();
    let pairs: Vec<(&str, &str)> = info.iter().collect();
    assert_eq!(
        pairs,
        vec![
            ("descrip", "grain boundary"),
            ("acq_date", "2024-03-01"),
            ("micro", "Titan"),
            ("hv", "300000"),
            ("mode", "TEM"),
        ]
    );
    assert_eq!(info.operator, None);
}

// =============================================================================
// Files on Disk
// =============================================================================

#[test]
fn test_open_file_and_read_image() {
    let values = [3i16, -3, 7, 9];
    let root = with_image(GroupBuilder::new().group(
        "ImageData",
        image_data(1, 2, &[2, 2], SHORT, &i16_le(&values)),
    ));
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&dm3_file(&root)).unwrap();
    file.flush().unwrap();

    let mut doc = Dm3Document::open(file.path()).unwrap();
    assert_eq!(doc.header().version, 3);
    assert!(doc.identifier().ends_with(
        file.path().file_name().unwrap().to_str().unwrap()
    ));

    let image = doc.image().unwrap();
    let ImageData::Int16(array) = image.data else {
        panic!("expected Int16 data");
    };
    assert_eq!(array.iter().copied().collect::<Vec<_>>(), values.to_vec());

    // Thumbnail read after the image seeks backwards in the same file
    assert_eq!(doc.thumbnail().unwrap().dim(), (2, 4));
}

#[test]
fn test_open_missing_file() {
    let err = Dm3Document::open("/nonexistent/sample.dm3").unwrap_err();
    assert!(matches!(err, ParseError::Io(IoError::Open { .. })));
}
