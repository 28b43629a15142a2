//! Camera orientation and viewing frustum derived from EXIF tags.
//!
//! The frustum uses a thin-lens field-of-view model against a fixed 24mm
//! reference sensor dimension. The vertical dimension is the reference
//! dimension divided by the image aspect ratio, not a second physical
//! constant.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::metadata::ImageRecord;

/// Reference sensor dimension in millimetres (35mm film short side).
pub const REFERENCE_SENSOR_MM: f64 = 24.0;

/// Focal length assumed when the 35mm-equivalent tag is absent.
pub const DEFAULT_FOCAL_LENGTH_35MM: f64 = 35.0;

#[derive(thiserror::Error, Debug)]
pub enum GeometryError {
    #[error("Image {path:?} lacks width/height metadata needed for the aspect ratio")]
    MissingDimensionTags { path: PathBuf },
}

/// Heading and symmetric half-angles of a photo's viewing volume, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewGeometry {
    pub heading: f64,
    pub horizontal_half_angle: f64,
    pub vertical_half_angle: f64,
}

/// Half of the thin-lens field of view, in degrees.
///
/// `degrees(2 * atan(sensor / (2 * focal))) / 2`
pub fn half_angle(sensor_mm: f64, focal_length_mm: f64) -> f64 {
    (2.0 * (sensor_mm / (2.0 * focal_length_mm)).atan()).to_degrees() / 2.0
}

/// Width over height, or `None` when either dimension is missing or zero.
pub fn aspect_ratio(record: &ImageRecord) -> Option<f64> {
    match (record.image_width, record.image_height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Some(width as f64 / height as f64),
        _ => None,
    }
}

/// Computes the heading and frustum of `record`.
///
/// The heading comes from the GPS image direction tag and defaults to 0.
/// The focal length comes from the 35mm-equivalent tag; when it is absent
/// (or recorded as 0, meaning unknown) `default_focal_length` is used.
///
/// # Errors
///
/// * [`GeometryError::MissingDimensionTags`] when the pixel width or height
///   is missing or zero.
///
/// # Examples
///
/// ```rust
/// use img2ge::camera::{compute, DEFAULT_FOCAL_LENGTH_35MM};
/// use img2ge::metadata::ImageRecord;
///
/// let mut record = ImageRecord::new("a.jpg");
/// record.image_width = Some(3000);
/// record.image_height = Some(2000);
///
/// let view = compute(&record, DEFAULT_FOCAL_LENGTH_35MM).unwrap();
/// assert_eq!(view.heading, 0.0);
/// assert!((view.horizontal_half_angle - 18.9246).abs() < 1e-3);
/// ```
pub fn compute(
    record: &ImageRecord,
    default_focal_length: f64,
) -> Result<ViewGeometry, GeometryError> {
    let heading = record
        .image_direction
        .map(|direction| direction.to_decimal())
        .unwrap_or(0.0);

    let aspect = aspect_ratio(record).ok_or_else(|| GeometryError::MissingDimensionTags {
        path: record.path.clone(),
    })?;

    let focal_length = match record.focal_length_35mm {
        Some(focal) if focal > 0 => focal as f64,
        _ => default_focal_length,
    };

    Ok(ViewGeometry {
        heading,
        horizontal_half_angle: half_angle(REFERENCE_SENSOR_MM, focal_length),
        vertical_half_angle: half_angle(REFERENCE_SENSOR_MM / aspect, focal_length),
    })
}
