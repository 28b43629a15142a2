//! EXIF metadata extraction for geotagged photographs.
//!
//! This module turns one image file into an [`ImageRecord`]: a small typed
//! record holding only the tags the rest of the crate needs (GPS position,
//! image direction, pixel dimensions and the 35mm-equivalent focal length).
//! Downstream code never performs string-keyed tag lookups.
//!
//! Batch import over a directory tree lives in [`import`].

use exif::{Exif, In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub mod import;

pub use import::{import_images, is_supported_image, ImportFailure, ImportReport};

#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error("Unreadable image {path:?}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },
    #[error("Cannot traverse {path:?}: {reason}")]
    Traversal { path: PathBuf, reason: String },
}

/// An unsigned EXIF rational value (numerator / denominator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl Rational {
    pub fn new(num: u32, den: u32) -> Self {
        Rational { num, den }
    }

    /// Converts the rational to a decimal value.
    ///
    /// A zero denominator yields exactly `0.0` instead of a division fault.
    pub fn to_decimal(&self) -> f64 {
        if self.den == 0 {
            return 0.0;
        }
        self.num as f64 / self.den as f64
    }
}

impl From<exif::Rational> for Rational {
    fn from(value: exif::Rational) -> Self {
        Rational::new(value.num, value.denom)
    }
}

/// One processed image: its path plus the metadata fields used for placement.
///
/// Records are created once by [`extract`] and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Path of the source file, as discovered during traversal.
    pub path: PathBuf,
    /// Latitude as (degrees, minutes, seconds).
    pub gps_latitude: Option<[Rational; 3]>,
    /// `"N"` or `"S"`.
    pub gps_latitude_ref: Option<String>,
    /// Longitude as (degrees, minutes, seconds).
    pub gps_longitude: Option<[Rational; 3]>,
    /// `"E"` or `"W"`.
    pub gps_longitude_ref: Option<String>,
    /// Direction the camera was facing, in degrees.
    pub image_direction: Option<Rational>,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    /// Focal length in 35mm film equivalent, millimetres.
    pub focal_length_35mm: Option<u32>,
}

impl ImageRecord {
    /// Creates a record for `path` with no metadata fields populated.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ImageRecord {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Base file name used as the display name of the overlay.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory portion of the path; the grouping key.
    pub fn folder(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// True when both GPS position tags are present.
    pub fn has_location(&self) -> bool {
        self.gps_latitude.is_some() && self.gps_longitude.is_some()
    }

    fn from_exif(path: PathBuf, exif: &Exif) -> Self {
        ImageRecord {
            path,
            gps_latitude: dms_field(exif, Tag::GPSLatitude),
            gps_latitude_ref: ascii_field(exif, Tag::GPSLatitudeRef),
            gps_longitude: dms_field(exif, Tag::GPSLongitude),
            gps_longitude_ref: ascii_field(exif, Tag::GPSLongitudeRef),
            image_direction: rational_field(exif, Tag::GPSImgDirection),
            image_width: uint_field(exif, Tag::PixelXDimension),
            image_height: uint_field(exif, Tag::PixelYDimension),
            focal_length_35mm: uint_field(exif, Tag::FocalLengthIn35mmFilm),
        }
    }
}

/// Reads the EXIF block of a single image file.
///
/// The file handle is scoped to this call and closed on every exit path,
/// including parse failures.
///
/// # Errors
///
/// * [`MetadataError::UnreadableImage`] if the file cannot be opened, is not
///   a recognised image container, or its EXIF block is corrupt. An image
///   with no EXIF block at all is not an error and yields an empty record.
pub fn extract(path: &Path) -> Result<ImageRecord, MetadataError> {
    let unreadable = |reason: String| MetadataError::UnreadableImage {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
    let mut reader = BufReader::new(file);
    let exif = match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        // A valid image without an EXIF block is a record with no tags.
        Err(exif::Error::NotFound(_)) => return Ok(ImageRecord::new(path)),
        Err(e) => return Err(unreadable(e.to_string())),
    };

    Ok(ImageRecord::from_exif(path.to_path_buf(), &exif))
}

fn dms_field(exif: &Exif, tag: Tag) -> Option<[Rational; 3]> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) if values.len() >= 3 => Some([
            values[0].into(),
            values[1].into(),
            values[2].into(),
        ]),
        _ => None,
    }
}

fn rational_field(exif: &Exif, tag: Tag) -> Option<Rational> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) => values.first().map(|&r| r.into()),
        _ => None,
    }
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(values) => values
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string()),
        _ => None,
    }
}

fn uint_field(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)?.value.get_uint(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{jpeg_without_exif, write_jpeg, FixtureTags};
    use approx::assert_relative_eq;

    #[test]
    fn test_rational_zero_denominator() {
        assert_eq!(Rational::new(5, 0).to_decimal(), 0.0);
        assert_eq!(Rational::new(0, 0).to_decimal(), 0.0);
        assert_relative_eq!(Rational::new(1, 4).to_decimal(), 0.25);
    }

    #[test]
    fn test_record_path_accessors() {
        let record = ImageRecord::new("trip/day1/IMG_0001.JPG");
        assert_eq!(record.file_name(), "IMG_0001.JPG");
        assert_eq!(record.folder(), PathBuf::from("trip/day1"));
        assert!(!record.has_location());
    }

    #[test]
    fn test_extract_full_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("golden_gate.jpg");
        write_jpeg(&path, &FixtureTags::san_francisco()).unwrap();

        let record = extract(&path).unwrap();

        assert_eq!(record.path, path);
        assert_eq!(
            record.gps_longitude,
            Some([Rational::new(122, 1), Rational::new(25, 1), Rational::new(10, 1)])
        );
        assert_eq!(record.gps_longitude_ref.as_deref(), Some("W"));
        assert_eq!(record.gps_latitude_ref.as_deref(), Some("N"));
        assert_eq!(record.image_width, Some(3000));
        assert_eq!(record.image_height, Some(2000));
        assert_eq!(record.focal_length_35mm, Some(35));
        assert_relative_eq!(record.image_direction.unwrap().to_decimal(), 270.5);
    }

    #[test]
    fn test_extract_without_gps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indoor.jpg");
        write_jpeg(&path, &FixtureTags::without_gps()).unwrap();

        let record = extract(&path).unwrap();
        assert!(!record.has_location());
        assert!(record.image_direction.is_none());
        assert_eq!(record.image_width, Some(3000));
    }

    #[test]
    fn test_extract_jpeg_without_exif_segment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        std::fs::write(&path, jpeg_without_exif()).unwrap();

        let record = extract(&path).unwrap();
        assert_eq!(record, ImageRecord::new(&path));
        assert!(!record.has_location());
    }

    #[test]
    fn test_extract_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let err = extract(&path).unwrap_err();
        assert!(matches!(err, MetadataError::UnreadableImage { .. }));

        let missing = dir.path().join("missing.jpg");
        assert!(matches!(
            extract(&missing),
            Err(MetadataError::UnreadableImage { .. })
        ));
    }
}
