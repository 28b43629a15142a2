//! Conversion of EXIF GPS tags to signed decimal degrees (WGS-84).

use serde::{Deserialize, Serialize};

use crate::metadata::{ImageRecord, Rational};

/// A ground position in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub longitude: f64,
    pub latitude: f64,
}

/// Converts a (degrees, minutes, seconds) triple to decimal degrees.
pub fn dms_to_decimal(dms: &[Rational; 3]) -> f64 {
    dms[0].to_decimal() + dms[1].to_decimal() / 60.0 + dms[2].to_decimal() / 3600.0
}

fn is_reference(reference: Option<&str>, hemisphere: &str) -> bool {
    reference.is_some_and(|r| r.trim() == hemisphere)
}

/// Resolves the capture location of `record`.
///
/// Returns `None` when either GPS position tag is missing. Longitude is
/// negated for a `"W"` reference and latitude for `"S"`; a missing
/// reference counts as the positive hemisphere.
///
/// # Examples
///
/// ```rust
/// use img2ge::geo::resolve;
/// use img2ge::metadata::{ImageRecord, Rational};
///
/// let mut record = ImageRecord::new("photos/ferry.jpg");
/// record.gps_longitude = Some([Rational::new(122, 1), Rational::new(25, 1), Rational::new(10, 1)]);
/// record.gps_longitude_ref = Some("W".to_string());
/// record.gps_latitude = Some([Rational::new(37, 1), Rational::new(46, 1), Rational::new(30, 1)]);
/// record.gps_latitude_ref = Some("N".to_string());
///
/// let coord = resolve(&record).unwrap();
/// assert!((coord.longitude + 122.41944).abs() < 1e-4);
/// assert!((coord.latitude - 37.775).abs() < 1e-9);
/// ```
pub fn resolve(record: &ImageRecord) -> Option<GeoCoordinate> {
    let (longitude, latitude) = match (&record.gps_longitude, &record.gps_latitude) {
        (Some(lng), Some(lat)) => (dms_to_decimal(lng), dms_to_decimal(lat)),
        _ => return None,
    };

    let longitude = if is_reference(record.gps_longitude_ref.as_deref(), "W") {
        -longitude
    } else {
        longitude
    };
    let latitude = if is_reference(record.gps_latitude_ref.as_deref(), "S") {
        -latitude
    } else {
        latitude
    };

    Some(GeoCoordinate {
        longitude,
        latitude,
    })
}
