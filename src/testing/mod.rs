//! Test fixtures: minimal JPEG files carrying a chosen set of EXIF tags.
//!
//! The files contain only an SOI marker, an APP1 `Exif` segment and an EOI
//! marker. That is enough for the EXIF reader, which stops at the APP1 segment.

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Tag values to embed in a fixture image. `None` leaves the tag out.
#[derive(Debug, Clone, Default)]
pub struct FixtureTags {
    pub latitude: Option<([u32; 3], &'static str)>,
    pub longitude: Option<([u32; 3], &'static str)>,
    pub direction: Option<(u32, u32)>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub focal_length_35mm: Option<u16>,
}

impl FixtureTags {
    /// 37°46'30"N 122°25'10"W, 3000x2000, 35mm, facing 270.5°.
    pub fn san_francisco() -> Self {
        FixtureTags {
            latitude: Some(([37, 46, 30], "N")),
            longitude: Some(([122, 25, 10], "W")),
            direction: Some((541, 2)),
            width: Some(3000),
            height: Some(2000),
            focal_length_35mm: Some(35),
        }
    }

    /// 33°51'24"S 151°12'36"E, portrait 2000x3000, no focal length or direction.
    pub fn sydney() -> Self {
        FixtureTags {
            latitude: Some(([33, 51, 24], "S")),
            longitude: Some(([151, 12, 36], "E")),
            direction: None,
            width: Some(2000),
            height: Some(3000),
            focal_length_35mm: None,
        }
    }

    pub fn without_gps() -> Self {
        FixtureTags {
            latitude: None,
            longitude: None,
            direction: None,
            ..Self::san_francisco()
        }
    }
}

fn dms(values: [u32; 3]) -> Value {
    Value::Rational(
        values
            .iter()
            .map(|&num| Rational { num, denom: 1 })
            .collect(),
    )
}

fn ascii(text: &str) -> Value {
    Value::Ascii(vec![text.as_bytes().to_vec()])
}

fn field(tag: Tag, value: Value) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    }
}

/// Serializes `tags` into a TIFF block and wraps it in a JPEG APP1 segment.
pub fn jpeg_bytes(tags: &FixtureTags) -> Result<Vec<u8>, exif::Error> {
    let mut fields = vec![field(Tag::Orientation, Value::Short(vec![1]))];
    if let Some((values, reference)) = tags.latitude {
        fields.push(field(Tag::GPSLatitude, dms(values)));
        fields.push(field(Tag::GPSLatitudeRef, ascii(reference)));
    }
    if let Some((values, reference)) = tags.longitude {
        fields.push(field(Tag::GPSLongitude, dms(values)));
        fields.push(field(Tag::GPSLongitudeRef, ascii(reference)));
    }
    if let Some((num, denom)) = tags.direction {
        fields.push(field(
            Tag::GPSImgDirection,
            Value::Rational(vec![Rational { num, denom }]),
        ));
    }
    if let Some(width) = tags.width {
        fields.push(field(Tag::PixelXDimension, Value::Long(vec![width])));
    }
    if let Some(height) = tags.height {
        fields.push(field(Tag::PixelYDimension, Value::Long(vec![height])));
    }
    if let Some(focal) = tags.focal_length_35mm {
        fields.push(field(Tag::FocalLengthIn35mmFilm, Value::Short(vec![focal])));
    }

    let mut writer = Writer::new();
    for f in &fields {
        writer.push_field(f);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, true)?;
    let tiff = tiff.into_inner();

    let segment_len = (tiff.len() + 8) as u16;
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    Ok(jpeg)
}

/// A JPEG consisting of only the SOI and EOI markers, with no APP1 segment.
pub fn jpeg_without_exif() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xD9]
}

/// Writes a fixture JPEG to `path`.
pub fn write_jpeg(path: &Path, tags: &FixtureTags) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, jpeg_bytes(tags)?)?;
    Ok(())
}
