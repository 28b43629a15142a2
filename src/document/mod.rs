//! Assembly of the overlay document from extracted image records.
//!
//! Records are partitioned by source directory; each directory that holds
//! at least one geotagged image becomes a [`Folder`] with one
//! [`PhotoOverlay`] per geotagged image.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::camera::{self, GeometryError, ViewGeometry, DEFAULT_FOCAL_LENGTH_35MM};
use crate::geo::{self, GeoCoordinate};
use crate::metadata::ImageRecord;

/// How the camera altitude is interpreted by the earth browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AltitudeMode {
    ClampToGround,
    RelativeToGround,
    Absolute,
}

impl AltitudeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AltitudeMode::ClampToGround => "clampToGround",
            AltitudeMode::RelativeToGround => "relativeToGround",
            AltitudeMode::Absolute => "absolute",
        }
    }
}

/// Virtual camera the browser flies to when the overlay is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookAtCamera {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
    pub heading: f64,
    pub altitude_mode: AltitudeMode,
}

/// Symmetric pyramid the photo is projected onto, angles in degrees.
///
/// `near` is the distance from the camera to the image plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewVolume {
    pub left_fov: f64,
    pub right_fov: f64,
    pub bottom_fov: f64,
    pub top_fov: f64,
    pub near: f64,
}

impl ViewVolume {
    pub fn symmetric(view: &ViewGeometry, near: f64) -> Self {
        ViewVolume {
            left_fov: -view.horizontal_half_angle,
            right_fov: view.horizontal_half_angle,
            bottom_fov: -view.vertical_half_angle,
            top_fov: view.vertical_half_angle,
            near,
        }
    }
}

/// One placed photograph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoOverlay {
    /// Base file name of the image.
    pub name: String,
    /// Absolute image reference, used both as the icon and as the overlay texture.
    pub href: String,
    pub coordinate: GeoCoordinate,
    pub heading: f64,
    pub camera: LookAtCamera,
    pub view_volume: ViewVolume,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    /// Source directory path.
    pub name: String,
    pub overlays: Vec<PhotoOverlay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub folders: Vec<Folder>,
}

impl Document {
    pub fn overlay_count(&self) -> usize {
        self.folders.iter().map(|f| f.overlays.len()).sum()
    }
}

/// Fixed placement parameters applied to every overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySettings {
    pub document_name: String,
    /// Camera altitude above ground.
    pub altitude: f64,
    /// Distance to the projected image plane.
    pub view_distance: f64,
    pub default_focal_length: f64,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        OverlaySettings {
            document_name: "Img2GE".to_string(),
            altitude: 500.0,
            view_distance: 50.0,
            default_focal_length: DEFAULT_FOCAL_LENGTH_35MM,
        }
    }
}

/// Partitions records by directory, keeping first-seen order of both the
/// groups and the records inside each group.
///
/// Records from the same directory are merged even when they are not
/// adjacent in the input.
pub fn group_by_folder(records: &[ImageRecord]) -> Vec<(PathBuf, Vec<&ImageRecord>)> {
    let mut groups: Vec<(PathBuf, Vec<&ImageRecord>)> = Vec::new();
    for record in records {
        let folder = record.folder();
        match groups.iter_mut().find(|(key, _)| *key == folder) {
            Some((_, members)) => members.push(record),
            None => groups.push((folder, vec![record])),
        }
    }
    groups
}

fn make_overlay(
    record: &ImageRecord,
    coordinate: GeoCoordinate,
    settings: &OverlaySettings,
) -> Result<PhotoOverlay, GeometryError> {
    let view = camera::compute(record, settings.default_focal_length)?;
    // KML resolves relative hrefs against the KML file, not the working directory.
    let href = std::path::absolute(&record.path).unwrap_or_else(|_| record.path.clone());
    Ok(PhotoOverlay {
        name: record.file_name(),
        href: href.to_string_lossy().into_owned(),
        coordinate,
        heading: view.heading,
        camera: LookAtCamera {
            longitude: coordinate.longitude,
            latitude: coordinate.latitude,
            altitude: settings.altitude,
            heading: view.heading,
            altitude_mode: AltitudeMode::RelativeToGround,
        },
        view_volume: ViewVolume::symmetric(&view, settings.view_distance),
    })
}

fn folder_name(folder: &Path) -> String {
    folder.to_string_lossy().into_owned()
}

/// Builds the overlay document.
///
/// Records without a resolvable location are skipped silently. A folder
/// is emitted only once its first geotagged record is found.
///
/// # Errors
///
/// * [`GeometryError::MissingDimensionTags`] when a geotagged record has no
///   pixel dimensions.
pub fn build(
    records: &[ImageRecord],
    settings: &OverlaySettings,
) -> Result<Document, GeometryError> {
    let mut document = Document {
        name: settings.document_name.clone(),
        folders: Vec::new(),
    };

    for (folder, members) in group_by_folder(records) {
        let mut current: Option<Folder> = None;
        for record in members {
            debug!("{:?}", record);
            let Some(coordinate) = geo::resolve(record) else {
                continue;
            };
            let overlay = make_overlay(record, coordinate, settings)?;
            current
                .get_or_insert_with(|| Folder {
                    name: folder_name(&folder),
                    overlays: Vec::new(),
                })
                .overlays
                .push(overlay);
        }
        if let Some(done) = current {
            document.folders.push(done);
        }
    }

    info!("Found {} images with coords.", document.overlay_count());
    Ok(document)
}
