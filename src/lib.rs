//! Img2GE Library
//!
//! Plots local geotagged photographs onto a 3D earth browser by generating a
//! KML document. The library is organised as:
//! - `metadata`: EXIF extraction and directory import
//! - `geo`: GPS tags to signed decimal degrees
//! - `camera`: heading and viewing frustum from focal length and aspect ratio
//! - `document`: grouping by folder and overlay placement
//! - `kml`: serialization of the document
//! - `config` and `pipeline`: run settings and orchestration

pub mod camera;
pub mod config;
pub mod document;
pub mod geo;
pub mod kml;
pub mod metadata;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use camera::{GeometryError, ViewGeometry};
pub use config::{ConfigError, Settings, Verbosity};
pub use document::{Document, Folder, OverlaySettings, PhotoOverlay};
pub use geo::GeoCoordinate;
pub use kml::KmlError;
pub use metadata::{ImageRecord, MetadataError, Rational};
pub use pipeline::{PipelineError, RunSummary};
