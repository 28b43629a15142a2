//! End-to-end run: import every input path, build the document, save it.

use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::camera::GeometryError;
use crate::config::{ConfigError, Settings};
use crate::document::{self, Document};
use crate::kml::{self, KmlError};
use crate::metadata::{self, ImportFailure, ImportReport, MetadataError};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Kml(#[from] KmlError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to write summary: {0}")]
    Summary(String),
}

/// Counts reported after a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub images_found: usize,
    pub images_with_coords: usize,
    pub folders: usize,
    pub failures: Vec<ImportFailure>,
    pub output: PathBuf,
}

/// Imports all `paths` in order, concatenating their records.
pub fn import_all(paths: &[PathBuf], settings: &Settings) -> Result<ImportReport, MetadataError> {
    let mut report = ImportReport::default();
    for path in paths {
        report.merge(metadata::import_images(
            path,
            settings.recursive,
            settings.fail_fast,
        )?);
    }
    Ok(report)
}

/// Imports and builds without writing anything.
pub fn build_document(
    paths: &[PathBuf],
    settings: &Settings,
) -> Result<(Document, ImportReport), PipelineError> {
    settings.validate()?;
    let report = import_all(paths, settings)?;
    let document = document::build(&report.records, &settings.overlay_settings())?;
    Ok((document, report))
}

/// Runs the whole conversion and writes the KML file.
///
/// The output file is only written once every input has been imported and
/// the document has been built.
pub fn run(paths: &[PathBuf], settings: &Settings) -> Result<RunSummary, PipelineError> {
    let (document, report) = build_document(paths, settings)?;

    kml::save(&document, &settings.output)?;
    info!("KML saved as: {}", settings.output.display());

    Ok(RunSummary {
        images_found: report.records.len(),
        images_with_coords: document.overlay_count(),
        folders: document.folders.len(),
        failures: report.failures,
        output: settings.output.clone(),
    })
}

/// Writes `summary` as pretty-printed JSON.
pub fn write_summary(summary: &RunSummary, path: &Path) -> Result<(), PipelineError> {
    let json =
        serde_json::to_string_pretty(summary).map_err(|e| PipelineError::Summary(e.to_string()))?;
    fs::write(path, json).map_err(|e| PipelineError::Summary(e.to_string()))
}
