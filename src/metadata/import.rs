//! Directory traversal and batch extraction.

use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{extract, ImageRecord, MetadataError};

/// File extensions (lower case, without the dot) accepted as images.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// An image whose metadata could not be extracted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of importing one input directory.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Successfully extracted records, in traversal order.
    pub records: Vec<ImageRecord>,
    /// Files that matched the extension filter but could not be read.
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    /// Appends another report, keeping the order of both.
    pub fn merge(&mut self, other: ImportReport) {
        self.records.extend(other.records);
        self.failures.extend(other.failures);
    }
}

/// Returns `true` when the path has a `.jpg` or `.jpeg` extension (any case).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Extracts metadata from every supported image under `root`.
///
/// When `recurse` is `false` only the files directly inside `root` are
/// considered. Entries are visited in file-name order so runs are
/// reproducible across platforms.
///
/// # Arguments
///
/// * `root` - Directory to scan.
/// * `recurse` - Descend into subdirectories.
/// * `fail_fast` - Abort on the first unreadable image instead of
///   recording it in [`ImportReport::failures`].
///
/// # Errors
///
/// * [`MetadataError::Traversal`] if `root` is not a readable directory.
/// * [`MetadataError::UnreadableImage`] for the first bad image when
///   `fail_fast` is set.
pub fn import_images(
    root: &Path,
    recurse: bool,
    fail_fast: bool,
) -> Result<ImportReport, MetadataError> {
    if !root.is_dir() {
        return Err(MetadataError::Traversal {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let max_depth = if recurse { usize::MAX } else { 1 };
    let mut report = ImportReport::default();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| MetadataError::Traversal {
            path: e.path().unwrap_or(root).to_path_buf(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_supported_image(path) {
            continue;
        }

        match extract(path) {
            Ok(record) => report.records.push(record),
            Err(err) if fail_fast => return Err(err),
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
                report.failures.push(ImportFailure {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
            }
        }
    }

    info!("Found {} images.", report.records.len());
    Ok(report)
}
