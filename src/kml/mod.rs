//! KML 2.2 serialization of an overlay [`Document`].

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::document::{Document, Folder, PhotoOverlay};

pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

#[derive(thiserror::Error, Debug)]
pub enum KmlError {
    #[error("Failed to write KML to {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Escapes the five XML special characters.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_overlay(out: &mut String, overlay: &PhotoOverlay, index: usize) -> std::fmt::Result {
    let style_id = format!("photo{index}");
    let href = escape(&overlay.href);
    let camera = &overlay.camera;
    let volume = &overlay.view_volume;

    writeln!(out, "      <PhotoOverlay>")?;
    writeln!(out, "        <name>{}</name>", escape(&overlay.name))?;
    writeln!(out, "        <Camera>")?;
    writeln!(out, "          <longitude>{}</longitude>", camera.longitude)?;
    writeln!(out, "          <latitude>{}</latitude>", camera.latitude)?;
    writeln!(out, "          <altitude>{}</altitude>", camera.altitude)?;
    writeln!(out, "          <heading>{}</heading>", camera.heading)?;
    writeln!(
        out,
        "          <altitudeMode>{}</altitudeMode>",
        camera.altitude_mode.as_str()
    )?;
    writeln!(out, "        </Camera>")?;
    writeln!(out, "        <styleUrl>#{style_id}</styleUrl>")?;
    writeln!(out, "        <Style id=\"{style_id}\">")?;
    writeln!(out, "          <IconStyle>")?;
    writeln!(out, "            <heading>{}</heading>", overlay.heading)?;
    writeln!(out, "            <Icon>")?;
    writeln!(out, "              <href>{href}</href>")?;
    writeln!(out, "            </Icon>")?;
    writeln!(out, "          </IconStyle>")?;
    writeln!(out, "        </Style>")?;
    writeln!(out, "        <Icon>")?;
    writeln!(out, "          <href>{href}</href>")?;
    writeln!(out, "        </Icon>")?;
    writeln!(out, "        <ViewVolume>")?;
    writeln!(out, "          <leftFov>{}</leftFov>", volume.left_fov)?;
    writeln!(out, "          <rightFov>{}</rightFov>", volume.right_fov)?;
    writeln!(out, "          <bottomFov>{}</bottomFov>", volume.bottom_fov)?;
    writeln!(out, "          <topFov>{}</topFov>", volume.top_fov)?;
    writeln!(out, "          <near>{}</near>", volume.near)?;
    writeln!(out, "        </ViewVolume>")?;
    writeln!(out, "        <Point>")?;
    writeln!(
        out,
        "          <coordinates>{},{},0</coordinates>",
        overlay.coordinate.longitude, overlay.coordinate.latitude
    )?;
    writeln!(out, "        </Point>")?;
    writeln!(out, "      </PhotoOverlay>")?;
    Ok(())
}

fn write_folder(out: &mut String, folder: &Folder, first_index: usize) -> std::fmt::Result {
    writeln!(out, "    <Folder>")?;
    writeln!(out, "      <name>{}</name>", escape(&folder.name))?;
    for (offset, overlay) in folder.overlays.iter().enumerate() {
        write_overlay(out, overlay, first_index + offset)?;
    }
    writeln!(out, "    </Folder>")?;
    Ok(())
}

/// Renders `document` as a KML string.
pub fn to_kml(document: &Document) -> Result<String, KmlError> {
    let mut out = String::new();
    writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(out, "<kml xmlns=\"{KML_NAMESPACE}\">")?;
    writeln!(out, "  <Document>")?;
    writeln!(out, "    <name>{}</name>", escape(&document.name))?;

    // Style ids must be unique across the whole document.
    let mut index = 0;
    for folder in &document.folders {
        write_folder(&mut out, folder, index)?;
        index += folder.overlays.len();
    }

    writeln!(out, "  </Document>")?;
    writeln!(out, "</kml>")?;
    Ok(out)
}

/// Writes `document` to `path` as KML.
pub fn save(document: &Document, path: &Path) -> Result<(), KmlError> {
    let kml = to_kml(document)?;
    fs::write(path, kml).map_err(|source| KmlError::Io {
        path: path.to_path_buf(),
        source,
    })
}
