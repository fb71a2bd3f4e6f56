//! CLI output formatting.
//!
//! Every command reports what it produced in the same two-level shape: a
//! header line naming the file, then indented context lines.
//!
//! ```text
//! photo.jpg
//!     Size: 1024x768
//!     Mime: image/jpeg
//!     Format: jpeg
//! ```
//!
//! Formatting functions return lines instead of printing so they can be
//! tested directly; the `print_*` wrappers write them to stdout.

use crate::imaging::{Dimensions, Image, ImageEngine, Placement, Point};
use serde::Serialize;
use std::path::Path;

/// Snapshot of an image's recorded metadata, serializable for `info --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn from_image<E: ImageEngine>(image: &Image<E>) -> Self {
        Self {
            path: image.path().map(|p| p.display().to_string()),
            mime: image.mime().map(str::to_string),
            format: image.format(),
            width: image.width(),
            height: image.height(),
        }
    }
}

fn indent(line: impl AsRef<str>) -> String {
    format!("    {}", line.as_ref())
}

/// Lines describing an image.
pub fn format_info(info: &ImageInfo) -> Vec<String> {
    let mut lines = vec![info.path.clone().unwrap_or_else(|| "<canvas>".to_string())];
    lines.push(indent(format!("Size: {}x{}", info.width, info.height)));
    if let Some(mime) = &info.mime {
        lines.push(indent(format!("Mime: {mime}")));
    }
    if let Some(format) = &info.format {
        lines.push(indent(format!("Format: {format}")));
    }
    lines
}

/// Lines describing an overlay placed on a canvas.
pub fn format_placement(what: &str, size: Dimensions, placement: Placement, at: Point) -> Vec<String> {
    vec![
        format!("{what} ({}x{})", size.width, size.height),
        indent(format!("Placement: {placement} → ({}, {})", at.x, at.y)),
    ]
}

/// Lines describing a written output file.
pub fn format_written(path: &Path, format: &str, bytes: usize, size: Dimensions) -> Vec<String> {
    vec![
        format!("Wrote {}", path.display()),
        indent(format!("Size: {}x{}", size.width, size.height)),
        indent(format!("Format: {format} ({bytes} bytes)")),
    ]
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
