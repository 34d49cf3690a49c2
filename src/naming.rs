//! File naming for upload artifacts.
//!
//! The endpoint stores each `images` part under the filename it receives, so
//! names must survive multipart headers and foreign filesystems untouched:
//!
//! - `IMG 0042 (1).HEIC` → stem `IMG 0042 (1)` → sanitized `IMG-0042-1`
//! - output name: `IMG-0042-1-3fa9c04b21de.jpg` (stem + content prefix)
//!
//! Output names are content-addressed, so transforming the same bytes twice
//! lands on the same file.

use crate::types::ContentId;
use std::path::Path;

/// Stem used when a path has none (or it sanitizes to nothing).
const FALLBACK_STEM: &str = "image";

/// File stem of `path`, or `"image"` when there is none.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string())
}

/// Replace anything outside `[A-Za-z0-9._-]` with `-`, collapsing runs and
/// trimming leading/trailing dashes. Never returns an empty string.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Name of the JPEG the transformer writes for a source.
pub fn upload_file_name(stem: &str, content_id: &ContentId) -> String {
    format!("{}-{}.jpg", sanitize_file_name(stem), content_id.short())
}
