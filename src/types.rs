//! Shared types passed between the acquire, transform and submit stages.

use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// MIME type assumed when the picker does not report one.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Where the user asked to pick an image from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSource {
    Gallery,
    Camera,
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Gallery => f.write_str("gallery"),
            ImageSource::Camera => f.write_str("camera"),
        }
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn longer_edge(self) -> u32 {
        self.width.max(self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// SHA-256 of an image file's bytes, hex encoded.
///
/// Batch entries are identified by content rather than by position, so
/// removing one entry never changes the identity of the others.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl ContentId {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(digest.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn of_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self::of_bytes(&std::fs::read(path)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading hex characters, used in file names and CLI output.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One image as it moves through the pipeline.
///
/// The descriptor references bytes on disk; it never owns them. Once a
/// descriptor is appended to a batch it is not edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// Local file holding the image bytes.
    pub local_path: PathBuf,
    pub mime_type: String,
    /// Filename sent with the multipart `images` field.
    pub file_name: String,
    /// Known after transform; the picker may or may not report it.
    pub dimensions: Option<Dimensions>,
    /// SHA-256 of the source bytes, set by the transformer.
    pub content_id: Option<ContentId>,
}

impl ImageDescriptor {
    /// Build a descriptor straight from a local path, guessing the MIME type
    /// from the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let local_path = path.into();
        let mime_type = guess_mime_type(&local_path)
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.jpg".to_string());
        Self {
            local_path,
            mime_type,
            file_name,
            dimensions: None,
            content_id: None,
        }
    }
}

/// Guess an image MIME type from a file extension.
pub fn guess_mime_type(path: &Path) -> Option<&'static str> {
    image::ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type())
}

/// The record being annotated, e.g. a scanned barcode.
///
/// Supplied by the caller when the session starts and never changed by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    identifier: String,
}

impl SubmissionRecord {
    /// Returns `None` for a blank identifier; the endpoint requires one.
    pub fn new(identifier: impl Into<String>) -> Option<Self> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            None
        } else {
            Some(Self { identifier })
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_id_is_stable_hex() {
        let a = ContentId::of_bytes(b"evidence");
        let b = ContentId::of_bytes(b"evidence");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert_eq!(a.short().len(), 12);
        assert!(a.as_str().starts_with(a.short()));
    }

    #[test]
    fn content_id_differs_for_different_bytes() {
        assert_ne!(ContentId::of_bytes(b"a"), ContentId::of_bytes(b"b"));
    }

    #[test]
    fn descriptor_from_path_guesses_mime() {
        let d = ImageDescriptor::from_path("/photos/scan.png");
        assert_eq!(d.mime_type, "image/png");
        assert_eq!(d.file_name, "scan.png");
        assert!(d.dimensions.is_none());
    }

    #[test]
    fn descriptor_from_path_defaults_to_jpeg() {
        let d = ImageDescriptor::from_path("/photos/IMG_0001");
        assert_eq!(d.mime_type, DEFAULT_MIME_TYPE);
    }

    #[test]
    fn record_rejects_blank_identifier() {
        assert!(SubmissionRecord::new("  ").is_none());
        assert_eq!(
            SubmissionRecord::new("4006381333931").unwrap().identifier(),
            "4006381333931"
        );
    }

    #[test]
    fn longer_edge_picks_max() {
        assert_eq!(Dimensions::from((600, 800)).longer_edge(), 800);
    }
}
