//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the transformer
//! needs: identify and resize. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).
//!
//! Backends are called from `tokio::task::spawn_blocking`, hence the
//! `Send + Sync` bound.

use super::params::ResizeParams;
use crate::types::Dimensions;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported image: {0}")]
    Unsupported(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
pub trait ImageBackend: Send + Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode `params.source`, resize to exactly `width`×`height` and write a
    /// JPEG to `params.output`.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::Quality;
    use std::sync::Mutex;

    /// Placeholder bytes the mock writes for every resize output.
    pub const MOCK_OUTPUT: &[u8] = b"mock-jpeg";

    /// Mock backend that records operations instead of touching pixels.
    ///
    /// `identify` answers from a fixed dimension (or fails when none is set);
    /// `resize` writes [`MOCK_OUTPUT`] so callers see a real file.
    #[derive(Default)]
    pub struct MockBackend {
        pub dimensions: Option<Dimensions>,
        pub fail_resize: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Resize {
            source: String,
            output: String,
            width: u32,
            height: u32,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(width: u32, height: u32) -> Self {
            Self {
                dimensions: Some(Dimensions { width, height }),
                ..Self::default()
            }
        }

        pub fn failing_resize(width: u32, height: u32) -> Self {
            Self {
                fail_resize: true,
                ..Self::with_dimensions(width, height)
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            self.dimensions
                .ok_or_else(|| BackendError::Unsupported("No mock dimensions".to_string()))
        }

        fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Resize {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                width: params.width,
                height: params.height,
                quality: params.quality.value(),
            });
            if self.fail_resize {
                return Err(BackendError::ProcessingFailed("mock resize failure".into()));
            }
            std::fs::write(&params.output, MOCK_OUTPUT)?;
            Ok(())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(800, 600);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_without_dimensions_fails_identify() {
        let backend = MockBackend::new();
        assert!(matches!(
            backend.identify(Path::new("/x.jpg")),
            Err(BackendError::Unsupported(_))
        ));
    }

    #[test]
    fn mock_records_and_writes_resize() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("out.jpg");
        let backend = MockBackend::new();

        backend
            .resize(&ResizeParams {
                source: "/source.jpg".into(),
                output: output.clone(),
                width: 800,
                height: 600,
                quality: Quality::new(80),
            })
            .unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), MOCK_OUTPUT);
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Resize {
                width: 800,
                height: 600,
                quality: 80,
                ..
            }
        ));
    }
}
