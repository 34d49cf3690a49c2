//! Image transformation: bring an acquired image within upload bounds.
//!
//! Every accepted image is re-encoded as a JPEG whose longer edge is at most
//! [`ResizeConstraints::max_dimension`]. Output files go into the session's
//! work directory and are named after the SHA-256 of the source bytes (see
//! [`naming::upload_file_name`](crate::naming::upload_file_name)).
//!
//! ## Idempotence
//!
//! A descriptor that already lives in the work directory, is a JPEG, and fits
//! the constraints is returned unchanged. Re-running a transform on its own
//! output is therefore safe and yields an identical descriptor.
//!
//! ## Ownership
//!
//! The source file belongs to the picker. The transformer only reads it; the
//! only files it ever deletes are its own outputs, via [`Transformer::discard`].

use crate::imaging::{BackendError, ImageBackend, ResizeConstraints, create_upload_image};
use crate::naming::{file_stem, upload_file_name};
use crate::types::{ContentId, ImageDescriptor};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// Failure to transform one image. Never affects the rest of the batch.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot convert {}: {source}", path.display())]
    Failed {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("conversion of {} was interrupted", path.display())]
    Interrupted { path: PathBuf },
}

/// Resizes acquired images into upload artifacts.
#[derive(Clone)]
pub struct Transformer {
    backend: Arc<dyn ImageBackend>,
    work_dir: PathBuf,
    constraints: ResizeConstraints,
}

impl Transformer {
    pub fn new(
        backend: Arc<dyn ImageBackend>,
        work_dir: impl Into<PathBuf>,
        constraints: ResizeConstraints,
    ) -> Self {
        Self {
            backend,
            work_dir: work_dir.into(),
            constraints,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn constraints(&self) -> &ResizeConstraints {
        &self.constraints
    }

    /// Produce an upload-ready copy of `descriptor`.
    ///
    /// Decoding and encoding run on the blocking pool.
    pub async fn transform(
        &self,
        descriptor: &ImageDescriptor,
    ) -> Result<ImageDescriptor, TransformError> {
        let this = self.clone();
        let input = descriptor.clone();
        let path = descriptor.local_path.clone();
        tokio::task::spawn_blocking(move || this.transform_blocking(&input))
            .await
            .map_err(|_| TransformError::Interrupted { path })?
    }

    /// Remove an artifact this transformer wrote. Files outside the work
    /// directory are left alone.
    pub async fn discard(&self, descriptor: &ImageDescriptor) {
        if !self.owns(&descriptor.local_path) {
            return;
        }
        if let Err(e) = tokio::fs::remove_file(&descriptor.local_path).await {
            debug!(
                "could not remove {}: {}",
                descriptor.local_path.display(),
                e
            );
        }
    }

    fn owns(&self, path: &Path) -> bool {
        path.parent() == Some(self.work_dir.as_path())
    }

    fn is_normalized(&self, descriptor: &ImageDescriptor) -> bool {
        self.owns(&descriptor.local_path)
            && descriptor.mime_type == OUTPUT_MIME_TYPE
            && descriptor.content_id.is_some()
            && descriptor
                .dimensions
                .is_some_and(|d| d.longer_edge() <= self.constraints.max_dimension)
    }

    fn transform_blocking(
        &self,
        descriptor: &ImageDescriptor,
    ) -> Result<ImageDescriptor, TransformError> {
        let source = descriptor.local_path.as_path();
        let unreadable = |e| TransformError::Unreadable {
            path: source.to_path_buf(),
            source: e,
        };
        let failed = |e| TransformError::Failed {
            path: source.to_path_buf(),
            source: e,
        };

        let content_id = ContentId::of_file(source).map_err(unreadable)?;
        if self.is_normalized(descriptor) {
            debug!("{} already normalized", source.display());
            return Ok(descriptor.clone());
        }

        std::fs::create_dir_all(&self.work_dir)
            .map_err(|e| failed(BackendError::Io(e)))?;
        let stem = file_stem(Path::new(&descriptor.file_name));
        let file_name = upload_file_name(&stem, &content_id);
        let output = self.work_dir.join(&file_name);

        let dimensions = create_upload_image(&*self.backend, source, &output, &self.constraints)
            .map_err(failed)?;
        debug!(
            "transformed {} -> {} ({}x{})",
            source.display(),
            output.display(),
            dimensions.width,
            dimensions.height
        );

        Ok(ImageDescriptor {
            local_path: output,
            mime_type: OUTPUT_MIME_TYPE.to_string(),
            file_name,
            dimensions: Some(dimensions),
            content_id: Some(content_id),
        })
    }
}
