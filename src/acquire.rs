//! Image acquisition: turn a picker result into an [`ImageDescriptor`].
//!
//! The device picker itself lives outside this crate and is reached through
//! the [`Picker`] trait. Its result is an explicit [`PickOutcome`], so a
//! dismissed picker is a first-class outcome rather than an error to be
//! string-matched:
//!
//! | Picker says | [`Acquirer::acquire`] returns | User sees |
//! |---|---|---|
//! | `Picked` | `Ok(descriptor)` | nothing yet |
//! | `Cancelled` | `Err(AcquireError::Cancelled)` | nothing |
//! | `Failed` | `Err(AcquireError::Failed)` | the failure |
//!
//! Acquisition only reads the picker result. It does not decode the image and
//! does not touch the upload batch.

use crate::types::{DEFAULT_MIME_TYPE, Dimensions, ImageDescriptor, ImageSource, guess_mime_type};
use async_trait::async_trait;
use log::debug;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    /// The user dismissed the picker. Not an error worth showing.
    #[error("picker dismissed without a selection")]
    Cancelled,
    #[error("could not get an image: {0}")]
    Failed(String),
}

impl AcquireError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AcquireError::Cancelled)
    }
}

/// What the picker handed back for a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedImage {
    pub path: PathBuf,
    pub mime_type: Option<String>,
    pub dimensions: Option<Dimensions>,
}

/// Result of one picker invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(PickedImage),
    Cancelled,
    /// Permission denied, I/O failure, no camera, ...
    Failed(String),
}

/// Gallery/camera picker collaborator.
#[async_trait]
pub trait Picker: Send + Sync {
    async fn pick(&self, source: ImageSource) -> PickOutcome;
}

/// Maps picker results into descriptors.
pub struct Acquirer<P> {
    picker: P,
}

impl<P: Picker> Acquirer<P> {
    pub fn new(picker: P) -> Self {
        Self { picker }
    }

    pub fn picker(&self) -> &P {
        &self.picker
    }

    pub async fn acquire(&self, source: ImageSource) -> Result<ImageDescriptor, AcquireError> {
        match self.picker.pick(source).await {
            PickOutcome::Picked(picked) => {
                let descriptor = descriptor_from_pick(picked);
                debug!(
                    "acquired {} from {} ({})",
                    descriptor.local_path.display(),
                    source,
                    descriptor.mime_type
                );
                Ok(descriptor)
            }
            PickOutcome::Cancelled => Err(AcquireError::Cancelled),
            PickOutcome::Failed(reason) => Err(AcquireError::Failed(reason)),
        }
    }
}

fn descriptor_from_pick(picked: PickedImage) -> ImageDescriptor {
    let mime_type = picked
        .mime_type
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
    let file_name = picked
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.jpg".to_string());
    ImageDescriptor {
        local_path: picked.path,
        mime_type,
        file_name,
        dimensions: picked.dimensions,
        content_id: None,
    }
}

/// Picker over file paths supplied up front, e.g. on the command line.
///
/// Each source has its own queue; every `pick` takes the next path. An empty
/// queue behaves like a dismissed picker.
#[derive(Default)]
pub struct FilePicker {
    queues: Mutex<(VecDeque<PathBuf>, VecDeque<PathBuf>)>,
}

impl FilePicker {
    pub fn new(gallery: Vec<PathBuf>, camera: Vec<PathBuf>) -> Self {
        Self {
            queues: Mutex::new((gallery.into(), camera.into())),
        }
    }

    /// Number of paths not yet handed out, across both sources.
    pub fn remaining(&self) -> usize {
        let queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        queues.0.len() + queues.1.len()
    }

    fn next_path(&self, source: ImageSource) -> Option<PathBuf> {
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        match source {
            ImageSource::Gallery => queues.0.pop_front(),
            ImageSource::Camera => queues.1.pop_front(),
        }
    }
}

#[async_trait]
impl Picker for FilePicker {
    async fn pick(&self, source: ImageSource) -> PickOutcome {
        let Some(path) = self.next_path(source) else {
            return PickOutcome::Cancelled;
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => PickOutcome::Picked(PickedImage {
                mime_type: guess_mime_type(&path).map(str::to_string),
                path,
                dimensions: None,
            }),
            Ok(_) => PickOutcome::Failed(format!("{} is not a file", path.display())),
            Err(e) => PickOutcome::Failed(format!("{}: {}", path.display(), e)),
        }
    }
}
