//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take constraints, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::{ResizeConstraints, ResizeParams};
use crate::types::Dimensions;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &(impl ImageBackend + ?Sized), path: &Path) -> Result<Dimensions> {
    backend.identify(path)
}

/// Plan the resize that brings `original` within `constraints`.
pub fn plan_resize(
    source: &Path,
    output: &Path,
    original: Dimensions,
    constraints: &ResizeConstraints,
) -> ResizeParams {
    let (width, height) = calculate_fit_dimensions(
        (original.width, original.height),
        constraints.max_dimension,
    );

    ResizeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
        quality: constraints.quality,
    }
}

/// Identify `source`, then write an upload-ready JPEG to `output`.
///
/// Returns the dimensions of the written image.
pub fn create_upload_image(
    backend: &(impl ImageBackend + ?Sized),
    source: &Path,
    output: &Path,
    constraints: &ResizeConstraints,
) -> Result<Dimensions> {
    let original = get_dimensions(backend, source)?;
    let params = plan_resize(source, output, original, constraints);
    backend.resize(&params)?;
    Ok(Dimensions {
        width: params.width,
        height: params.height,
    })
}
