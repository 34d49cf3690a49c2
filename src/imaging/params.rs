//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! and the [`backend`](super::backend), which does the pixel work.
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 80). Clamped on construction.
//! - [`ResizeConstraints`]: the fixed upload budget: longer-edge cap + quality.
//! - [`ResizeParams`]: one concrete resize: source, output path, target dimensions, quality.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Bounds every upload artifact must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeConstraints {
    /// Maximum length of the longer edge, in pixels.
    pub max_dimension: u32,
    pub quality: Quality,
}

impl Default for ResizeConstraints {
    fn default() -> Self {
        Self {
            max_dimension: 1280,
            quality: Quality::default(),
        }
    }
}

/// Parameters for a simple resize operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_always_fits_the_encoder_byte() {
        let q = Quality::new(u32::MAX).value();
        assert_eq!(q, 100);
        assert_eq!(u8::try_from(q), Ok(100));
    }

    #[test]
    fn quality_default_is_80() {
        assert_eq!(Quality::default().value(), 80);
    }

    #[test]
    fn default_constraints() {
        let c = ResizeConstraints::default();
        assert_eq!(c.max_dimension, 1280);
        assert_eq!(c.quality, Quality::new(80));
    }
}
