//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate dimensions that fit inside a square of `max_edge` pixels.
///
/// The longer edge is scaled down to `max_edge` and the shorter edge follows,
/// preserving the aspect ratio. Images that already fit are returned as-is:
/// nothing is ever upscaled, which is what makes a second pass over an
/// already-normalized image a no-op.
///
/// # Arguments
/// * `original` - Source dimensions (width, height)
/// * `max_edge` - Maximum length of the longer edge
///
/// # Examples
/// ```
/// # use photo_submit::imaging::calculate_fit_dimensions;
/// assert_eq!(calculate_fit_dimensions((4000, 3000), 1280), (1280, 960));
/// assert_eq!(calculate_fit_dimensions((800, 600), 1280), (800, 600));
/// ```
pub fn calculate_fit_dimensions(original: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let longer_edge = orig_w.max(orig_h);

    if longer_edge <= max_edge || longer_edge == 0 {
        return original;
    }

    let ratio = max_edge as f64 / longer_edge as f64;
    if orig_w >= orig_h {
        // Landscape or square
        let h = ((orig_h as f64 * ratio).round() as u32).max(1);
        (max_edge, h)
    } else {
        // Portrait
        let w = ((orig_w as f64 * ratio).round() as u32).max(1);
        (w, max_edge)
    }
}
