//! CLI output formatting and the console-side session collaborators.
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! 001 dawn.jpg
//!     Source: photos/dawn.jpg
//!     4000x3000 → 1280x960
//! 002 notes.txt
//!     Source: photos/notes.txt
//!     Error: unsupported image format
//! ```
//!
//! ## Batch
//!
//! ```text
//! Record 4006381333931 (2 images)
//! 001 dawn-1a2b3c4d5e6f.jpg
//!     1280x960, image/jpeg
//! 002 dusk-0f9e8d7c6b5a.jpg
//!     960x1280, image/jpeg
//! ```

use crate::batch::UploadBatch;
use crate::session::{Navigator, Notifier, SubmitError, SubmitOutcome};
use crate::types::{Dimensions, ImageDescriptor, SubmissionRecord};
use log::info;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn format_dimensions(d: Dimensions) -> String {
    format!("{}x{}", d.width, d.height)
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "image" } else { "images" }
}

// ============================================================================
// Check
// ============================================================================

/// What `check` learned about one candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Ready {
        original: Dimensions,
        upload: Dimensions,
    },
    Rejected(String),
}

pub fn format_check_entry(index: usize, path: &Path, result: &CheckResult) -> Vec<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut lines = vec![
        format!("{} {}", format_index(index), name),
        format!("    Source: {}", path.display()),
    ];
    match result {
        CheckResult::Ready { original, upload } if original == upload => {
            lines.push(format!("    {} (unchanged)", format_dimensions(*original)));
        }
        CheckResult::Ready { original, upload } => {
            lines.push(format!(
                "    {} → {}",
                format_dimensions(*original),
                format_dimensions(*upload)
            ));
        }
        CheckResult::Rejected(reason) => lines.push(format!("    Error: {}", reason)),
    }
    lines
}

pub fn print_check_entry(index: usize, path: &Path, result: &CheckResult) {
    for line in format_check_entry(index, path, result) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

fn image_lines(index: usize, image: &ImageDescriptor) -> Vec<String> {
    let mut lines = vec![format!("{} {}", format_index(index), image.file_name)];
    match image.dimensions {
        Some(d) => lines.push(format!("    {}, {}", format_dimensions(d), image.mime_type)),
        None => lines.push(format!("    {}", image.mime_type)),
    }
    lines
}

pub fn format_batch(record: &SubmissionRecord, batch: &UploadBatch) -> Vec<String> {
    let mut lines = vec![format!(
        "Record {} ({} {})",
        record.identifier(),
        batch.len(),
        plural(batch.len())
    )];
    for (i, image) in batch.iter().enumerate() {
        lines.extend(image_lines(i + 1, image));
    }
    lines
}

pub fn print_batch(record: &SubmissionRecord, batch: &UploadBatch) {
    for line in format_batch(record, batch) {
        println!("{}", line);
    }
}

// ============================================================================
// Submit
// ============================================================================

pub fn format_submit_result(result: &Result<SubmitOutcome, SubmitError>) -> String {
    match result {
        Ok(SubmitOutcome::Submitted { images }) => {
            format!("==> Submitted {} {}", images, plural(*images))
        }
        Ok(SubmitOutcome::Abandoned) => "==> Session closed before the response arrived".into(),
        Err(SubmitError::EmptyBatch) => "==> Nothing to submit".into(),
        Err(e) => format!("==> Submission failed: {}", e),
    }
}

// ============================================================================
// Console collaborators
// ============================================================================

/// Shows session notices on stdout.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}

/// There is no previous screen on the command line; remember that the
/// session asked to leave so the caller can report it.
#[derive(Debug, Default)]
pub struct ConsoleNavigator {
    left: AtomicBool,
}

impl ConsoleNavigator {
    pub fn has_left(&self) -> bool {
        self.left.load(Ordering::SeqCst)
    }
}

impl Navigator for ConsoleNavigator {
    fn go_back(&self) {
        info!("leaving upload session");
        self.left.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::descriptor;
    use std::path::PathBuf;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn check_entry_shows_resize() {
        let lines = format_check_entry(
            1,
            &PathBuf::from("photos/dawn.jpg"),
            &CheckResult::Ready {
                original: Dimensions::from((4000, 3000)),
                upload: Dimensions::from((1280, 960)),
            },
        );
        assert_eq!(
            lines,
            [
                "001 dawn.jpg",
                "    Source: photos/dawn.jpg",
                "    4000x3000 → 1280x960"
            ]
        );
    }

    #[test]
    fn check_entry_small_image_unchanged() {
        let d = Dimensions::from((800, 600));
        let lines = format_check_entry(
            2,
            &PathBuf::from("small.png"),
            &CheckResult::Ready {
                original: d,
                upload: d,
            },
        );
        assert_eq!(lines[2], "    800x600 (unchanged)");
    }

    #[test]
    fn check_entry_error() {
        let lines = format_check_entry(
            3,
            &PathBuf::from("notes.txt"),
            &CheckResult::Rejected("unsupported image format".into()),
        );
        assert_eq!(lines[0], "003 notes.txt");
        assert_eq!(lines[2], "    Error: unsupported image format");
    }

    #[test]
    fn batch_listing() {
        let record = SubmissionRecord::new("BC-7").unwrap();
        let mut batch = UploadBatch::new();
        batch.append(descriptor("a"));
        let mut no_dims = descriptor("b");
        no_dims.dimensions = None;
        batch.append(no_dims);

        let lines = format_batch(&record, &batch);

        assert_eq!(
            lines,
            [
                "Record BC-7 (2 images)",
                "001 a.jpg",
                "    100x100, image/jpeg",
                "002 b.jpg",
                "    image/jpeg",
            ]
        );
    }

    #[test]
    fn empty_batch_header() {
        let record = SubmissionRecord::new("BC-7").unwrap();
        assert_eq!(
            format_batch(&record, &UploadBatch::new()),
            ["Record BC-7 (0 images)"]
        );
    }

    #[test]
    fn submit_result_lines() {
        assert_eq!(
            format_submit_result(&Ok(SubmitOutcome::Submitted { images: 1 })),
            "==> Submitted 1 image"
        );
        assert_eq!(
            format_submit_result(&Err(SubmitError::EmptyBatch)),
            "==> Nothing to submit"
        );
        let rejected = format_submit_result(&Err(SubmitError::Application {
            message: Some("duplicate".into()),
        }));
        assert!(rejected.contains("duplicate"));
    }

    #[test]
    fn console_navigator_remembers_leaving() {
        let nav = ConsoleNavigator::default();
        assert!(!nav.has_left());
        nav.go_back();
        assert!(nav.has_left());
    }
}
