//! Shared test utilities for the photo-submit test suite.
//!
//! Provides synthetic images, canned descriptors, and recording stand-ins
//! for every collaborator the session talks to (picker, transport, notifier,
//! navigator). All of them use `Mutex` rather than `RefCell` so they satisfy
//! the `Send + Sync` bounds on the collaborator traits.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use image::{ImageEncoder, RgbImage};

use crate::acquire::{PickOutcome, PickedImage, Picker};
use crate::session::{Navigator, Notifier};
use crate::transport::{MultipartForm, SubmitResponse, Transport, TransportError};
use crate::types::{ContentId, Dimensions, ImageDescriptor, ImageSource};

// =========================================================================
// Images and descriptors
// =========================================================================

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// A transformed-looking descriptor whose content id is derived from `name`.
pub fn descriptor(name: &str) -> ImageDescriptor {
    ImageDescriptor {
        local_path: format!("/work/{name}.jpg").into(),
        mime_type: "image/jpeg".to_string(),
        file_name: format!("{name}.jpg"),
        dimensions: Some(Dimensions::from((100, 100))),
        content_id: Some(ContentId::of_bytes(name.as_bytes())),
    }
}

/// A picker result for `path` with no MIME type or dimensions.
pub fn picked(path: &Path) -> PickOutcome {
    PickOutcome::Picked(PickedImage {
        path: path.to_path_buf(),
        mime_type: None,
        dimensions: None,
    })
}

// =========================================================================
// Collaborator stand-ins
// =========================================================================

/// Picker that replays a fixed script of outcomes, then reports `Cancelled`.
pub struct ScriptedPicker {
    script: Mutex<VecDeque<PickOutcome>>,
    pub sources: Mutex<Vec<ImageSource>>,
}

impl ScriptedPicker {
    pub fn new(script: Vec<PickOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            sources: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Picker for ScriptedPicker {
    async fn pick(&self, source: ImageSource) -> PickOutcome {
        self.sources.lock().unwrap().push(source);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PickOutcome::Cancelled)
    }
}

/// Transport that records every form and answers from a queue of responses.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<SubmitResponse, TransportError>>>,
    pub forms: Mutex<Vec<MultipartForm>>,
}

impl MockTransport {
    pub fn answering(response: Result<SubmitResponse, TransportError>) -> Self {
        let transport = Self::default();
        transport.responses.lock().unwrap().push_back(response);
        transport
    }

    pub fn then(self, response: Result<SubmitResponse, TransportError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> usize {
        self.forms.lock().unwrap().len()
    }

    pub fn last_form(&self) -> Option<MultipartForm> {
        self.forms.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_multipart(&self, form: MultipartForm) -> Result<SubmitResponse, TransportError> {
        self.forms.lock().unwrap().push(form);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("MockTransport ran out of responses")
    }
}

/// A transport failure that needs no network: an unreadable file.
pub fn io_transport_error() -> TransportError {
    TransportError::Io {
        path: "/gone.jpg".into(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub back_calls: AtomicUsize,
}

impl RecordingNavigator {
    pub fn back_calls(&self) -> usize {
        self.back_calls.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn go_back(&self) {
        self.back_calls.fetch_add(1, Ordering::SeqCst);
    }
}
