//! The upload session: batch ownership and the submit state machine.
//!
//! One [`UploadSession`] exists per screen visit. It owns the
//! [`UploadBatch`] and is the only thing that mutates it; every operation
//! takes `&mut self`, so acquisition, transformation and submission of one
//! session can never interleave.
//!
//! # State machine
//!
//! ```text
//!            submit (non-empty)
//!   Idle ───────────────────────▶ Submitting ──┬─ isSuccess ──────▶ SuccessTerminal
//!    ▲                                          │
//!    │ (same semantics)                         └─ failure/error ──▶ FailedRecoverable
//!    └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **Idle / FailedRecoverable**: photos may be added or removed; submit is
//!   enabled while the batch is non-empty.
//! - **Submitting**: the request carries a snapshot of the batch. Acquisition
//!   is disabled for the duration rather than buffered.
//! - **SuccessTerminal**: the batch is cleared and, after the settle delay, the
//!   navigator is told to leave the screen. Nothing else is accepted.
//! - **FailedRecoverable**: the batch is untouched and the failure message has
//!   been shown. Retrying is a new, explicit `submit`.
//!
//! Either way `submit` returns only after the settle delay, which is when the
//! caller re-enables its submit affordance.
//!
//! # Teardown
//!
//! A request already in flight is not aborted when the screen goes away.
//! Instead, [`TeardownHandle::tear_down`] marks the session dead and a late
//! response is dropped without clearing the batch, notifying, or navigating.

use crate::acquire::{AcquireError, Acquirer, Picker};
use crate::batch::UploadBatch;
use crate::config::SessionConfig;
use crate::transform::{TransformError, Transformer};
use crate::transport::{MultipartForm, Transport, TransportError};
use crate::types::{ContentId, ImageDescriptor, ImageSource, SubmissionRecord};
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

pub const SUCCESS_MESSAGE: &str = "Photos uploaded successfully.";
pub const EMPTY_BATCH_MESSAGE: &str = "Please select an image.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Shows a short message to the user. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Leaves the current screen.
pub trait Navigator: Send + Sync {
    fn go_back(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    SuccessTerminal,
    FailedRecoverable { message: String },
}

impl SubmissionState {
    /// Whether new photos may join the batch.
    pub fn accepts_acquisitions(&self) -> bool {
        matches!(
            self,
            SubmissionState::Idle | SubmissionState::FailedRecoverable { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::SuccessTerminal)
    }
}

/// Errors from editing the batch.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("a submission is in progress")]
    Busy,
    #[error("the session is closed")]
    Closed,
    #[error(transparent)]
    Acquire(#[from] AcquireError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("no such image in the batch")]
    NotInBatch,
}

/// Errors from [`UploadSession::submit`]. None of them lose batch contents.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("no images selected")]
    EmptyBatch,
    #[error("the session is closed")]
    Closed,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("submission rejected: {}", .message.as_deref().unwrap_or("no reason given"))]
    Application { message: Option<String> },
}

/// Result of a successful `add_photo` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(ImageDescriptor),
    /// The user dismissed the picker; nothing changed.
    Cancelled,
}

/// Result of a `submit` call that reached the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted { images: usize },
    /// The session was torn down while the request was in flight.
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    /// Pause between the result notice and navigating away / re-enabling.
    pub settle_delay: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&SessionConfig> for SessionTimings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            settle_delay: config.settle_delay(),
        }
    }
}

/// Marks a session as gone. Cheap to clone and safe to use from any task.
#[derive(Debug, Clone, Default)]
pub struct TeardownHandle(Arc<AtomicBool>);

impl TeardownHandle {
    pub fn tear_down(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_torn_down(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything outside the pipeline the session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

pub struct UploadSession<P> {
    record: SubmissionRecord,
    acquirer: Acquirer<P>,
    transformer: Transformer,
    collaborators: Collaborators,
    timings: SessionTimings,
    batch: UploadBatch,
    state: SubmissionState,
    teardown: TeardownHandle,
}

impl<P: Picker> UploadSession<P> {
    pub fn new(
        record: SubmissionRecord,
        acquirer: Acquirer<P>,
        transformer: Transformer,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            record,
            acquirer,
            transformer,
            collaborators,
            timings: SessionTimings::default(),
            batch: UploadBatch::new(),
            state: SubmissionState::Idle,
            teardown: TeardownHandle::default(),
        }
    }

    pub fn with_timings(mut self, timings: SessionTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn record(&self) -> &SubmissionRecord {
        &self.record
    }

    pub fn batch(&self) -> &UploadBatch {
        &self.batch
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Whether the submit affordance should be enabled.
    pub fn can_submit(&self) -> bool {
        self.is_live() && self.state.accepts_acquisitions() && !self.batch.is_empty()
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        self.teardown.clone()
    }

    fn is_live(&self) -> bool {
        !self.teardown.is_torn_down()
    }

    fn notify(&self, message: &str) {
        self.collaborators.notifier.notify(message);
    }

    fn check_editable(&self) -> Result<(), SessionError> {
        if !self.is_live() || self.state.is_terminal() {
            return Err(SessionError::Closed);
        }
        if !self.state.accepts_acquisitions() {
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    /// Delete an upload artifact unless a batch entry still points at it.
    async fn release(&self, descriptor: &ImageDescriptor) {
        let shared = self
            .batch
            .iter()
            .any(|d| d.local_path == descriptor.local_path);
        if !shared {
            self.transformer.discard(descriptor).await;
        }
    }

    /// Pick an image, normalize it, and append it to the batch.
    ///
    /// A dismissed picker is `Ok(AddOutcome::Cancelled)` and shows nothing.
    /// Picker and transform failures are shown to the user and leave the
    /// batch as it was.
    pub async fn add_photo(&mut self, source: ImageSource) -> Result<AddOutcome, SessionError> {
        self.check_editable()?;

        let acquired = match self.acquirer.acquire(source).await {
            Ok(descriptor) => descriptor,
            Err(AcquireError::Cancelled) => {
                debug!("{} picker dismissed", source);
                return Ok(AddOutcome::Cancelled);
            }
            Err(e) => {
                warn!("acquisition from {} failed: {}", source, e);
                self.notify(&e.to_string());
                return Err(e.into());
            }
        };

        let ready = match self.transformer.transform(&acquired).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!("{}", e);
                self.notify(&e.to_string());
                return Err(e.into());
            }
        };

        if let Err(e) = self.check_editable() {
            self.release(&ready).await;
            return Err(e);
        }
        self.batch.append(ready.clone());
        info!(
            "added {} ({} in batch for {})",
            ready.file_name,
            self.batch.len(),
            self.record.identifier()
        );
        Ok(AddOutcome::Added(ready))
    }

    /// Drop an image from the batch and delete its upload artifact.
    pub async fn remove_photo(&mut self, id: &ContentId) -> Result<ImageDescriptor, SessionError> {
        self.check_editable()?;
        let removed = self.batch.remove(id).ok_or(SessionError::NotInBatch)?;
        self.release(&removed).await;
        debug!("removed {} ({} left)", removed.file_name, self.batch.len());
        Ok(removed)
    }

    /// Send the whole batch as one multipart request.
    ///
    /// Returns after the settle delay. On success the batch is empty and the
    /// navigator has been invoked; on failure the batch is exactly what it was
    /// before the call.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        if !self.is_live() || self.state.is_terminal() {
            return Err(SubmitError::Closed);
        }
        if self.batch.is_empty() {
            self.notify(EMPTY_BATCH_MESSAGE);
            return Err(SubmitError::EmptyBatch);
        }

        self.state = SubmissionState::Submitting;
        let form = MultipartForm::for_batch(&self.record, &self.batch);
        info!(
            "submitting {} images for {}",
            form.file_count(),
            self.record.identifier()
        );
        let response = self.collaborators.transport.send_multipart(form).await;

        if !self.is_live() {
            info!(
                "session for {} closed; dropping late response",
                self.record.identifier()
            );
            self.state = SubmissionState::Idle;
            return Ok(SubmitOutcome::Abandoned);
        }

        let result = match response {
            Ok(verdict) if verdict.is_success => {
                let uploaded = self.batch.clear();
                self.state = SubmissionState::SuccessTerminal;
                info!("uploaded {} images", uploaded.len());
                self.notify(SUCCESS_MESSAGE);
                for descriptor in &uploaded {
                    self.transformer.discard(descriptor).await;
                }
                Ok(SubmitOutcome::Submitted {
                    images: uploaded.len(),
                })
            }
            Ok(verdict) => {
                let shown = verdict
                    .message
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
                warn!("endpoint rejected submission: {}", shown);
                self.notify(&shown);
                self.state = SubmissionState::FailedRecoverable { message: shown };
                Err(SubmitError::Application {
                    message: verdict.message,
                })
            }
            Err(e) => {
                warn!("upload failed: {}", e);
                self.notify(GENERIC_FAILURE_MESSAGE);
                self.state = SubmissionState::FailedRecoverable {
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                };
                Err(SubmitError::Transport(e))
            }
        };

        tokio::time::sleep(self.timings.settle_delay).await;

        if self.state.is_terminal() && self.is_live() {
            self.collaborators.navigator.go_back();
        }
        result
    }
}
