//! # Photo Submit
//!
//! Attach photos to a record (typically a scanned barcode) and submit them to
//! a remote evidence endpoint in one multipart request.
//!
//! # Architecture: Acquire → Transform → Submit
//!
//! Every photo passes through three independent steps before it reaches the
//! network:
//!
//! ```text
//! 1. Acquire    picker      →  ImageDescriptor   (path + MIME, nothing decoded)
//! 2. Transform  descriptor  →  work_dir/*.jpg    (bounded JPEG, content-addressed)
//! 3. Submit     batch       →  POST multipart    (record id + every image)
//! ```
//!
//! The [`session`] owns the batch between steps 2 and 3 and is the only code
//! that mutates it. Collaborators that belong to the host (device picker,
//! HTTP stack, toast display, screen navigation) are traits, so the whole
//! pipeline runs under test without a device or a server.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`acquire`] | Picker trait, explicit cancel/failure outcomes, file-backed picker |
//! | [`transform`] | Re-encodes acquired images within size bounds on the blocking pool |
//! | [`batch`] | Ordered collection of upload-ready descriptors |
//! | [`transport`] | Multipart form model, response verdict, `reqwest` transport |
//! | [`session`] | Submit state machine, notifications, teardown |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`types`] | Descriptors, content ids, record identifiers |
//! | [`naming`] | Upload filename sanitizing and content-addressed names |
//! | [`imaging`] | Pure-Rust image operations: identify, fit, resize, JPEG encode |
//! | [`output`] | CLI output formatting and console collaborators |
//!
//! # Design Decisions
//!
//! ## Cancel Is Not an Error
//!
//! A dismissed picker is a [`acquire::PickOutcome::Cancelled`] value. It
//! never reaches the user as a message and never changes the batch.
//!
//! ## Content Identity
//!
//! Batch entries are identified by the SHA-256 of their source bytes rather
//! than by index. Removing one entry leaves the identity of every other entry
//! intact, and transformed files are named after the same hash.
//!
//! ## No Automatic Retry
//!
//! A failed submission leaves the batch exactly as it was and returns the
//! session to a state that accepts a new `submit`. Retrying is always the
//! user's decision.

pub mod acquire;
pub mod batch;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod session;
pub mod transform;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
