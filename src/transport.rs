//! Multipart transport to the evidence endpoint.
//!
//! # Wire format
//!
//! One `POST` per submission, `multipart/form-data`:
//!
//! ```text
//! barcodeNumber = <record identifier>                  (text)
//! images        = <bytes>; filename=...; content-type=... (file, repeated)
//! ```
//!
//! The endpoint answers with JSON carrying an application-level verdict:
//!
//! ```json
//! { "isSuccess": false, "message": "duplicate" }
//! ```
//!
//! The verdict is returned as a [`SubmitResponse`] whatever the HTTP status;
//! interpreting it is the session's job. Anything that prevents getting a
//! verdict at all (unreachable host, timeout, unreadable file, garbage body)
//! is a [`TransportError`].

use crate::batch::UploadBatch;
use crate::config::EndpointConfig;
use crate::types::SubmissionRecord;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Name of the text field carrying the record identifier.
pub const RECORD_FIELD: &str = "barcodeNumber";
/// Name of the repeated file field carrying the images.
pub const IMAGES_FIELD: &str = "images";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unexpected response (HTTP {status}): {detail}")]
    Decode { status: u16, detail: String },
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    /// File contents are read by the transport when the request is built.
    File {
        name: String,
        path: PathBuf,
        file_name: String,
        content_type: String,
    },
}

/// Transport-independent description of a multipart request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    fields: Vec<FormField>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FormField::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        self.fields.push(FormField::File {
            name: name.into(),
            path: path.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
        });
        self
    }

    /// The request for one submission: the record identifier followed by one
    /// `images` part per batch entry, in batch order.
    pub fn for_batch(record: &SubmissionRecord, batch: &UploadBatch) -> Self {
        batch.iter().fold(
            Self::new().text(RECORD_FIELD, record.identifier()),
            |form, image| {
                form.file(
                    IMAGES_FIELD,
                    &image.local_path,
                    &image.file_name,
                    &image.mime_type,
                )
            },
        )
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn file_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| matches!(f, FormField::File { .. }))
            .count()
    }
}

/// Application-level verdict from the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(rename = "isSuccess")]
    pub is_success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubmitResponse {
    pub fn success() -> Self {
        Self {
            is_success: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            message: Some(message.into()),
        }
    }
}

/// Sends a multipart form as one request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_multipart(&self, form: MultipartForm) -> Result<SubmitResponse, TransportError>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    auth_token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &EndpointConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.upload_url(),
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn build_form(form: MultipartForm) -> Result<reqwest::multipart::Form, TransportError> {
        let mut out = reqwest::multipart::Form::new();
        for field in form.fields {
            out = match field {
                FormField::Text { name, value } => out.text(name, value),
                FormField::File {
                    name,
                    path,
                    file_name,
                    content_type,
                } => {
                    let bytes = tokio::fs::read(&path)
                        .await
                        .map_err(|source| TransportError::Io { path, source })?;
                    let part = reqwest::multipart::Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&content_type)?;
                    out.part(name, part)
                }
            };
        }
        Ok(out)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_multipart(&self, form: MultipartForm) -> Result<SubmitResponse, TransportError> {
        debug!("POST {} ({} files)", self.url, form.file_count());
        let body = Self::build_form(form).await?;

        let mut request = self.client.post(&self.url).multipart(body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!("response {}: {}", status, text);

        serde_json::from_str(&text).map_err(|e| TransportError::Decode {
            status,
            detail: e.to_string(),
        })
    }
}
