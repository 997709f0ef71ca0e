//! The seam between the form and the QR generation service.
//!
//! The form never talks HTTP itself. It only needs something that can turn a
//! URL into a [`GenerateResponse`] and, when the page wants to display the
//! result, something that can fetch the bytes behind `qr_code_url`.

use crate::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Body of `POST /generate-qr/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest<'a> {
    pub url: &'a str,
}

/// Successful response from the generation backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// URL or path of the generated image
    pub qr_code_url: String,
    /// Optional informational message, e.g. "QR code already exists"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GenerateResponse {
    pub fn new(qr_code_url: impl Into<String>) -> Self {
        Self {
            qr_code_url: qr_code_url.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Core trait for generation backends
pub trait QrBackend {
    /// Ask the backend to generate (or look up) a QR code for `url`.
    ///
    /// Exactly one outbound request per call; implementations must not retry.
    fn generate(&self, url: &str) -> Result<GenerateResponse>;

    /// Fetch the image resource referenced by a `qr_code_url`.
    ///
    /// Returns an error when the resource would fail to load in a browser:
    /// unreachable, non-success status, or bytes that are not an image.
    fn load_image(&self, src: &str) -> Result<Vec<u8>>;
}

impl<B: QrBackend + ?Sized> QrBackend for Box<B> {
    fn generate(&self, url: &str) -> Result<GenerateResponse> {
        (**self).generate(url)
    }

    fn load_image(&self, src: &str) -> Result<Vec<u8>> {
        (**self).load_image(src)
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Respond(GenerateResponse),
    Status(u16),
}

/// A deterministic in-memory backend.
///
/// Useful in tests and demos where no generation service is running. URLs
/// without a configured reply answer with a 404 status failure, and image
/// sources without configured bytes fail to load.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    replies: Mutex<HashMap<String, Reply>>,
    images: Mutex<HashMap<String, Vec<u8>>>,
    generate_calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with a successful response
    pub fn with_reply(self, url: impl Into<String>, response: GenerateResponse) -> Self {
        self.set_reply(url, response);
        self
    }

    /// Answer `url` with a non-success status
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        lock(&self.replies).insert(url.into(), Reply::Status(status));
        self
    }

    /// Serve `bytes` for the image source `src`
    pub fn with_image(self, src: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        lock(&self.images).insert(src.into(), bytes.into());
        self
    }

    pub fn set_reply(&self, url: impl Into<String>, response: GenerateResponse) {
        lock(&self.replies).insert(url.into(), Reply::Respond(response));
    }

    /// Number of `generate` calls observed so far
    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }
}

impl QrBackend for MemoryBackend {
    fn generate(&self, url: &str) -> Result<GenerateResponse> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.replies).get(url) {
            Some(Reply::Respond(resp)) => Ok(resp.clone()),
            Some(Reply::Status(status)) => Err(Error::StatusError { status: *status }),
            None => Err(Error::StatusError { status: 404 }),
        }
    }

    fn load_image(&self, src: &str) -> Result<Vec<u8>> {
        if src.starts_with("data:") {
            let bytes = crate::resource::decode_data_url(src)?;
            let kind = crate::resource::check_image(&bytes)?;
            debug!("decoded inline image as {:?}", kind);
            return Ok(bytes);
        }
        let bytes = lock(&self.images)
            .get(src)
            .cloned()
            .ok_or_else(|| Error::ImageLoadError(format!("no resource at {}", src)))?;
        let kind = crate::resource::check_image(&bytes)?;
        debug!("loaded {} as {:?}", src, kind);
        Ok(bytes)
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
