//! The QR request form: a controlled URL input plus the outcome of the last
//! submission.
//!
//! Submission state is an explicit [`Outcome`] variant rather than a set of
//! loose flags. The one orthogonal piece, whether the returned image failed
//! to load, is kept beside it because it is driven by the rendering surface
//! and not by the request.

use crate::backend::{GenerateResponse, QrBackend};
use crate::Result;
use log::{debug, error};

/// The only failure text ever shown to the user
pub const GENERIC_FAILURE: &str = "Failed to generate QR Code. Please try again.";

/// Outcome of the most recent submission
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// A request is in flight; `image` is whatever was stored before it
    Loading { image: Option<String> },
    /// The backend returned an image and no message
    Success { image: String },
    /// The backend returned a message; the image is stored but not shown
    SuccessWithMessage { message: String, image: String },
    /// The request failed; `image` is the pre-submission value
    Failed { reason: String, image: Option<String> },
}

impl Outcome {
    /// Stored `qr_code_url`, regardless of whether it is displayed
    pub fn image(&self) -> Option<&str> {
        match self {
            Outcome::Idle => None,
            Outcome::Loading { image } | Outcome::Failed { image, .. } => image.as_deref(),
            Outcome::Success { image } | Outcome::SuccessWithMessage { image, .. } => {
                Some(image.as_str())
            }
        }
    }
}

/// Whether a submit request actually went out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SubmitStatus {
    /// One request was sent and its result applied
    Completed,
    /// A request was already in flight; nothing was sent
    Busy,
    /// The form was unmounted; nothing was applied
    Unmounted,
}

/// Token for an in-flight request, produced by [`QrForm::begin_submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    seq: u64,
    url: String,
}

impl Submission {
    /// The URL value captured when the submission started
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Form state, owned by a single page or handle
#[derive(Debug, Clone)]
pub struct QrForm {
    url: String,
    outcome: Outcome,
    image_load_failed: bool,
    reset_image_error: bool,
    seq: u64,
}

impl Default for QrForm {
    fn default() -> Self {
        Self::new(true)
    }
}

impl QrForm {
    /// Create an empty form.
    ///
    /// With `reset_image_error` set, a new submission clears a stale
    /// image-load failure. Without it the flag sticks until the form is
    /// dropped.
    pub fn new(reset_image_error: bool) -> Self {
        Self {
            url: String::new(),
            outcome: Outcome::Idle,
            image_load_failed: false,
            reset_image_error,
            seq: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replace the input value (one keystroke)
    pub fn set_url(&mut self, value: impl Into<String>) {
        self.url = value.into();
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.outcome, Outcome::Loading { .. })
    }

    pub fn qr_code_url(&self) -> Option<&str> {
        self.outcome.image()
    }

    pub fn message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::SuccessWithMessage { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn image_load_failed(&self) -> bool {
        self.image_load_failed
    }

    /// Start a submission. Returns `None` while another one is in flight.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.is_loading() {
            return None;
        }
        let image = self.outcome.image().map(str::to_string);
        self.outcome = Outcome::Loading { image };
        if self.reset_image_error {
            self.image_load_failed = false;
        }
        self.seq += 1;
        debug!("submitting {:?} (request #{})", self.url, self.seq);
        Some(Submission {
            seq: self.seq,
            url: self.url.clone(),
        })
    }

    /// Apply the result of a submission started with [`QrForm::begin_submit`].
    ///
    /// Returns `false` if `submission` is not the request in flight.
    pub fn finish_submit(
        &mut self,
        submission: Submission,
        result: Result<GenerateResponse>,
    ) -> bool {
        let previous = match &self.outcome {
            Outcome::Loading { image } if submission.seq == self.seq => image.clone(),
            _ => {
                debug!("dropping stale response for request #{}", submission.seq);
                return false;
            }
        };

        self.outcome = match result {
            Ok(GenerateResponse {
                qr_code_url,
                message: Some(message),
            }) if !message.is_empty() => Outcome::SuccessWithMessage {
                message,
                image: qr_code_url,
            },
            Ok(resp) => Outcome::Success {
                image: resp.qr_code_url,
            },
            Err(e) => {
                error!("Error generating QR code for {:?}: {}", submission.url, e);
                Outcome::Failed {
                    reason: GENERIC_FAILURE.to_string(),
                    image: previous,
                }
            }
        };
        true
    }

    /// Submit the current input through `backend`, blocking until it answers
    pub fn submit<B: QrBackend + ?Sized>(&mut self, backend: &B) -> SubmitStatus {
        let Some(submission) = self.begin_submit() else {
            return SubmitStatus::Busy;
        };
        let result = backend.generate(submission.url());
        self.finish_submit(submission, result);
        SubmitStatus::Completed
    }

    /// The rendering surface could not load the image at `qr_code_url`
    pub fn on_image_load_error(&mut self) {
        self.image_load_failed = true;
    }
}
