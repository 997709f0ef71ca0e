//! qrform
//!
//! A headless client for URL-to-QR-code generation services. A single form
//! accepts a URL, forwards it to a remote generation endpoint and renders the
//! returned image, with light handling for repeat submissions and images that
//! fail to load.
//!
//! # Features
//!
//! - **HTTP backend** (default, `http` feature): talks to a real service via
//!   `POST /generate-qr/`
//! - **Headless page**: drives the form like a browser would and renders it
//!   as HTML or as a text snapshot
//! - **Async facade**: a worker-backed handle for use from async code
//!
//! # Example
//!
//! ```no_run
//! use qrform::{FormConfig, Page};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FormConfig {
//!     base_url: "http://localhost:8000".to_string(),
//!     ..Default::default()
//! };
//!
//! let mut page = qrform::new_page(config)?;
//! page.type_text("https://example.com");
//! let _ = page.submit();
//! println!("{}", page.render_text());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

pub mod error;
pub use error::{Error, Result};

pub mod backend;
pub mod form;
pub mod resource;
pub mod theme;
pub mod view;

// Headless surface that owns a form and a backend
pub mod page;

// Async-friendly handle (worker-thread-backed)
pub mod async_api;

// reqwest-based backend
#[cfg(feature = "http")]
pub mod http;

pub use async_api::{FormHandle, Session};
pub use backend::{GenerateResponse, MemoryBackend, QrBackend};
pub use form::{Outcome, QrForm, SubmitStatus, GENERIC_FAILURE};
pub use page::Page;
pub use view::View;

/// Default origin of the generation backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration for the form client
///
/// The defaults target a generation backend on `localhost:8000`, load the
/// returned image, and clear a stale image-load failure on every new
/// submission.
///
/// # Examples
///
/// ```
/// let cfg = qrform::FormConfig::default();
/// assert_eq!(cfg.base_url, "http://localhost:8000");
/// assert!(cfg.enable_images);
/// ```
#[derive(Debug, Clone)]
pub struct FormConfig {
    /// Origin (and optional base path) of the generation backend
    pub base_url: String,
    /// User agent string to send with requests
    pub user_agent: String,
    /// Timeout for each request in milliseconds
    pub timeout_ms: u64,
    /// Custom HTTP headers
    pub headers: HashMap<String, String>,
    /// Whether to load the returned image after a successful submission
    pub enable_images: bool,
    /// Whether a new submission clears a previous image-load failure
    pub reset_image_error_on_submit: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("qrform/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: 30000,
            headers: HashMap::new(),
            enable_images: true,
            reset_image_error_on_submit: true,
        }
    }
}

impl FormConfig {
    /// Parse `base_url`, normalized so relative joins keep its path
    #[cfg(feature = "http")]
    pub fn parse_base_url(&self) -> Result<url::Url> {
        let mut base = url::Url::parse(&self.base_url)
            .map_err(|e| Error::ConfigError(format!("invalid base URL {:?}: {}", self.base_url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::ConfigError(format!(
                "unsupported scheme {:?} in base URL",
                base.scheme()
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base)
    }
}

/// Create a page backed by the HTTP backend
#[cfg(feature = "http")]
pub fn new_page(config: FormConfig) -> Result<Page<http::HttpBackend>> {
    let backend = http::HttpBackend::new(config.clone())?;
    Ok(Page::new(backend, config))
}
