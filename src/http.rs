//! HTTP backend: talks to a real generation service with a blocking reqwest
//! client.
//!
//! The client is blocking on purpose: the form has exactly one suspension
//! point and the async facade runs backends on their own worker thread.

use crate::backend::{GenerateRequest, GenerateResponse, QrBackend};
use crate::{resource, Error, FormConfig, Result};
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use url::Url;

/// Path of the generation endpoint, relative to the base URL
pub const GENERATE_PATH: &str = "generate-qr/";

/// A [`QrBackend`] backed by HTTP
pub struct HttpBackend {
    client: Client,
    base: Url,
    config: FormConfig,
}

impl HttpBackend {
    pub fn new(config: FormConfig) -> Result<Self> {
        let base = config.parse_base_url()?;

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::ConfigError(format!("invalid header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::ConfigError(format!("invalid value for header {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            config,
        })
    }

    /// Full URL of `POST /generate-qr/`
    pub fn endpoint(&self) -> Result<Url> {
        self.base
            .join(GENERATE_PATH)
            .map_err(|e| Error::ConfigError(format!("cannot build endpoint URL: {}", e)))
    }

    fn send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(self.config.timeout_ms)
        } else {
            Error::RequestError(e.to_string())
        }
    }
}

impl QrBackend for HttpBackend {
    fn generate(&self, url: &str) -> Result<GenerateResponse> {
        let endpoint = self.endpoint()?;
        debug!("POST {}", endpoint);

        let res = self
            .client
            .post(endpoint)
            .json(&GenerateRequest { url })
            .send()
            .map_err(|e| self.send_error(e))?;

        let status = res.status();
        let body = res.text().map_err(|e| self.send_error(e))?;
        if !status.is_success() {
            debug!("generation backend answered {}: {}", status, body);
            return Err(Error::StatusError {
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::DecodeError(e.to_string()))
    }

    fn load_image(&self, src: &str) -> Result<Vec<u8>> {
        if src.starts_with("data:") {
            let bytes = resource::decode_data_url(src)?;
            let kind = resource::check_image(&bytes)?;
            debug!("decoded inline image as {:?}", kind);
            return Ok(bytes);
        }

        // Relative sources resolve against the backend origin
        let target = self
            .base
            .join(src)
            .map_err(|e| Error::ImageLoadError(format!("invalid image source {:?}: {}", src, e)))?;
        debug!("GET {}", target);

        let res = self
            .client
            .get(target.as_str())
            .send()
            .map_err(|e| self.send_error(e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(Error::ImageLoadError(format!("status {}", status)));
        }

        if let Some(ct) = res.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
            if !ct.starts_with("image/") && !ct.starts_with("application/octet-stream") {
                return Err(Error::ImageLoadError(format!("unexpected content type {}", ct)));
            }
        }

        let bytes = res.bytes().map_err(|e| self.send_error(e))?.to_vec();
        let kind = resource::check_image(&bytes)?;
        debug!("loaded {} as {:?}", target, kind);
        Ok(bytes)
    }
}
