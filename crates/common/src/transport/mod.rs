//! Authenticated request/response plumbing.
//!
//! [`Transport`] is the seam between the reconciler and the wire:
//!  [`HttpTransport`] talks to the gateway, [`MemoryTransport`]
//!  records calls and replays scripted answers for tests.

mod error;
mod http;
mod memory;

pub use error::ApiError;
pub use http::{HttpTransport, TransportOptions, DEFAULT_TIMEOUT};
pub use memory::MemoryTransport;

use async_trait::async_trait;
use mime::Mime;
use reqwest::Method;

/// Payload carried by a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    /// Serialized JSON, sent with the JSON content headers
    Json(String),
    /// Raw bytes, sent with only their own content type
    Binary { data: Vec<u8>, content_type: Mime },
}

impl Body {
    pub fn as_json(&self) -> Option<&str> {
        match self {
            Body::Json(json) => Some(json),
            _ => None,
        }
    }
}

/// One round-trip against the management API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub body: Body,
    /// Caller headers, applied after (and over) the defaults
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: Body::Empty,
            headers: Vec::new(),
        }
    }

    pub fn json(mut self, body: impl Into<String>) -> Self {
        self.body = Body::Json(body.into());
        self
    }

    pub fn binary(mut self, data: Vec<u8>, content_type: Mime) -> Self {
        self.body = Body::Binary { data, content_type };
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Perform one authenticated round-trip and return the response text.
    ///
    /// # Returns
    /// * `Ok(String)` - the body of a 2xx response (possibly empty)
    /// * `Err(ApiError::HttpStatus)` - the gateway answered non-2xx
    /// * `Err(ApiError::Transport)` - the request never completed
    async fn execute(&self, request: Request) -> Result<String, ApiError>;
}
