use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, StatusCode};

use super::{ApiError, Request, Transport};

/// In-memory transport that records every request and answers
///  from a table of scripted replies keyed by method and url.
///  Unscripted requests succeed with an empty body.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<MemoryTransportInner>>,
}

#[derive(Debug, Default)]
struct MemoryTransportInner {
    requests: Vec<Request>,
    replies: HashMap<(Method, String), Reply>,
}

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Status(StatusCode, String),
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method url` with a 200 carrying `body`
    pub fn respond(&self, method: Method, url: impl Into<String>, body: impl Into<String>) {
        self.inner
            .lock()
            .replies
            .insert((method, url.into()), Reply::Body(body.into()));
    }

    /// Answer `method url` with a non-success status
    pub fn fail(&self, method: Method, url: impl Into<String>, status: StatusCode) {
        self.inner.lock().replies.insert(
            (method, url.into()),
            Reply::Status(status, status.canonical_reason().unwrap_or("").to_string()),
        );
    }

    pub fn requests(&self) -> Vec<Request> {
        self.inner.lock().requests.clone()
    }

    /// The `(method, url)` pairs issued so far, in order
    pub fn calls(&self) -> Vec<(Method, String)> {
        self.inner
            .lock()
            .requests
            .iter()
            .map(|r| (r.method.clone(), r.url.clone()))
            .collect()
    }

    pub fn clear_requests(&self) {
        self.inner.lock().requests.clear();
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn execute(&self, request: Request) -> Result<String, ApiError> {
        let mut inner = self.inner.lock();
        let reply = inner
            .replies
            .get(&(request.method.clone(), request.url.clone()))
            .cloned();
        inner.requests.push(request);

        match reply {
            None => Ok(String::new()),
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Status(status, text)) => Err(ApiError::HttpStatus(status, text)),
        }
    }
}
