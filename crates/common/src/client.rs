use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;

use crate::endpoint::{Endpoint, Query};
use crate::token::TokenSource;
use crate::transport::{ApiError, HttpTransport, Request, Transport, TransportOptions};

/// Handle every bucket and object operation runs through: a transport,
///  the gateway endpoint and the region new buckets are created in.
#[derive(Debug, Clone)]
pub struct S3Client {
    transport: Arc<dyn Transport>,
    endpoint: Endpoint,
    region: Option<String>,
}

impl S3Client {
    pub fn new(transport: Arc<dyn Transport>, endpoint: Endpoint, region: Option<String>) -> Self {
        Self {
            transport,
            endpoint,
            region: region.filter(|r| !r.is_empty()),
        }
    }

    /// Connect to the gateway over HTTPS, obtaining a bearer token first.
    pub async fn connect(
        endpoint: Endpoint,
        region: Option<String>,
        options: &TransportOptions,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, ApiError> {
        let transport = HttpTransport::connect(options, tokens).await?;
        Ok(Self::new(Arc::new(transport), endpoint, region))
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub(crate) fn bucket_url(&self, bucket: &str, query: Option<Query>) -> String {
        self.endpoint.bucket_url(bucket, query)
    }

    pub(crate) fn object_url(&self, bucket: &str, key: &str, query: Option<Query>) -> String {
        self.endpoint.object_url(bucket, key, query)
    }

    pub(crate) async fn execute(&self, request: Request) -> Result<String, ApiError> {
        self.transport.execute(request).await
    }

    pub(crate) fn json_request<T: Serialize>(
        method: Method,
        url: String,
        body: &T,
    ) -> Result<Request, serde_json::Error> {
        Ok(Request::new(method, url).json(serde_json::to_string(body)?))
    }
}
