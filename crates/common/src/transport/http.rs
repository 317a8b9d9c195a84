use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;

use super::{ApiError, Body, Request, Transport};
use crate::token::{TokenCache, TokenSource};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const APPLICATION_JSON: &str = "application/json";

/// Knobs for the underlying reqwest client.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Accept any server certificate. Only meant for gateways
    ///  deployed with self-signed certificates.
    pub insecure: bool,
    pub timeout: Duration,
    /// How long before expiry a cached bearer token is replaced
    pub token_refresh_skew: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
            token_refresh_skew: Duration::from_secs(60),
        }
    }
}

impl TransportOptions {
    pub fn build_client(&self) -> Result<Client, ApiError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(self.insecure)
            .timeout(self.timeout)
            .build()?;
        Ok(client)
    }
}

#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    tokens: TokenCache,
}

impl HttpTransport {
    /// Build the client and exchange credentials for a bearer token.
    ///  Failing to obtain the first token fails construction.
    pub async fn connect(
        options: &TransportOptions,
        source: Arc<dyn TokenSource>,
    ) -> Result<Self, ApiError> {
        let client = options.build_client()?;
        let tokens = TokenCache::fetch(source, options.token_refresh_skew).await?;
        Ok(Self { client, tokens })
    }

    pub fn with_client(client: Client, tokens: TokenCache) -> Self {
        Self { client, tokens }
    }

    /// Translate a [`Request`] into a reqwest request carrying the
    ///  bearer token and content negotiation headers.
    pub fn prepare(&self, request: Request, token: &str) -> Result<reqwest::Request, ApiError> {
        let mut headers = HeaderMap::new();
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidHeader(AUTHORIZATION.to_string()))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        let body = match request.body {
            Body::Empty => {
                json_headers(&mut headers);
                None
            }
            Body::Json(json) => {
                json_headers(&mut headers);
                Some(json.into_bytes())
            }
            Body::Binary { data, content_type } => {
                let value = HeaderValue::from_str(content_type.as_ref())
                    .map_err(|_| ApiError::InvalidHeader(CONTENT_TYPE.to_string()))?;
                headers.insert(CONTENT_TYPE, value);
                Some(data)
            }
        };

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::InvalidHeader(name.clone()))?;
            let value =
                HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader(name.to_string()))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .client
            .request(request.method, request.url.as_str())
            .headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        Ok(builder.build()?)
    }
}

fn json_headers(headers: &mut HeaderMap) {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: Request) -> Result<String, ApiError> {
        let method = request.method.clone();
        let url = request.url.clone();
        if let Some(json) = request.body.as_json() {
            tracing::trace!("{} {} body: {}", method, url, json);
        }

        let token = self.tokens.bearer().await?;
        let prepared = self.prepare(request, &token)?;

        tracing::debug!("{} {}", method, url);
        let response = self.client.execute(prepared).await.map_err(|e| {
            tracing::error!("error sending {} {}: {}", method, url, e);
            e
        })?;

        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            tracing::debug!("{} {} -> {}", method, url, status);
            Ok(text)
        } else {
            tracing::warn!("{} {} -> {}: {}", method, url, status, text);
            Err(ApiError::HttpStatus(status, text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::StaticTokenSource;
    use reqwest::Method;

    async fn transport() -> HttpTransport {
        let source = Arc::new(StaticTokenSource::new("secret-token"));
        HttpTransport::connect(&TransportOptions::default(), source)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_request_headers() {
        let transport = transport().await;
        let request = Request::new(Method::PUT, "https://gw/api/v1/s3/films").json("{}");
        let prepared = transport.prepare(request, "secret-token").unwrap();

        let headers = prepared.headers();
        assert_eq!(headers[AUTHORIZATION], "Bearer secret-token");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(prepared.method(), &Method::PUT);
        assert_eq!(
            prepared.body().and_then(|b| b.as_bytes()),
            Some("{}".as_bytes())
        );
    }

    #[tokio::test]
    async fn test_caller_headers_override_defaults() {
        let transport = transport().await;
        let request = Request::new(Method::PUT, "https://gw/api/v1/s3/films?acl")
            .json("{}")
            .header("x-amz-acl", "public-read")
            .header("Accept", "text/plain");
        let prepared = transport.prepare(request, "t").unwrap();

        let headers = prepared.headers();
        assert_eq!(headers["x-amz-acl"], "public-read");
        assert_eq!(headers.get_all(ACCEPT).iter().count(), 1);
        assert_eq!(headers[ACCEPT], "text/plain");
    }

    #[tokio::test]
    async fn test_binary_request_uses_own_content_type() {
        let transport = transport().await;
        let request = Request::new(Method::PUT, "https://gw/api/v1/s3/films/a.png")
            .binary(vec![1, 2, 3], mime::IMAGE_PNG);
        let prepared = transport.prepare(request, "t").unwrap();

        let headers = prepared.headers();
        assert_eq!(headers[CONTENT_TYPE], "image/png");
        assert!(headers.get(ACCEPT).is_none());
        assert_eq!(
            prepared.body().and_then(|b| b.as_bytes()),
            Some(&[1u8, 2, 3][..])
        );
    }

    #[tokio::test]
    async fn test_invalid_header_name_is_rejected() {
        let transport = transport().await;
        let request = Request::new(Method::GET, "https://gw/x").header("bad header", "v");
        let result = transport.prepare(request, "t");
        assert!(matches!(result, Err(ApiError::InvalidHeader(_))));
    }
}
