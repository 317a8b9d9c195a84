//! Bearer-token provisioning.
//!
//! The identity service is a black box that trades an org plus a
//!  long-lived API token for a short-lived bearer token. The
//!  [`TokenCache`] holds the current token and swaps it out when it
//!  is about to expire.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

/// Org name the directory reserves for provider (system) administrators
pub const SYSTEM_ORG: &str = "system";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid directory url: {0}")]
    Url(#[from] url::ParseError),
    #[error("token request rejected with {0}: {1}")]
    Rejected(StatusCode, String),
    #[error("malformed token response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl BearerToken {
    pub fn new(access_token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the token expires within `skew` of `now`.
    ///  Tokens without an expiry never expire.
    pub fn expires_within(&self, skew: Duration, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let skew = chrono::Duration::from_std(skew).unwrap_or(chrono::Duration::zero());
                expires_at - skew <= now
            }
            None => false,
        }
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[async_trait]
pub trait TokenSource: Send + Sync + fmt::Debug {
    async fn fetch(&self) -> Result<BearerToken, TokenError>;
}

/// Serves a token the caller already holds
#[derive(Clone)]
pub struct StaticTokenSource {
    token: BearerToken,
}

impl StaticTokenSource {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            token: BearerToken::new(access_token, None),
        }
    }
}

impl fmt::Debug for StaticTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenSource").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn fetch(&self) -> Result<BearerToken, TokenError> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Exchanges an API token with the cloud director's OAuth endpoint
///  using the refresh-token grant.
#[derive(Clone)]
pub struct VcdTokenSource {
    client: Client,
    token_url: Url,
    api_token: String,
}

impl VcdTokenSource {
    pub fn new(client: Client, vcd_url: &str, org: &str, api_token: &str) -> Result<Self, TokenError> {
        Ok(Self {
            client,
            token_url: token_url(vcd_url, org)?,
            api_token: api_token.to_string(),
        })
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }
}

/// `{vcd}/oauth/tenant/{org}/token`, or `{vcd}/oauth/provider/token`
///  for the system org. A trailing `/api` on the directory url is dropped.
pub fn token_url(vcd_url: &str, org: &str) -> Result<Url, url::ParseError> {
    let base = vcd_url.trim_end_matches('/');
    let base = base.strip_suffix("/api").unwrap_or(base);
    if org.eq_ignore_ascii_case(SYSTEM_ORG) {
        Url::parse(&format!("{}/oauth/provider/token", base))
    } else {
        Url::parse(&format!("{}/oauth/tenant/{}/token", base, org))
    }
}

impl fmt::Debug for VcdTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VcdTokenSource")
            .field("token_url", &self.token_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenSource for VcdTokenSource {
    async fn fetch(&self) -> Result<BearerToken, TokenError> {
        tracing::debug!("requesting bearer token from {}", self.token_url);
        let response = self
            .client
            .post(self.token_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.api_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::error!("bearer token request rejected: {}", status);
            return Err(TokenError::Rejected(status, text));
        }

        let token: TokenResponse = serde_json::from_str(&text)?;
        let expires_at = token.expires_in.and_then(|secs| {
            let expires_at = expiry_after(Utc::now(), secs);
            if expires_at.is_none() {
                tracing::warn!("token lifetime {}s out of range, treating as non-expiring", secs);
            }
            expires_at
        });
        Ok(BearerToken::new(token.access_token, expires_at))
    }
}

/// `secs` after `now`, or `None` when that instant cannot be represented
fn expiry_after(now: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    chrono::Duration::try_seconds(secs).and_then(|ttl| now.checked_add_signed(ttl))
}

/// The bearer token in use, refreshed lazily on expiry.
#[derive(Debug)]
pub struct TokenCache {
    source: Arc<dyn TokenSource>,
    current: Mutex<BearerToken>,
    skew: Duration,
}

impl TokenCache {
    /// Fetch the first token up front.
    pub async fn fetch(source: Arc<dyn TokenSource>, skew: Duration) -> Result<Self, TokenError> {
        let token = source.fetch().await?;
        Ok(Self {
            source,
            current: Mutex::new(token),
            skew,
        })
    }

    pub async fn bearer(&self) -> Result<String, TokenError> {
        let mut current = self.current.lock().await;
        if current.expires_within(self.skew, Utc::now()) {
            tracing::info!("bearer token about to expire, refreshing");
            *current = self.source.fetch().await?;
        }
        Ok(current.access_token().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingSource {
        calls: AtomicUsize,
        ttl_secs: i64,
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn fetch(&self) -> Result<BearerToken, TokenError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(BearerToken::new(
                format!("token-{}", n),
                Some(Utc::now() + chrono::Duration::seconds(self.ttl_secs)),
            ))
        }
    }

    #[test]
    fn test_expiry_after() {
        let now = Utc::now();
        assert_eq!(expiry_after(now, 60), Some(now + chrono::Duration::seconds(60)));
        assert_eq!(expiry_after(now, i64::MAX), None);
        assert_eq!(expiry_after(now, i64::MIN), None);
    }

    #[test]
    fn test_token_url_tenant() {
        let url = token_url("https://vcd.example.com", "acme").unwrap();
        assert_eq!(url.as_str(), "https://vcd.example.com/oauth/tenant/acme/token");
    }

    #[test]
    fn test_token_url_strips_api_suffix() {
        let url = token_url("https://vcd.example.com/api/", "acme").unwrap();
        assert_eq!(url.as_str(), "https://vcd.example.com/oauth/tenant/acme/token");
    }

    #[test]
    fn test_token_url_provider() {
        let url = token_url("https://vcd.example.com", "System").unwrap();
        assert_eq!(url.as_str(), "https://vcd.example.com/oauth/provider/token");
    }

    #[test]
    fn test_expiry_window() {
        let now = Utc::now();
        let token = BearerToken::new("t", Some(now + chrono::Duration::seconds(30)));
        assert!(token.expires_within(Duration::from_secs(60), now));
        assert!(!token.expires_within(Duration::from_secs(10), now));

        let forever = BearerToken::new("t", None);
        assert!(!forever.expires_within(Duration::from_secs(3600), now));
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = BearerToken::new("super-secret", None);
        assert!(!format!("{:?}", token).contains("super-secret"));
        let source = StaticTokenSource::new("super-secret");
        assert!(!format!("{:?}", source).contains("super-secret"));
    }

    #[tokio::test]
    async fn test_cache_reuses_fresh_token() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            ttl_secs: 3600,
        });
        let cache = TokenCache::fetch(source.clone(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.bearer().await.unwrap(), "token-0");
        assert_eq!(cache.bearer().await.unwrap(), "token-0");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_refreshes_expiring_token() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            ttl_secs: 5,
        });
        let cache = TokenCache::fetch(source.clone(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.bearer().await.unwrap(), "token-1");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
