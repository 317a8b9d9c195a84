use std::fmt;

/// Root of the object-storage management API on the gateway.
pub const API_PATH: &str = "api/v1/s3";

/// Query-string switches understood by the management API.
///  The HTTP verb plus one of these selects the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    MaxKeys(u32),
    Acl,
    Tagging,
    Cors,
    Delete,
    Overwrite(bool),
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::MaxKeys(n) => write!(f, "max-keys={}", n),
            Query::Acl => f.write_str("acl"),
            Query::Tagging => f.write_str("tagging"),
            Query::Cors => f.write_str("cors"),
            Query::Delete => f.write_str("delete"),
            Query::Overwrite(overwrite) => write!(f, "overwrite={}", overwrite),
        }
    }
}

/// Build `https://{host}/{base_path}/{resource}[?{query}]`.
///
/// Nothing is escaped: resource names carrying reserved URL
///  characters must already be encoded by the caller.
pub fn build_url(host: &str, base_path: &str, resource: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => {
            format!("https://{}/{}/{}?{}", host, base_path, resource, query)
        }
        _ => format!("https://{}/{}/{}", host, base_path, resource),
    }
}

/// The gateway host plus the API root every resource path hangs off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    base_path: String,
}

impl Endpoint {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            base_path: API_PATH.to_string(),
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn url(&self, resource: &str, query: Option<Query>) -> String {
        let query = query.map(|q| q.to_string());
        build_url(&self.host, &self.base_path, resource, query.as_deref())
    }

    pub fn bucket_url(&self, bucket: &str, query: Option<Query>) -> String {
        self.url(bucket, query)
    }

    pub fn object_url(&self, bucket: &str, key: &str, query: Option<Query>) -> String {
        self.url(&format!("{}/{}", bucket, key), query)
    }
}
