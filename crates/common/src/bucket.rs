//! Bucket lifecycle reconciliation.
//!
//! An update applies the desired ACL, then tags, then CORS rules,
//!  each step fully replacing its sub-resource. A failing step stops
//!  the sequence without undoing earlier steps; re-running the update
//!  converges because every step is a full replacement.

use reqwest::Method;
use uuid::Uuid;

use crate::client::S3Client;
use crate::endpoint::Query;
use crate::transport::{ApiError, Request};
use crate::types::{
    AccessGrant, AclPolicy, Bucket, CannedAcl, ConfigError, CorsConfiguration, CorsRule,
    CreateBucketRequest, DeleteObjectsRequest, Tag, Tagging, CANNED_ACL_HEADER,
};

/// Desired state of one bucket as declared by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketSpec {
    pub name: String,
    pub canned_acl: Option<CannedAcl>,
    pub grants: Vec<AccessGrant>,
    pub tags: Vec<Tag>,
    pub cors: Vec<CorsRule>,
}

impl BucketSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn acl_policy(&self) -> Result<AclPolicy, ConfigError> {
        AclPolicy::from_parts(self.canned_acl, &self.grants)
    }

    /// Everything that can be checked without talking to the gateway
    pub fn validate(&self) -> Result<AclPolicy, ConfigError> {
        let policy = self.acl_policy()?;
        for (index, rule) in self.cors.iter().enumerate() {
            rule.validate(index)?;
        }
        Ok(policy)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BucketError {
    #[error("invalid bucket configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("error creating bucket: {0}")]
    Create(#[source] ApiError),
    #[error("error reading bucket: {0}")]
    Read(#[source] ApiError),
    #[error("error decoding bucket {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("error editing bucket ACLs: {0}")]
    Acl(#[source] ApiError),
    #[error("error editing bucket tags: {0}")]
    Tags(#[source] ApiError),
    #[error("error editing bucket CORS: {0}")]
    Cors(#[source] ApiError),
    #[error("error encoding request: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    /// The bulk object removal failed, so the bucket itself was left
    ///  alone. Retrying the whole delete is expected to be safe.
    #[error("error removing objects of bucket {bucket}, bucket not deleted: {source}")]
    ObjectsRemaining {
        bucket: String,
        #[source]
        source: ApiError,
    },
    #[error("error deleting bucket {bucket}: {source}")]
    Bucket {
        bucket: String,
        #[source]
        source: ApiError,
    },
    #[error("error encoding request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DeleteError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeleteError::ObjectsRemaining { .. })
    }
}

impl S3Client {
    /// Create the bucket. The returned id only tracks the resource
    ///  on the caller's side and means nothing to the gateway.
    pub async fn create_bucket(&self, name: &str) -> Result<Uuid, BucketError> {
        tracing::info!("creating bucket {}", name);
        let body = CreateBucketRequest::new(name, self.region());
        let request = Self::json_request(Method::PUT, self.bucket_url(name, None), &body)?;
        self.execute(request).await.map_err(BucketError::Create)?;
        Ok(Uuid::new_v4())
    }

    /// Fetch the bucket's current representation, listing at most one key
    pub async fn get_bucket(&self, name: &str) -> Result<Bucket, BucketError> {
        let request = Request::new(Method::GET, self.bucket_url(name, Some(Query::MaxKeys(1))));
        let raw = self.execute(request).await.map_err(BucketError::Read)?;
        serde_json::from_str(&raw).map_err(|source| {
            tracing::error!("error decoding bucket {}: {}", name, source);
            BucketError::Decode {
                name: name.to_string(),
                source,
            }
        })
    }

    /// Bring the bucket's ACL, tags and CORS rules in line with `spec`.
    ///
    /// Validation happens before any request is sent. Tags and CORS are
    ///  only touched when the spec declares some.
    pub async fn update_bucket(&self, spec: &BucketSpec) -> Result<(), BucketError> {
        let policy = spec.validate()?;

        self.put_bucket_acl(&spec.name, &policy).await?;

        if !spec.tags.is_empty() {
            self.replace_bucket_tags(&spec.name, &spec.tags).await?;
        }

        if !spec.cors.is_empty() {
            self.put_bucket_cors(&spec.name, &spec.cors).await?;
        }

        tracing::info!("bucket {} reconciled", spec.name);
        Ok(())
    }

    /// Replace the bucket's ACL. The bucket is read first to learn the
    ///  owner and tenant the grants are built from.
    pub async fn put_bucket_acl(&self, name: &str, policy: &AclPolicy) -> Result<(), BucketError> {
        let bucket = self.get_bucket(name).await?;
        let payload = policy.to_payload(&bucket);
        tracing::info!(
            "setting ACL of bucket {}: {} grants, canned {:?}",
            name,
            payload.grants.len(),
            policy.canned()
        );

        let mut request = Self::json_request(Method::PUT, self.bucket_url(name, Some(Query::Acl)), &payload)?;
        if let Some(canned) = policy.canned() {
            request = request.header(CANNED_ACL_HEADER, canned.as_str());
        }
        self.execute(request).await.map_err(BucketError::Acl)?;
        Ok(())
    }

    /// Delete every tag on the bucket, then write `tags`
    pub async fn replace_bucket_tags(&self, name: &str, tags: &[Tag]) -> Result<(), BucketError> {
        let url = self.bucket_url(name, Some(Query::Tagging));
        tracing::info!("replacing tags of bucket {} with {} tags", name, tags.len());

        match self.execute(Request::new(Method::DELETE, url.clone())).await {
            Ok(_) => {}
            // nothing to delete
            Err(e) if e.is_not_found() => {
                tracing::debug!("bucket {} had no tags", name);
            }
            Err(e) => return Err(BucketError::Tags(e)),
        }

        let request = Self::json_request(Method::PUT, url, &Tagging::from_tags(tags))?;
        self.execute(request).await.map_err(BucketError::Tags)?;
        Ok(())
    }

    pub async fn put_bucket_cors(&self, name: &str, rules: &[CorsRule]) -> Result<(), BucketError> {
        tracing::info!("setting {} CORS rules on bucket {}", rules.len(), name);
        let request = Self::json_request(
            Method::PUT,
            self.bucket_url(name, Some(Query::Cors)),
            &CorsConfiguration::from_rules(rules),
        )?;
        self.execute(request).await.map_err(BucketError::Cors)?;
        Ok(())
    }

    /// Empty the bucket, then delete it. The bucket delete is never
    ///  sent when emptying fails.
    pub async fn delete_bucket(&self, name: &str) -> Result<(), DeleteError> {
        tracing::info!("removing all objects of bucket {}", name);
        let request = Self::json_request(
            Method::POST,
            self.bucket_url(name, Some(Query::Delete)),
            &DeleteObjectsRequest::remove_all(),
        )?;
        self.execute(request).await.map_err(|source| {
            tracing::error!("error removing objects of bucket {}: {}", name, source);
            DeleteError::ObjectsRemaining {
                bucket: name.to_string(),
                source,
            }
        })?;

        tracing::info!("deleting bucket {}", name);
        self.execute(Request::new(Method::DELETE, self.bucket_url(name, None)))
            .await
            .map_err(|source| DeleteError::Bucket {
                bucket: name.to_string(),
                source,
            })?;
        Ok(())
    }
}
