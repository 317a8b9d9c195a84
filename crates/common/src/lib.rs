/**
 * The reconciliation engine for object-storage buckets
 *  behind a cloud-director gateway, and the authenticated
 *  transport underneath it.
 */
pub mod bucket;
pub mod client;
/**
 * Deterministic construction of management API urls.
 */
pub mod endpoint;
pub mod object;
pub mod sniff;
/**
 * Bearer token exchange with the identity service,
 *  and the cache that keeps a fresh token around.
 */
pub mod token;
pub mod transport;
pub mod types;

pub mod prelude {
    pub use crate::bucket::{BucketError, BucketSpec, DeleteError};
    pub use crate::client::S3Client;
    pub use crate::endpoint::{build_url, Endpoint, Query, API_PATH};
    pub use crate::object::ObjectError;
    pub use crate::token::{BearerToken, StaticTokenSource, TokenError, TokenSource, VcdTokenSource};
    pub use crate::transport::{
        ApiError, Body, HttpTransport, MemoryTransport, Request, Transport, TransportOptions,
    };
    pub use crate::types::{
        AccessGrant, AclPolicy, Bucket, CannedAcl, ConfigError, CorsRule, Grantee, Owner,
        Permission, StorageObject, Tag,
    };
}
