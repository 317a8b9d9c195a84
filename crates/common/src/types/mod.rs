//! Domain entities and the JSON payloads the management API speaks.

mod acl;
mod bucket;
mod cors;
mod error;
mod object;
mod tag;

pub use acl::{
    AccessControlPolicy, AccessGrant, AclPolicy, CannedAcl, Grant, Grantee, GranteeId, Permission,
    AUTHENTICATED_USERS_URI, CANNED_ACL_HEADER, LOG_DELIVERY_URI, PUBLIC_USERS_URI,
};
pub use bucket::{Bucket, CreateBucketRequest, DeleteObjectsRequest, Owner};
pub use cors::{to_camel_case, CorsConfiguration, CorsRule, DEFAULT_MAX_AGE_SECONDS};
pub use error::ConfigError;
pub use object::StorageObject;
pub use tag::{Tag, TagEntry, TagSet, Tagging};
