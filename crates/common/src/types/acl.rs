use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Bucket, ConfigError, Owner};

/// Request header carrying a canned ACL
pub const CANNED_ACL_HEADER: &str = "x-amz-acl";

pub const AUTHENTICATED_USERS_URI: &str = "http://acs.amazonaws.com/groups/global/AuthenticatedUsers";
pub const PUBLIC_USERS_URI: &str = "http://acs.amazonaws.com/groups/global/AllUsers";
pub const LOG_DELIVERY_URI: &str = "http://acs.amazonaws.com/groups/s3/LogDelivery";

/// Who an [`AccessGrant`] is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grantee {
    #[serde(rename = "TENANT")]
    Tenant,
    #[serde(rename = "AUTHENTICATED")]
    Authenticated,
    #[serde(rename = "PUBLIC")]
    Public,
    #[serde(rename = "SYSTEM-LOGGER")]
    SystemLogger,
}

impl Grantee {
    pub const VALID: &'static str = "TENANT | AUTHENTICATED | PUBLIC | SYSTEM-LOGGER";

    pub fn as_str(&self) -> &'static str {
        match self {
            Grantee::Tenant => "TENANT",
            Grantee::Authenticated => "AUTHENTICATED",
            Grantee::Public => "PUBLIC",
            Grantee::SystemLogger => "SYSTEM-LOGGER",
        }
    }

    /// Identity expression for this grantee on `bucket`
    pub fn resolve(&self, bucket: &Bucket) -> GranteeId {
        match self {
            Grantee::Tenant => GranteeId::id(format!("{}|", bucket.tenant)),
            Grantee::Authenticated => GranteeId::uri(AUTHENTICATED_USERS_URI),
            Grantee::Public => GranteeId::uri(PUBLIC_USERS_URI),
            Grantee::SystemLogger => GranteeId::uri(LOG_DELIVERY_URI),
        }
    }
}

impl FromStr for Grantee {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TENANT" => Ok(Grantee::Tenant),
            "AUTHENTICATED" => Ok(Grantee::Authenticated),
            "PUBLIC" => Ok(Grantee::Public),
            "SYSTEM-LOGGER" => Ok(Grantee::SystemLogger),
            other => Err(ConfigError::InvalidValue {
                attribute: "acl.user",
                kind: "ACL user",
                value: other.to_string(),
                valid: Self::VALID,
            }),
        }
    }
}

impl fmt::Display for Grantee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    FullControl,
    Read,
    Write,
    ReadAcp,
    WriteAcp,
}

impl Permission {
    pub const VALID: &'static str = "FULL_CONTROL | READ | WRITE | READ_ACP | WRITE_ACP";

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::FullControl => "FULL_CONTROL",
            Permission::Read => "READ",
            Permission::Write => "WRITE",
            Permission::ReadAcp => "READ_ACP",
            Permission::WriteAcp => "WRITE_ACP",
        }
    }
}

impl FromStr for Permission {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FULL_CONTROL" => Ok(Permission::FullControl),
            "READ" => Ok(Permission::Read),
            "WRITE" => Ok(Permission::Write),
            "READ_ACP" => Ok(Permission::ReadAcp),
            "WRITE_ACP" => Ok(Permission::WriteAcp),
            other => Err(ConfigError::InvalidValue {
                attribute: "acl.permission",
                kind: "ACL permission",
                value: other.to_string(),
                valid: Self::VALID,
            }),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named access policies the gateway accepts in the `x-amz-acl` header.
///  The last three are gateway extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    GroupReadWrite,
    GroupRead,
    LogDeliveryWrite,
}

impl CannedAcl {
    pub const VALID: &'static str = "private | public-read | public-read-write | authenticated-read | group-read-write | group-read | log-delivery-write";

    pub fn as_str(&self) -> &'static str {
        match self {
            CannedAcl::Private => "private",
            CannedAcl::PublicRead => "public-read",
            CannedAcl::PublicReadWrite => "public-read-write",
            CannedAcl::AuthenticatedRead => "authenticated-read",
            CannedAcl::GroupReadWrite => "group-read-write",
            CannedAcl::GroupRead => "group-read",
            CannedAcl::LogDeliveryWrite => "log-delivery-write",
        }
    }
}

impl FromStr for CannedAcl {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(CannedAcl::Private),
            "public-read" => Ok(CannedAcl::PublicRead),
            "public-read-write" => Ok(CannedAcl::PublicReadWrite),
            "authenticated-read" => Ok(CannedAcl::AuthenticatedRead),
            "group-read-write" => Ok(CannedAcl::GroupReadWrite),
            "group-read" => Ok(CannedAcl::GroupRead),
            "log-delivery-write" => Ok(CannedAcl::LogDeliveryWrite),
            other => Err(ConfigError::InvalidValue {
                attribute: "canned_acl",
                kind: "canned ACL",
                value: other.to_string(),
                valid: Self::VALID,
            }),
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared access-control entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessGrant {
    pub grantee: Grantee,
    pub permission: Permission,
}

impl AccessGrant {
    pub fn new(grantee: Grantee, permission: Permission) -> Self {
        Self {
            grantee,
            permission,
        }
    }
}

/// How a bucket's ACL is to be set. Canned and explicit grants are
///  mutually exclusive; with neither the owner alone gets FULL_CONTROL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclPolicy {
    Default,
    Canned(CannedAcl),
    /// Never empty
    Explicit(Vec<AccessGrant>),
}

impl AclPolicy {
    pub fn from_parts(canned: Option<CannedAcl>, grants: &[AccessGrant]) -> Result<Self, ConfigError> {
        match (canned, grants.is_empty()) {
            (Some(_), false) => Err(ConfigError::ConflictingAcl),
            (Some(canned), true) => Ok(AclPolicy::Canned(canned)),
            (None, false) => Ok(AclPolicy::Explicit(grants.to_vec())),
            (None, true) => Ok(AclPolicy::Default),
        }
    }

    pub fn canned(&self) -> Option<CannedAcl> {
        match self {
            AclPolicy::Canned(canned) => Some(*canned),
            _ => None,
        }
    }

    pub fn grants(&self) -> &[AccessGrant] {
        match self {
            AclPolicy::Explicit(grants) => grants,
            _ => &[],
        }
    }

    /// The payload to PUT on the bucket's acl sub-resource. The owner's
    ///  FULL_CONTROL grant always comes last.
    pub fn to_payload(&self, bucket: &Bucket) -> AccessControlPolicy {
        let mut grants: Vec<Grant> = self
            .grants()
            .iter()
            .map(|g| Grant {
                grantee: g.grantee.resolve(bucket),
                permission: g.permission,
            })
            .collect();
        grants.push(Grant {
            grantee: GranteeId::id(bucket.owner.id.clone()),
            permission: Permission::FullControl,
        });

        AccessControlPolicy {
            owner: bucket.owner.clone(),
            grants,
        }
    }
}

/// Wire identity of a grantee: either a principal id or a group uri
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranteeId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl GranteeId {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            uri: None,
        }
    }

    pub fn uri(uri: impl Into<String>) -> Self {
        Self {
            id: None,
            uri: Some(uri.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub grantee: GranteeId,
    pub permission: Permission,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlPolicy {
    pub owner: Owner,
    pub grants: Vec<Grant>,
}
