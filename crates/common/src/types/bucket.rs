use serde::{Deserialize, Serialize};

/// The principal that holds implicit FULL_CONTROL on a bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
}

/// A bucket as reported by the gateway. Only `name` is ever set by us;
///  the rest is read back on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub name: String,
    #[serde(default)]
    pub tenant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_alt_href: Option<String>,
    #[serde(default)]
    pub owner: Owner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketRequest {
    pub name: String,
    /// Empty when no region is configured
    pub location_constraint: String,
}

impl CreateBucketRequest {
    pub fn new(name: &str, region: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            location_constraint: region.unwrap_or_default().to_string(),
        }
    }
}

/// Body of the bulk "remove everything" call issued before a bucket delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObjectsRequest {
    pub quiet: bool,
    pub remove_all: bool,
    pub delete_version: bool,
    pub try_async: bool,
}

impl DeleteObjectsRequest {
    pub fn remove_all() -> Self {
        Self {
            quiet: true,
            remove_all: true,
            delete_version: true,
            try_async: true,
        }
    }
}
