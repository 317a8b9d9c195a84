use async_trait::async_trait;
use serde::Deserialize;

use common::prelude::{
    AccessGrant, BucketError, BucketSpec, CannedAcl, ConfigError, CorsRule, DeleteError,
    Grantee, Permission, S3Client, Tag,
};

use super::{failed, invalid_config, now, LAST_UPDATED};
use crate::diagnostics::{AttributePath, Diagnostic, Diagnostics};
use crate::registry::Resource;
use crate::schema::{validators, Attribute, Block, ResourceSchema};
use crate::state::ResourceData;

#[derive(Debug, Deserialize)]
struct AclEntry {
    user: String,
    permission: String,
}

/// Declared attributes as the host hands them over, before the enum
///  values are checked
#[derive(Debug, Deserialize)]
struct BucketAttributes {
    name: String,
    #[serde(default)]
    canned_acl: Option<String>,
    #[serde(default)]
    tag: Vec<Tag>,
    #[serde(default)]
    acl: Vec<AclEntry>,
    #[serde(default)]
    cors: Vec<CorsRule>,
}

pub(crate) fn bucket_schema() -> ResourceSchema {
    ResourceSchema::new(
        "A bucket on the VCD object storage extension",
        vec![
            Attribute::string(LAST_UPDATED).computed(),
            Attribute::string("name")
                .required()
                .force_new()
                .describe("The bucket name. It must be URL encoded."),
            Attribute::string("canned_acl")
                .validator(validators::canned_acl)
                .describe("Predefined grant set. Conflicts with acl."),
            Attribute::list(
                "tag",
                Block::new(vec![
                    Attribute::string("name").required(),
                    Attribute::string("value").required(),
                ]),
            )
            .describe("Replaces every tag on the bucket"),
            Attribute::list(
                "acl",
                Block::new(vec![
                    Attribute::string("user")
                        .required()
                        .validator(validators::acl_user),
                    Attribute::string("permission")
                        .required()
                        .validator(validators::acl_permission),
                ]),
            )
            .describe("Explicit grants. The owner always keeps FULL_CONTROL."),
            Attribute::list(
                "cors",
                Block::new(vec![
                    Attribute::string_list("allowed_headers"),
                    Attribute::string_list("expose_headers"),
                    Attribute::string_list("allowed_methods").required().min_items(1),
                    Attribute::string_list("allowed_origins").required().min_items(1),
                    Attribute::int("max_age_seconds").default_value(3600),
                ]),
            ),
            Attribute::string("tenant").computed(),
            Attribute::string("owner_id").computed(),
            Attribute::string("owner_display_name").computed(),
        ],
    )
}

/// Parse the declared attributes into a [`BucketSpec`], collecting
///  every problem instead of stopping at the first
pub(crate) fn bucket_spec(data: &ResourceData) -> Result<BucketSpec, Diagnostics> {
    let attrs: BucketAttributes = data.decode().map_err(|e| {
        Diagnostics::from(Diagnostic::error("Invalid bucket configuration", e.to_string()))
    })?;

    let mut diags = Diagnostics::new();
    let root = AttributePath::root();

    let canned_acl = match attrs.canned_acl.as_deref() {
        None | Some("") => None,
        Some(value) => match value.parse::<CannedAcl>() {
            Ok(canned) => Some(canned),
            Err(e) => {
                diags.push(invalid_config(&e, root.attribute("canned_acl")));
                None
            }
        },
    };

    let mut grants = Vec::with_capacity(attrs.acl.len());
    for (i, entry) in attrs.acl.iter().enumerate() {
        let path = root.attribute("acl").index(i);
        let user = entry.user.parse::<Grantee>();
        let permission = entry.permission.parse::<Permission>();
        match (user, permission) {
            (Ok(user), Ok(permission)) => grants.push(AccessGrant::new(user, permission)),
            (user, permission) => {
                if let Err(e) = user {
                    diags.push(invalid_config(&e, path.attribute("user")));
                }
                if let Err(e) = permission {
                    diags.push(invalid_config(&e, path.attribute("permission")));
                }
            }
        }
    }

    if attrs.canned_acl.as_deref().map_or(false, |c| !c.is_empty()) && !attrs.acl.is_empty() {
        diags.push(invalid_config(&ConfigError::ConflictingAcl, root.attribute("acl")));
    }

    if diags.has_errors() {
        return Err(diags);
    }

    let spec = BucketSpec {
        name: attrs.name,
        canned_acl,
        grants,
        tags: attrs.tag,
        cors: attrs.cors,
    };
    // cors list sizes
    if let Err(e) = spec.validate() {
        return Err(invalid_config(&e, AttributePath::parse(&e.attribute())).into());
    }
    Ok(spec)
}

fn update_failure(err: &BucketError) -> Diagnostics {
    let mut diags = Diagnostics::new();
    match err {
        BucketError::Config(e) => {
            diags.push(invalid_config(e, AttributePath::parse(&e.attribute())));
        }
        BucketError::Acl(_) => diags.push(failed("Error editing bucket ACLs", err)),
        BucketError::Tags(_) | BucketError::Cors(_) => {
            let summary = if matches!(err, BucketError::Tags(_)) {
                "Error editing bucket TAGs"
            } else {
                "Error editing bucket CORS"
            };
            diags.push(failed(summary, err));
            diags.push(Diagnostic::warning(
                "Bucket partially updated",
                "Earlier steps were applied and are not rolled back. Re-running the update converges.",
            ));
        }
        BucketError::Encode(_) => diags.push(failed("Error encoding bucket request", err)),
        _ => diags.push(failed("Error reading bucket owner", err)),
    }
    diags
}

pub struct BucketResource {
    schema: ResourceSchema,
}

impl BucketResource {
    pub fn new() -> Self {
        Self {
            schema: bucket_schema(),
        }
    }
}

impl Default for BucketResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for BucketResource {
    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn validate(&self, data: &ResourceData) -> Diagnostics {
        let mut diags = self.schema.validate(&data.attributes);
        if diags.has_errors() {
            return diags;
        }
        if let Err(spec_diags) = bucket_spec(data) {
            diags.extend(spec_diags);
        }
        diags
    }

    async fn create(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics {
        let spec = match bucket_spec(data) {
            Ok(spec) => spec,
            Err(diags) => return diags,
        };

        match client.create_bucket(&spec.name).await {
            Ok(id) => data.set_id(id.to_string()),
            Err(e) => return failed("Error creating bucket", &e).into(),
        }

        let mut diags = self.update(client, data).await;
        if diags.has_errors() {
            return diags;
        }
        diags.extend(self.read(client, data).await);
        diags
    }

    async fn read(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics {
        let name = match data.get_str("name") {
            Some(name) => name.to_string(),
            None => {
                return Diagnostic::error("Error reading bucket", "bucket has no name")
                    .with_path(AttributePath::parse("name"))
                    .into()
            }
        };

        match client.get_bucket(&name).await {
            Ok(bucket) => {
                data.set_str("name", bucket.name);
                data.set_str("tenant", bucket.tenant);
                data.set_str("owner_id", bucket.owner.id);
                data.set_str("owner_display_name", bucket.owner.display_name);
                Diagnostics::new()
            }
            // the id is kept: the bucket may well still exist
            Err(e) => Diagnostic::error(
                "Error reading bucket",
                format!("{}. The bucket's state is unknown.", e),
            )
            .into(),
        }
    }

    async fn update(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics {
        let spec = match bucket_spec(data) {
            Ok(spec) => spec,
            Err(diags) => return diags,
        };

        match client.update_bucket(&spec).await {
            Ok(()) => {
                data.set_str(LAST_UPDATED, now());
                Diagnostics::new()
            }
            Err(e) => update_failure(&e),
        }
    }

    async fn delete(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics {
        let Some(name) = data.get_str("name").map(str::to_string) else {
            return Diagnostic::error("Error deleting bucket", "bucket has no name")
                .with_path(AttributePath::parse("name"))
                .into();
        };

        match client.delete_bucket(&name).await {
            Ok(()) => {
                data.clear_id();
                Diagnostics::new()
            }
            Err(e @ DeleteError::ObjectsRemaining { .. }) => Diagnostic::error(
                "Error deleting objects of bucket",
                format!("{}. The bucket was kept; retrying the delete is safe.", e),
            )
            .into(),
            Err(e) => failed("Error deleting bucket", &e).into(),
        }
    }
}
