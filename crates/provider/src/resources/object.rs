use async_trait::async_trait;
use uuid::Uuid;

use common::prelude::{S3Client, StorageObject};

use super::{failed, now, LAST_UPDATED};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::registry::Resource;
use crate::schema::{Attribute, ResourceSchema};
use crate::state::ResourceData;

pub struct ObjectResource {
    schema: ResourceSchema,
}

impl ObjectResource {
    pub fn new() -> Self {
        Self {
            schema: ResourceSchema::new(
                "An object uploaded from a local file",
                vec![
                    Attribute::string(LAST_UPDATED).computed(),
                    Attribute::string("bucket").required().force_new(),
                    Attribute::string("key").required().force_new(),
                    Attribute::string("source")
                        .required()
                        .describe("Path of the local file to upload"),
                    Attribute::bool("overwrite")
                        .default_value(true)
                        .describe("Passed to the gateway as the overwrite query flag"),
                    Attribute::string("content_type")
                        .computed()
                        .describe("Content type detected from the file's bytes"),
                ],
            ),
        }
    }

    fn object(data: &ResourceData) -> Result<StorageObject, Diagnostics> {
        data.decode()
            .map_err(|e| Diagnostic::error("Invalid object configuration", e.to_string()).into())
    }

    async fn upload(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics {
        let object = match Self::object(data) {
            Ok(object) => object,
            Err(diags) => return diags,
        };

        match client.upload_object(&object).await {
            Ok(content_type) => {
                if data.id().is_none() {
                    data.set_id(Uuid::new_v4().to_string());
                }
                data.set_str("content_type", content_type.to_string());
                data.set_str(LAST_UPDATED, now());
                Diagnostics::new()
            }
            Err(e) => failed("Error uploading object", &e).into(),
        }
    }
}

impl Default for ObjectResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for ObjectResource {
    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics {
        self.upload(client, data).await
    }

    /// Objects are not read back from the gateway
    async fn read(&self, _client: &S3Client, _data: &mut ResourceData) -> Diagnostics {
        Diagnostics::new()
    }

    async fn update(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics {
        self.upload(client, data).await
    }

    async fn delete(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics {
        let object = match Self::object(data) {
            Ok(object) => object,
            Err(diags) => return diags,
        };

        match client.delete_object(&object.bucket, &object.key).await {
            Ok(()) => {
                data.clear_id();
                Diagnostics::new()
            }
            Err(e) => failed("Error deleting object", &e).into(),
        }
    }
}
