use async_trait::async_trait;

use common::prelude::S3Client;

use super::failed;
use crate::diagnostics::Diagnostics;
use crate::registry::DataSource;
use crate::schema::{Attribute, ResourceSchema};
use crate::state::ResourceData;

/// Looks up an existing bucket by name
pub struct BucketDataSource {
    schema: ResourceSchema,
}

impl BucketDataSource {
    pub fn new() -> Self {
        Self {
            schema: ResourceSchema::new(
                "An existing bucket on the VCD object storage extension",
                vec![
                    Attribute::string("name").required(),
                    Attribute::string("tenant").computed(),
                    Attribute::string("owner_id").computed(),
                    Attribute::string("owner_display_name").computed(),
                    Attribute::string("s3_href").computed(),
                ],
            ),
        }
    }
}

impl Default for BucketDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for BucketDataSource {
    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn read(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics {
        let name = data.get_str("name").unwrap_or_default().to_string();

        match client.get_bucket(&name).await {
            Ok(bucket) => {
                data.set_id(bucket.name.clone());
                data.set_str("name", bucket.name);
                data.set_str("tenant", bucket.tenant);
                data.set_str("owner_id", bucket.owner.id);
                data.set_str("owner_display_name", bucket.owner.display_name);
                data.set_str("s3_href", bucket.s3_href.unwrap_or_default());
                Diagnostics::new()
            }
            Err(e) => failed("Error reading bucket", &e).into(),
        }
    }
}
