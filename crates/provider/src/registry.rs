//! Lookup of the resource types and data sources this provider serves.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::prelude::S3Client;

use crate::diagnostics::Diagnostics;
use crate::resources::{BucketDataSource, BucketResource, ObjectResource, BUCKET, OBJECT};
use crate::schema::ResourceSchema;
use crate::state::ResourceData;

/// Lifecycle handlers of one managed resource type.
///
/// Handlers report failures as diagnostics instead of returning early,
///  and leave `data` describing whatever state they reached. `delete`
///  clears the id only once the remote object is gone.
#[async_trait]
pub trait Resource: Send + Sync {
    fn schema(&self) -> &ResourceSchema;

    /// Static checks run before any remote call
    fn validate(&self, data: &ResourceData) -> Diagnostics {
        self.schema().validate(&data.attributes)
    }

    async fn create(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics;
    async fn read(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics;
    async fn update(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics;
    async fn delete(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics;
}

/// A read-only lookup exposing remote state as computed attributes
#[async_trait]
pub trait DataSource: Send + Sync {
    fn schema(&self) -> &ResourceSchema;

    fn validate(&self, data: &ResourceData) -> Diagnostics {
        self.schema().validate(&data.attributes)
    }

    async fn read(&self, client: &S3Client, data: &mut ResourceData) -> Diagnostics;
}

#[derive(Default, Clone)]
pub struct Registry {
    resources: BTreeMap<String, Arc<dyn Resource>>,
    data_sources: BTreeMap<String, Arc<dyn DataSource>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every resource type and data source shipped with the provider
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_resource(BUCKET, Arc::new(BucketResource::new()));
        registry.register_resource(OBJECT, Arc::new(ObjectResource::new()));
        registry.register_data_source(BUCKET, Arc::new(BucketDataSource::new()));
        registry
    }

    pub fn register_resource(&mut self, name: &str, resource: Arc<dyn Resource>) {
        self.resources.insert(name.to_string(), resource);
    }

    pub fn register_data_source(&mut self, name: &str, data_source: Arc<dyn DataSource>) {
        self.data_sources.insert(name.to_string(), data_source);
    }

    pub fn resource(&self, name: &str) -> Option<Arc<dyn Resource>> {
        self.resources.get(name).cloned()
    }

    pub fn data_source(&self, name: &str) -> Option<Arc<dyn DataSource>> {
        self.data_sources.get(name).cloned()
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_names(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .finish()
    }
}
