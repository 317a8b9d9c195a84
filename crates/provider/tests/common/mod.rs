//! Shared helpers for resource lifecycle tests
#![allow(dead_code)]

use std::sync::Arc;

use ::common::prelude::*;
use reqwest::Method;
use serde_json::{json, Value};
use vos_provider::prelude::*;

pub const HOST: &str = "s3.example.com";
pub const OWNER_ID: &str = "acme|alice";

pub fn url(resource: &str, query: Option<&str>) -> String {
    build_url(HOST, API_PATH, resource, query)
}

pub fn setup_client() -> (S3Client, MemoryTransport) {
    let transport = MemoryTransport::new();
    let client = S3Client::new(Arc::new(transport.clone()), Endpoint::new(HOST), None);
    (client, transport)
}

pub fn serve_bucket(transport: &MemoryTransport, name: &str) {
    transport.respond(
        Method::GET,
        url(name, Some("max-keys=1")),
        json!({
            "name": name,
            "tenant": "acme",
            "s3Href": format!("https://{}/{}", HOST, name),
            "owner": {"id": OWNER_ID, "displayName": "Alice"}
        })
        .to_string(),
    );
}

/// Declared attributes with the schema's defaults filled in
pub fn declare(resource: &dyn Resource, attributes: Value) -> ResourceData {
    let Value::Object(map) = attributes else {
        panic!("attributes must be an object");
    };
    let mut data = ResourceData::new(map);
    resource.schema().apply_defaults(&mut data.attributes);
    data
}
