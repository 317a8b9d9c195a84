//! Shared helpers for reconciler integration tests
#![allow(dead_code)]

use std::sync::Arc;

use ::common::prelude::*;
use reqwest::Method;
use serde_json::{json, Value};

pub const HOST: &str = "s3.example.com";
pub const OWNER_ID: &str = "acme|alice";

pub fn url(resource: &str, query: Option<&str>) -> String {
    build_url(HOST, API_PATH, resource, query)
}

/// A client wired to an in-memory transport the test can inspect
pub fn setup_client() -> (S3Client, MemoryTransport) {
    let transport = MemoryTransport::new();
    let client = S3Client::new(
        Arc::new(transport.clone()),
        Endpoint::new(HOST),
        Some("eu-1".to_string()),
    );
    (client, transport)
}

pub fn bucket_json(name: &str) -> Value {
    json!({
        "name": name,
        "tenant": "acme",
        "s3Href": format!("https://{}/{}", HOST, name),
        "owner": {"id": OWNER_ID, "displayName": "Alice"}
    })
}

/// Make the gateway report `name` when it is read
pub fn serve_bucket(transport: &MemoryTransport, name: &str) {
    transport.respond(
        Method::GET,
        url(name, Some("max-keys=1")),
        bucket_json(name).to_string(),
    );
}

pub fn body_json(request: &Request) -> Value {
    let raw = request.body.as_json().expect("request has a json body");
    serde_json::from_str(raw).expect("request body is valid json")
}

pub fn owner_grant() -> Value {
    json!({"grantee": {"id": OWNER_ID}, "permission": "FULL_CONTROL"})
}

/// Requests issued with `method`, in order
pub fn with_method(transport: &MemoryTransport, method: Method) -> Vec<Request> {
    transport
        .requests()
        .into_iter()
        .filter(|r| r.method == method)
        .collect()
}
