//! Lifecycle tests for the object resource

mod common;

use reqwest::{Method, StatusCode};
use serde_json::json;
use vos_provider::prelude::*;

use crate::common::{declare, setup_client, url};

const PNG_BYTES: &[u8] = b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00\x00\x0DIHDR\x00\x00\x00\x01";

fn object() -> std::sync::Arc<dyn Resource> {
    Registry::builtin().resource(OBJECT).unwrap()
}

fn fixture(data: &[u8]) -> (tempfile::TempDir, String) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("poster.bin");
    std::fs::write(&path, data).unwrap();
    let path = path.to_string_lossy().into_owned();
    (dir, path)
}

#[tokio::test]
async fn test_create_uploads_with_detected_type() {
    let (client, transport) = setup_client();
    let (_dir, source) = fixture(PNG_BYTES);
    let resource = object();
    let mut data = declare(
        resource.as_ref(),
        json!({"bucket": "films", "key": "poster.png", "source": source}),
    );
    assert_eq!(data.get("overwrite"), Some(&json!(true)));
    assert!(resource.validate(&data).is_empty());

    let diags = resource.create(&client, &mut data).await;

    assert!(diags.is_empty(), "{}", diags);
    assert!(data.id().is_some());
    assert_eq!(data.get_str("content_type"), Some("image/png"));
    assert!(data.get_str("last_updated").is_some());
    assert_eq!(
        transport.calls(),
        vec![(Method::PUT, url("films/poster.png", Some("overwrite=true")))]
    );
}

#[tokio::test]
async fn test_update_uploads_again_and_keeps_id() {
    let (client, transport) = setup_client();
    let (_dir, source) = fixture(b"plain text\n");
    let resource = object();
    let mut data = declare(
        resource.as_ref(),
        json!({"bucket": "films", "key": "notes", "source": source, "overwrite": false}),
    );
    data.set_id("existing");

    let diags = resource.update(&client, &mut data).await;

    assert!(diags.is_empty(), "{}", diags);
    assert_eq!(data.id(), Some("existing"));
    assert_eq!(data.get_str("content_type"), Some("text/plain; charset=utf-8"));
    assert_eq!(
        transport.calls(),
        vec![(Method::PUT, url("films/notes", Some("overwrite=false")))]
    );
}

#[tokio::test]
async fn test_read_makes_no_request() {
    let (client, transport) = setup_client();
    let resource = object();
    let mut data = declare(
        resource.as_ref(),
        json!({"bucket": "films", "key": "notes", "source": "/nowhere"}),
    );
    data.set_id("existing");
    let before = data.clone();

    let diags = resource.read(&client, &mut data).await;

    assert!(diags.is_empty());
    assert_eq!(data, before);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_missing_source_fails_without_request() {
    let (client, transport) = setup_client();
    let resource = object();
    let mut data = declare(
        resource.as_ref(),
        json!({"bucket": "films", "key": "notes", "source": "/nowhere/at/all"}),
    );

    let diags = resource.create(&client, &mut data).await;

    assert!(diags.has_errors());
    assert_eq!(diags.iter().next().unwrap().summary, "Error uploading object");
    assert_eq!(data.id(), None);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_delete_removes_the_key() {
    let (client, transport) = setup_client();
    let resource = object();
    let mut data = declare(
        resource.as_ref(),
        json!({"bucket": "films", "key": "notes", "source": "/nowhere"}),
    );
    data.set_id("existing");

    let diags = resource.delete(&client, &mut data).await;

    assert!(diags.is_empty(), "{}", diags);
    assert_eq!(data.id(), None);
    assert_eq!(transport.calls(), vec![(Method::DELETE, url("films/notes", None))]);
}

#[tokio::test]
async fn test_rejected_delete_keeps_the_id() {
    let (client, transport) = setup_client();
    transport.fail(Method::DELETE, url("films/notes", None), StatusCode::FORBIDDEN);
    let resource = object();
    let mut data = declare(
        resource.as_ref(),
        json!({"bucket": "films", "key": "notes", "source": "/nowhere"}),
    );
    data.set_id("existing");

    let diags = resource.delete(&client, &mut data).await;

    assert!(diags.has_errors());
    assert_eq!(data.id(), Some("existing"));
}
