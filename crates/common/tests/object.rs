//! Integration tests for object uploads

mod common;

use std::io::Write;

use ::common::prelude::*;
use reqwest::{Method, StatusCode};

use crate::common::{setup_client, url};

const PNG_BYTES: &[u8] = b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00\x00\x0DIHDR\x00\x00\x00\x01";

fn write_fixture(name: &str, data: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(data).unwrap();
    (dir, path)
}

#[tokio::test]
async fn test_upload_sniffs_bytes_not_extension() {
    let (client, transport) = setup_client();
    let (_dir, path) = write_fixture("poster.txt", PNG_BYTES);
    let object = StorageObject::new("films", "posters/poster.txt", &path).with_overwrite(false);

    let content_type = client.upload_object(&object).await.unwrap();

    assert_eq!(content_type, mime::IMAGE_PNG);
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::PUT);
    assert_eq!(
        requests[0].url,
        url("films/posters/poster.txt", Some("overwrite=false"))
    );
    assert_eq!(
        requests[0].body,
        Body::Binary {
            data: PNG_BYTES.to_vec(),
            content_type: mime::IMAGE_PNG,
        }
    );
}

#[tokio::test]
async fn test_upload_overwrite_defaults_to_true() {
    let (client, transport) = setup_client();
    let (_dir, path) = write_fixture("notes.png", b"plain text notes\n");
    let object = StorageObject::new("films", "notes", &path);

    let content_type = client.upload_object(&object).await.unwrap();

    assert_eq!(content_type, mime::TEXT_PLAIN_UTF_8);
    assert_eq!(
        transport.calls(),
        vec![(Method::PUT, url("films/notes", Some("overwrite=true")))]
    );
}

#[tokio::test]
async fn test_missing_source_sends_nothing() {
    let (client, transport) = setup_client();
    let object = StorageObject::new("films", "nope", "/definitely/not/here.bin");

    let err = client.upload_object(&object).await.unwrap_err();

    assert!(matches!(err, ObjectError::Io { .. }));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_rejected_upload_is_surfaced() {
    let (client, transport) = setup_client();
    let (_dir, path) = write_fixture("a.bin", &[0, 1, 2, 3]);
    transport.fail(
        Method::PUT,
        url("films/a.bin", Some("overwrite=false")),
        StatusCode::CONFLICT,
    );
    let object = StorageObject::new("films", "a.bin", &path).with_overwrite(false);

    let err = client.upload_object(&object).await.unwrap_err();

    match err {
        ObjectError::Upload { source, .. } => {
            assert_eq!(source.status(), Some(StatusCode::CONFLICT))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_delete_object() {
    let (client, transport) = setup_client();

    client.delete_object("films", "posters/a.png").await.unwrap();

    assert_eq!(
        transport.calls(),
        vec![(Method::DELETE, url("films/posters/a.png", None))]
    );
}
