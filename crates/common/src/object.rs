//! Uploading local files as objects.
//!
//! The whole file is read into memory before the PUT; its content
//!  type is sniffed from the bytes, never from the file name.

use std::path::PathBuf;

use mime::Mime;
use reqwest::Method;

use crate::client::S3Client;
use crate::endpoint::Query;
use crate::sniff::detect_content_type;
use crate::transport::{ApiError, Request};
use crate::types::StorageObject;

#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error uploading object {bucket}/{key}: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: ApiError,
    },
    #[error("error deleting object {bucket}/{key}: {source}")]
    Delete {
        bucket: String,
        key: String,
        #[source]
        source: ApiError,
    },
}

impl S3Client {
    /// PUT the object's source file to `{bucket}/{key}?overwrite={bool}`.
    ///  `overwrite` is passed through to the gateway as-is; no existence
    ///  check is made here.
    ///
    /// Returns the content type the object was sent with.
    pub async fn upload_object(&self, object: &StorageObject) -> Result<Mime, ObjectError> {
        let data = tokio::fs::read(&object.source_path)
            .await
            .map_err(|source| ObjectError::Io {
                path: object.source_path.clone(),
                source,
            })?;

        let content_type = detect_content_type(&data);
        tracing::info!(
            "uploading {} ({} bytes, {}) to {}/{}",
            object.source_path.display(),
            data.len(),
            content_type,
            object.bucket,
            object.key
        );

        let url = self.object_url(
            &object.bucket,
            &object.key,
            Some(Query::Overwrite(object.overwrite)),
        );
        let request = Request::new(Method::PUT, url).binary(data, content_type.clone());
        self.execute(request)
            .await
            .map_err(|source| ObjectError::Upload {
                bucket: object.bucket.clone(),
                key: object.key.clone(),
                source,
            })?;
        Ok(content_type)
    }

    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError> {
        tracing::info!("deleting object {}/{}", bucket, key);
        let request = Request::new(Method::DELETE, self.object_url(bucket, key, None));
        self.execute(request)
            .await
            .map_err(|source| ObjectError::Delete {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source,
            })?;
        Ok(())
    }
}
