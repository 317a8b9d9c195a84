use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_overwrite() -> bool {
    true
}

/// A local file to be uploaded as `bucket/key`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageObject {
    pub bucket: String,
    pub key: String,
    #[serde(rename = "source")]
    pub source_path: PathBuf,
    /// Advisory; the gateway decides what to do with an existing key
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

impl StorageObject {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            source_path: source_path.into(),
            overwrite: true,
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}
