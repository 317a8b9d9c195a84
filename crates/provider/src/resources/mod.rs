mod bucket;
mod bucket_data_source;
mod object;

pub use bucket::BucketResource;
pub use bucket_data_source::BucketDataSource;
pub use object::ObjectResource;

use chrono::{SecondsFormat, Utc};
use common::prelude::ConfigError;

use crate::diagnostics::{AttributePath, Diagnostic};

pub const BUCKET: &str = "vcd-object-storage-ext_bucket";
pub const OBJECT: &str = "vcd-object-storage-ext_object";

pub(crate) const LAST_UPDATED: &str = "last_updated";

/// RFC 3339 timestamp stamped on every successful create or update
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn invalid_config(err: &ConfigError, path: AttributePath) -> Diagnostic {
    Diagnostic::error("Invalid configuration", err.to_string()).with_path(path)
}

pub(crate) fn failed(summary: &str, err: &dyn std::error::Error) -> Diagnostic {
    Diagnostic::error(summary, err.to_string())
}
