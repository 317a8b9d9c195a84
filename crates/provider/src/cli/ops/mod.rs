pub mod data;
pub mod resource;
pub mod schema;
pub mod version;

pub use data::Data;
pub use resource::Resource;
pub use schema::Schema;
pub use version::Version;

use std::path::Path;

use vos_provider::config::ConnectError;
use vos_provider::diagnostics::Diagnostics;
use vos_provider::state::ResourceData;

use crate::cli::input::load_resource_data;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("invalid input: {0}")]
    Input(String),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("{0}")]
    Diagnostics(Diagnostics),

    #[error("failed to render state: {0}")]
    Output(#[from] serde_json::Error),
}

pub(crate) fn read_input(path: &Path, id: Option<&String>) -> Result<ResourceData, LifecycleError> {
    let mut data =
        load_resource_data(path).map_err(|e| LifecycleError::Input(format!("{:#}", e)))?;
    if let Some(id) = id {
        data.set_id(id.clone());
    }
    Ok(data)
}

/// Log warnings, fail on errors
pub(crate) fn check(diags: Diagnostics) -> Result<(), LifecycleError> {
    for warning in diags.warnings() {
        tracing::warn!("{}", warning);
    }
    if diags.has_errors() {
        return Err(LifecycleError::Diagnostics(diags));
    }
    Ok(())
}

pub(crate) fn render(data: &ResourceData) -> Result<String, LifecycleError> {
    Ok(serde_json::to_string_pretty(data)?)
}
