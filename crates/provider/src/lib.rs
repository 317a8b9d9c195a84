/**
 * Declarative management of VCD object storage buckets and
 *  objects: schemas the host validates against, the registry of
 *  resource types, and their lifecycle handlers.
 */
pub mod config;
pub mod diagnostics;
pub mod registry;
pub mod resources;
/**
 * Attribute schemas and the per-value validators they reference.
 */
pub mod schema;
pub mod state;

pub mod prelude {
    pub use crate::config::{ConfigFile, ConfigLoadError, ConnectError, ProviderConfig};
    pub use crate::diagnostics::{AttributePath, Diagnostic, Diagnostics, Severity};
    pub use crate::registry::{DataSource, Registry, Resource};
    pub use crate::resources::{BUCKET, OBJECT};
    pub use crate::schema::ResourceSchema;
    pub use crate::state::ResourceData;
}
