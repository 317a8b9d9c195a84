use clap::Args;

use vos_provider::registry::{DataSource as _, Resource as _};

use crate::cli::op::{Op, OpContext};

/// Print the attribute schema of every type, or of one
#[derive(Args, Debug, Clone)]
pub struct Schema {
    /// Only show this resource type or data source
    #[arg(long = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown type: {0}")]
    UnknownType(String),
}

#[async_trait::async_trait]
impl Op for Schema {
    type Error = SchemaError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let registry = &ctx.registry;
        let wanted = |name: &str| self.kind.as_deref().map_or(true, |k| k == name);
        let mut out = Vec::new();

        for name in registry.resource_names().filter(|n| wanted(n)) {
            if let Some(resource) = registry.resource(name) {
                out.push(format!("resource {}: {}", name, resource.schema().describe()));
            }
        }
        for name in registry.data_source_names().filter(|n| wanted(n)) {
            if let Some(source) = registry.data_source(name) {
                out.push(format!("data {}: {}", name, source.schema().describe()));
            }
        }

        if out.is_empty() {
            if let Some(kind) = &self.kind {
                return Err(SchemaError::UnknownType(kind.clone()));
            }
        }
        Ok(out.join("\n").trim_end().to_string())
    }
}
