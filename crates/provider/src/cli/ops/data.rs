use std::path::PathBuf;

use clap::{Args, Subcommand};

use vos_provider::registry::DataSource as _;
use vos_provider::resources::BUCKET;

use super::{check, read_input, render, LifecycleError};
use crate::cli::op::{Op, OpContext};

/// Look up an existing instance and print its attributes
#[derive(Args, Debug, Clone)]
pub struct Read {
    /// Data source name
    #[arg(long = "type", default_value = BUCKET)]
    pub kind: String,

    /// JSON or TOML file with the lookup arguments
    #[arg(long)]
    pub input: PathBuf,
}

#[async_trait::async_trait]
impl Op for Read {
    type Error = LifecycleError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let source = ctx
            .registry
            .data_source(&self.kind)
            .ok_or_else(|| LifecycleError::UnknownType(self.kind.clone()))?;

        let mut data = read_input(&self.input, None)?;
        check(source.validate(&data))?;

        let client = ctx.client().await?;
        check(source.read(&client, &mut data).await)?;
        render(&data)
    }
}

crate::command_enum! {
    (Read, Read),
}

pub type DataCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Data {
    #[command(subcommand)]
    pub command: DataCommand,
}

#[async_trait::async_trait]
impl Op for Data {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
