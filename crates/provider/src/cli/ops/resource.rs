use std::path::PathBuf;

use clap::{Args, Subcommand};

use vos_provider::registry::Resource as _;
use vos_provider::resources::BUCKET;

use super::{check, read_input, render, LifecycleError};
use crate::cli::op::{Op, OpContext};

/// Which resource instance an operation acts on
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Resource type name
    #[arg(long = "type", default_value = BUCKET)]
    pub kind: String,

    /// JSON or TOML file with the instance's attributes or full state
    #[arg(long)]
    pub input: PathBuf,

    /// Instance id, overriding any id in the input
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Create,
    Read,
    Update,
    Delete,
}

async fn run(ctx: &OpContext, target: &Target, stage: Stage) -> Result<String, LifecycleError> {
    let resource = ctx
        .registry
        .resource(&target.kind)
        .ok_or_else(|| LifecycleError::UnknownType(target.kind.clone()))?;

    let mut data = read_input(&target.input, target.id.as_ref())?;
    if matches!(stage, Stage::Create | Stage::Update) {
        resource.schema().apply_defaults(&mut data.attributes);
        check(resource.validate(&data))?;
    }

    let client = ctx.client().await?;
    tracing::debug!("{:?} {} {:?}", stage, target.kind, data.id());
    let diags = match stage {
        Stage::Create => resource.create(&client, &mut data).await,
        Stage::Read => resource.read(&client, &mut data).await,
        Stage::Update => resource.update(&client, &mut data).await,
        Stage::Delete => resource.delete(&client, &mut data).await,
    };
    check(diags)?;
    render(&data)
}

/// Create the instance and print its resulting state
#[derive(Args, Debug, Clone)]
pub struct Create {
    #[command(flatten)]
    pub target: Target,
}

/// Refresh the instance's computed attributes
#[derive(Args, Debug, Clone)]
pub struct Read {
    #[command(flatten)]
    pub target: Target,
}

/// Apply the declared attributes to an existing instance
#[derive(Args, Debug, Clone)]
pub struct Update {
    #[command(flatten)]
    pub target: Target,
}

/// Remove the instance
#[derive(Args, Debug, Clone)]
pub struct Delete {
    #[command(flatten)]
    pub target: Target,
}

macro_rules! stage_op {
    ($type:ident) => {
        #[async_trait::async_trait]
        impl Op for $type {
            type Error = LifecycleError;
            type Output = String;

            async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
                run(ctx, &self.target, Stage::$type).await
            }
        }
    };
}

stage_op!(Create);
stage_op!(Read);
stage_op!(Update);
stage_op!(Delete);

crate::command_enum! {
    (Create, Create),
    (Read, Read),
    (Update, Update),
    (Delete, Delete),
}

pub type ResourceCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Resource {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[async_trait::async_trait]
impl Op for Resource {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
