pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vos")]
#[command(about = "Manage buckets and objects on VCD object storage")]
pub struct Args {
    /// Path to the provider config file (defaults to ~/.vos/config.toml)
    #[arg(long = "config", global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: crate::Command,
}
