use crate::commands::Commands;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "karmic")]
#[command(about = "Administrative CLI for the Karmic Matrix data store")]
#[command(version)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Path to config.toml (defaults apply when absent)
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Database file, overrides storage.database_path
    #[arg(long, global = true)]
    pub(crate) db: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub(crate) pretty: bool,
}
