//! karmic - administrative CLI for the Karmic Matrix store.
//!
//! ```bash
//! karmic identity add someone@example.com
//! karmic interpretation set --category karmicSeal --number 7 --title "Sete" --content-file seven.html
//! karmic report list --email someone@example.com --pretty
//! ```

mod cli;
mod commands;
mod run;

use crate::{cli::Cli, run::CliResult};

use karmic_core::{init_logging, open_db, CoreConfig, SqliteDocumentRepository};
use log::info;
use serde_json::Value;
use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let pretty = cli.pretty;

    match run_cli(cli) {
        Ok(value) => {
            let output = if pretty {
                serde_json::to_string_pretty(&value)
            } else {
                serde_json::to_string(&value)
            };
            match output {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error serializing response: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> CliResult<Value> {
    let mut config = CoreConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.storage.database_path = db;
    }
    config.validate()?;

    if let Some(dir) = &config.logging.dir {
        if let Err(e) = init_logging(&config.logging.level, dir) {
            eprintln!("Warning: file logging disabled: {e}");
        }
    }

    let conn = open_db(&config.storage.database_path)?;
    info!(
        "event=cli_start module=cli status=ok db={}",
        config.storage.database_path.display()
    );
    run::execute(cli.command, SqliteDocumentRepository::durable(&conn))
}
