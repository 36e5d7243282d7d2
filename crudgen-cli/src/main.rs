//! crudgen CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{GenerateCommand, InspectCommand};
use crudgen_cli_lib::observability;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "crudgen")]
#[command(version)]
#[command(about = "Generate Go CRUD data-access functions from struct metadata", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate CRUD functions for a record type
    Generate(GenerateCommand),
    /// Show how a record's fields are classified
    Inspect(InspectCommand),
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    observability::init(cli.verbose)?;

    match cli.command {
        Commands::Generate(cmd) => {
            if !cmd.execute()? {
                return Ok(ExitCode::from(2));
            }
        }
        Commands::Inspect(cmd) => {
            cmd.execute()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
