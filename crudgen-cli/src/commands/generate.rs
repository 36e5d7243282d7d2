//! Generate CRUD functions for one record

use anyhow::{Context, Result};
use clap::Args;
use console::{style, Emoji};
use crudgen::prelude::*;
use crudgen_cli_lib::{Gofmt, SourceArgs};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};

static SUCCESS: Emoji<'_, '_> = Emoji("✓ ", "");
static STALE: Emoji<'_, '_> = Emoji("✗ ", "");

/// Generate Create/Get/List/Update/Delete for a record type
///
/// Examples:
///   crudgen generate Foo --manifest types.json
///   crudgen generate Foo --manifest types.json --fn get --fn delete --output foo_crud.go
///   crudgen generate Foo --field ID:uint64:id --field Name:string:name --pkg store
#[derive(Debug, Args)]
pub struct GenerateCommand {
    #[command(flatten)]
    source: SourceArgs,

    /// Operation to generate, repeatable (create, get, list, update, delete)
    #[arg(long = "fn", value_name = "OP", value_delimiter = ',')]
    operations: Vec<String>,

    /// Write the source to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Compare against --output and report a diff instead of writing
    #[arg(long, requires = "output")]
    check: bool,

    /// Format the result with gofmt from PATH
    #[arg(long)]
    gofmt: bool,

    /// Render operations on separate threads
    #[arg(long)]
    parallel: bool,
}

impl GenerateCommand {
    /// Execute the generate command
    ///
    /// Returns `false` when `--check` found the output file out of date.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An operation name is unknown
    /// - The record cannot be loaded or classified
    /// - The output file cannot be read or written
    pub fn execute(&self) -> Result<bool> {
        let mut settings = self.source.settings()?;
        if !self.operations.is_empty() {
            settings.operations = self
                .operations
                .iter()
                .map(|op| op.parse::<Operation>())
                .collect::<crudgen::error::Result<_>>()?;
        }
        settings.parallel |= self.parallel;

        let mut generator = CrudGenerator::new(settings)?;
        if self.gofmt {
            generator = generator.with_formatter(Box::new(Gofmt::default()));
        }

        let record = self.source.record.trim();
        let generated = self
            .source
            .source()?
            .generate(&generator, record)
            .with_context(|| format!("Failed to generate CRUD functions for {record}"))?;

        match &self.output {
            None => {
                print!("{}", generated.text);
                Ok(true)
            }
            Some(path) if self.check => check_file(path, &generated.text),
            Some(path) => {
                write_file(path, &generated.text)?;
                eprintln!(
                    "{}Wrote {} ({} functions) to {}",
                    SUCCESS,
                    style(&generated.record).cyan().bold(),
                    generator.settings().unique_operations().len(),
                    style(path.display()).green()
                );
                Ok(true)
            }
        }
    }
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

fn check_file(path: &Path, text: &str) -> Result<bool> {
    let current = match fs::read_to_string(path) {
        Ok(current) => current,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    if current == text {
        eprintln!("{}{} is up to date", SUCCESS, style(path.display()).green());
        return Ok(true);
    }

    eprintln!("{}{} is out of date", STALE, style(path.display()).red().bold());
    let diff = TextDiff::from_lines(current.as_str(), text);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => print!("{}", style(format!("-{change}")).red()),
            ChangeTag::Insert => print!("{}", style(format!("+{change}")).green()),
            ChangeTag::Equal => print!(" {change}"),
        }
    }
    Ok(false)
}
