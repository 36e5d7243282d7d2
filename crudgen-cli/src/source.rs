//! Record metadata and settings from command-line arguments
//!
//! A record comes either from a JSON package manifest produced by an
//! external Go type checker, or from inline `Name:type[:column]` specs.

use anyhow::{bail, Context, Result};
use clap::Args;
use crudgen::prelude::*;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Arguments shared by every command that needs one record
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Record type name (e.g. `Foo`)
    pub record: String,

    /// JSON package manifest describing the record
    #[arg(long, value_name = "FILE", conflicts_with = "fields")]
    pub manifest: Option<PathBuf>,

    /// Inline field definition, repeatable (e.g. `ID:uint64:id`)
    #[arg(long = "field", value_name = "NAME:TYPE[:COLUMN]")]
    pub fields: Vec<String>,

    /// Table name, defaults to the record name
    #[arg(long)]
    pub table: Option<String>,

    /// Comma-separated fields used by read operations
    #[arg(long = "readfields", value_delimiter = ',')]
    pub read_fields: Option<Vec<String>>,

    /// Comma-separated fields used by write operations
    #[arg(long = "writefields", value_delimiter = ',')]
    pub write_fields: Option<Vec<String>>,

    /// Primary key field, defaults to `ID`
    #[arg(long = "primaryfield")]
    pub primary_field: Option<String>,

    /// Soft-delete field, defaults to `DeletedAt`
    #[arg(long = "softdeletefield")]
    pub soft_delete_field: Option<String>,

    /// Omit the record name from generated function names
    #[arg(long = "skipsuffix")]
    pub skip_suffix: bool,

    /// Output package name
    #[arg(long = "pkg")]
    pub package: Option<String>,

    /// Configuration file (default: ./crudgen.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl SourceArgs {
    /// Load configuration and apply the flags on top, field by field
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn settings(&self) -> Result<GeneratorSettings> {
        let mut settings = match &self.config {
            Some(path) => GeneratorSettings::load_from(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => GeneratorSettings::load().context("Failed to load configuration")?,
        };

        if let Some(table) = &self.table {
            settings.table = Some(table.clone());
        }
        if let Some(names) = &self.read_fields {
            settings.read_fields = Some(names.clone());
        }
        if let Some(names) = &self.write_fields {
            settings.write_fields = Some(names.clone());
        }
        if let Some(name) = &self.primary_field {
            settings.primary_field = Some(name.clone());
        }
        if let Some(name) = &self.soft_delete_field {
            settings.soft_delete_field = Some(name.clone());
        }
        if let Some(package) = &self.package {
            settings.package = Some(package.clone());
        }
        settings.skip_suffix |= self.skip_suffix;

        debug!(?settings, "resolved settings");
        Ok(settings)
    }

    /// Resolve where the record's metadata comes from
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or decoded, a field
    /// spec is malformed, or neither a manifest nor fields were given.
    pub fn source(&self) -> Result<RecordSource> {
        if let Some(path) = &self.manifest {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
            let manifest = PackageManifest::from_json(&json)
                .with_context(|| format!("Invalid manifest: {}", path.display()))?;
            return Ok(RecordSource::Manifest(manifest));
        }

        if self.fields.is_empty() {
            bail!("Either --manifest or at least one --field is required");
        }

        let specs = self
            .fields
            .iter()
            .map(|f| FieldSpec::parse(f))
            .collect::<crudgen::error::Result<Vec<_>>>()?;
        Ok(RecordSource::Inline(RecordMetadata::new(
            self.record.trim(),
            specs,
        )?))
    }
}

/// Where one record's metadata was loaded from
#[derive(Debug, Clone)]
pub enum RecordSource {
    /// A package manifest that may hold many records
    Manifest(PackageManifest),
    /// A single record built from inline field specs
    Inline(RecordMetadata),
}

impl RecordSource {
    /// Metadata for `name`
    ///
    /// # Errors
    ///
    /// Returns the manifest lookup error if `name` is missing or not a struct.
    pub fn record(&self, name: &str) -> Result<RecordMetadata> {
        match self {
            Self::Manifest(manifest) => Ok(manifest.lookup(name)?),
            Self::Inline(record) => Ok(record.clone()),
        }
    }

    /// Generate source for `name`
    ///
    /// Inline records have no package of their own, so the generator's
    /// settings must name one.
    ///
    /// # Errors
    ///
    /// Returns any generation error, or an error if an inline record has no
    /// package.
    pub fn generate(&self, generator: &CrudGenerator, name: &str) -> Result<GeneratedSource> {
        match self {
            Self::Manifest(manifest) => Ok(generator.generate_from(manifest, name)?),
            Self::Inline(record) => {
                let Some(package) = generator.settings().package.clone() else {
                    bail!("--pkg is required when fields are given with --field");
                };
                Ok(generator.generate(record.clone(), &package)?)
            }
        }
    }
}
