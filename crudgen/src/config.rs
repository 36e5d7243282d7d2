//! Generator configuration
//!
//! Settings are loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `CRUDGEN_` prefix, `__` for nesting)
//! 2. An explicit file, or `./crudgen.toml` when none is given
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # crudgen.toml
//! operations = ["create", "get", "list"]
//! package = "store"
//! table = "foos"
//! primary_field = "ID"
//! soft_delete_field = "DeletedAt"
//! read_fields = ["ID", "Name"]
//! skip_suffix = false
//! format = "check"
//! parallel = false
//! ```

use crate::classify::Overrides;
use crate::error::Result;
use crate::render::Operation;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "crudgen.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CRUDGEN_";

/// Final formatting step applied to assembled source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatMode {
    /// Structural check plus whitespace normalization
    #[default]
    Check,
    /// Emit the assembled text as is
    None,
}

/// Everything one generation run can be configured with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Operations to generate, in output order
    pub operations: Vec<Operation>,
    /// Package name for the output, defaults to the record's package
    pub package: Option<String>,
    /// Table name, defaults to the record name
    pub table: Option<String>,
    /// Fields used by read operations
    pub read_fields: Option<Vec<String>>,
    /// Fields used by write operations
    pub write_fields: Option<Vec<String>>,
    /// Primary key field, defaults to `ID` if present
    pub primary_field: Option<String>,
    /// Soft-delete field, defaults to `DeletedAt` if present
    pub soft_delete_field: Option<String>,
    /// Omit the record name from generated function names
    pub skip_suffix: bool,
    /// Final formatting step
    pub format: FormatMode,
    /// Render operations on separate threads
    pub parallel: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            operations: Operation::ALL.to_vec(),
            package: None,
            table: None,
            read_fields: None,
            write_fields: None,
            primary_field: None,
            soft_delete_field: None,
            skip_suffix: false,
            format: FormatMode::Check,
            parallel: false,
        }
    }
}

impl GeneratorSettings {
    /// Load settings from `./crudgen.toml` (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file contains invalid TOML or a value has the
    /// wrong type.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        Self::figment(local.exists().then_some(local.as_path()))
    }

    /// Load settings from `path` and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file contains invalid TOML or a value has the
    /// wrong type. A missing file contributes nothing.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::figment(Some(path.as_ref()))
    }

    fn figment(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        Ok(figment.extract()?)
    }

    /// Classifier overrides carried by these settings
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            table: self.table.clone(),
            read_fields: self.read_fields.clone(),
            write_fields: self.write_fields.clone(),
            primary_field: self.primary_field.clone(),
            soft_delete_field: self.soft_delete_field.clone(),
            skip_suffix: self.skip_suffix,
        }
    }

    /// Requested operations without repeats, first occurrence kept
    #[must_use]
    pub fn unique_operations(&self) -> Vec<Operation> {
        let mut seen = Vec::with_capacity(self.operations.len());
        for op in &self.operations {
            if !seen.contains(op) {
                seen.push(*op);
            }
        }
        seen
    }
}
