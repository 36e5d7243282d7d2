//! Field classification
//!
//! Partitions a record's fields into primary, soft-delete, read and write
//! roles.
//!
//! By convention a field declared `ID` is the primary key and a field
//! declared `DeletedAt` is the soft-delete marker; both come from one linear
//! scan in ordinal order, first match wins. Overrides replace the convention.
//! Every override name must match a declared field exactly (after trimming),
//! otherwise classification fails with [`GenerateError::FieldNotFound`] and
//! produces nothing. A field cannot be both primary and soft-delete marker
//! ([`GenerateError::ConflictingRoles`]).

use crate::error::{GenerateError, Result};
use crate::metadata::RecordMetadata;
use crate::state::{FieldRoles, GenerationState};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Field name that is the primary key by convention
pub const DEFAULT_PRIMARY_FIELD: &str = "ID";

/// Field name that is the soft-delete marker by convention
pub const DEFAULT_SOFT_DELETE_FIELD: &str = "DeletedAt";

/// Caller-supplied replacements for the conventional roles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overrides {
    /// Table name, defaults to the record name
    pub table: Option<String>,
    /// Fields used by read operations
    pub read_fields: Option<Vec<String>>,
    /// Fields used by write operations
    pub write_fields: Option<Vec<String>>,
    /// Primary key field
    pub primary_field: Option<String>,
    /// Soft-delete field (a nullable timestamp)
    pub soft_delete_field: Option<String>,
    /// Omit the record name from generated function names
    pub skip_suffix: bool,
}

/// Builds [`GenerationState`] from record metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldClassifier;

impl FieldClassifier {
    /// Classify `record`'s fields, applying `overrides`
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::FieldNotFound`] for the first override name
    /// that matches no field, and [`GenerateError::ConflictingRoles`] when the
    /// primary and soft-delete roles land on the same field.
    pub fn classify(record: RecordMetadata, overrides: &Overrides) -> Result<GenerationState> {
        let by_convention = |name: &'static str| record.position(name).map(|_| name);
        let primary = overrides
            .primary_field
            .as_deref()
            .or_else(|| by_convention(DEFAULT_PRIMARY_FIELD));
        let soft_delete = overrides
            .soft_delete_field
            .as_deref()
            .or_else(|| by_convention(DEFAULT_SOFT_DELETE_FIELD));

        let mut roles = FieldRoles::new(record);
        if let Some(name) = primary {
            roles.set_primary_field(name)?;
        }
        if let Some(name) = soft_delete {
            roles.set_soft_delete_field(name)?;
        }
        if let Some(ordinal) = roles.primary().filter(|&p| Some(p) == roles.soft_delete()) {
            let field = roles
                .record()
                .field(ordinal)
                .map_or_else(String::new, |f| f.name().to_string());
            return Err(GenerateError::ConflictingRoles {
                record: roles.model().to_string(),
                field,
            });
        }

        roles.reset_default_sets();
        if let Some(names) = &overrides.read_fields {
            roles.set_read_fields(names.as_slice())?;
        }
        if let Some(names) = &overrides.write_fields {
            roles.set_write_fields(names.as_slice())?;
        }
        if let Some(table) = &overrides.table {
            roles.set_table(table.trim());
        }
        roles.set_skip_suffix(overrides.skip_suffix);

        debug!(
            record = roles.model(),
            table = roles.table(),
            primary = roles.primary_name(),
            soft_delete = roles.soft_delete_column().unwrap_or(""),
            read = ?roles.read_field_names(""),
            write = ?roles.write_field_columns(""),
            "classified fields"
        );

        Ok(GenerationState::new(roles))
    }
}
