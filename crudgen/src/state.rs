//! Per-record generation state
//!
//! [`GenerationState`] is created once per record type by the classifier,
//! mutated by each requested renderer, and consumed once by the assembler.
//!
//! Role sets are ordinal index sets over the record's field arena, so every
//! column list iterates in ascending declaration order.

use crate::error::{GenerateError, Result};
use crate::metadata::{FieldDescriptor, RecordMetadata};
use crate::registry::SharedDeclarationRegistry;
use std::collections::BTreeSet;
use tracing::warn;

/// Functional roles of a record's fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRoles {
    record: RecordMetadata,
    table: String,
    primary: Option<usize>,
    soft_delete: Option<usize>,
    read: BTreeSet<usize>,
    write: BTreeSet<usize>,
    skip_suffix: bool,
}

impl FieldRoles {
    /// Roles with no primary or soft-delete field and empty read/write sets
    #[must_use]
    pub fn new(record: RecordMetadata) -> Self {
        Self {
            table: record.name().to_string(),
            record,
            primary: None,
            soft_delete: None,
            read: BTreeSet::new(),
            write: BTreeSet::new(),
            skip_suffix: false,
        }
    }

    /// Underlying record metadata
    #[must_use]
    pub const fn record(&self) -> &RecordMetadata {
        &self.record
    }

    /// Record type name
    #[must_use]
    pub fn model(&self) -> &str {
        self.record.name()
    }

    /// Table name used in SQL
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Override the table name
    pub fn set_table(&mut self, table: impl Into<String>) {
        self.table = table.into();
    }

    /// Ordinal of the primary field
    #[must_use]
    pub const fn primary(&self) -> Option<usize> {
        self.primary
    }

    /// Ordinal of the soft-delete field
    #[must_use]
    pub const fn soft_delete(&self) -> Option<usize> {
        self.soft_delete
    }

    /// Ordinals of read fields, ascending
    #[must_use]
    pub const fn read(&self) -> &BTreeSet<usize> {
        &self.read
    }

    /// Ordinals of write fields, ascending
    #[must_use]
    pub const fn write(&self) -> &BTreeSet<usize> {
        &self.write
    }

    /// Whether generated function names omit the record name
    #[must_use]
    pub const fn skip_suffix(&self) -> bool {
        self.skip_suffix
    }

    /// Toggle function-name suffixing
    pub fn set_skip_suffix(&mut self, skip: bool) {
        self.skip_suffix = skip;
    }

    /// Use the field named `name` as primary key
    ///
    /// # Errors
    ///
    /// [`GenerateError::FieldNotFound`]; the roles are left untouched.
    pub fn set_primary_field(&mut self, name: &str) -> Result<()> {
        let ordinal = self.resolve(name)?;
        self.primary = Some(ordinal);
        self.write.remove(&ordinal);
        Ok(())
    }

    /// Use the field named `name` as soft-delete marker
    ///
    /// # Errors
    ///
    /// [`GenerateError::FieldNotFound`]; the roles are left untouched.
    pub fn set_soft_delete_field(&mut self, name: &str) -> Result<()> {
        let ordinal = self.resolve(name)?;
        self.soft_delete = Some(ordinal);
        self.read.remove(&ordinal);
        self.write.remove(&ordinal);
        Ok(())
    }

    /// Replace the read set with the named fields
    ///
    /// The soft-delete field is dropped from the set if named.
    ///
    /// # Errors
    ///
    /// [`GenerateError::FieldNotFound`] for the first unknown name; the roles
    /// are left untouched.
    pub fn set_read_fields<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let mut ordinals = self.resolve_all(names)?;
        self.drop_excluded(&mut ordinals, "read", self.soft_delete, None);
        self.read = ordinals;
        Ok(())
    }

    /// Replace the write set with the named fields
    ///
    /// The primary and soft-delete fields are dropped from the set if named.
    ///
    /// # Errors
    ///
    /// [`GenerateError::FieldNotFound`] for the first unknown name; the roles
    /// are left untouched.
    pub fn set_write_fields<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let mut ordinals = self.resolve_all(names)?;
        self.drop_excluded(&mut ordinals, "write", self.soft_delete, self.primary);
        self.write = ordinals;
        Ok(())
    }

    /// Recompute read and write sets as "all fields minus the excluded ones"
    pub fn reset_default_sets(&mut self) {
        let all = 0..self.record.fields().len();
        self.read = all
            .clone()
            .filter(|&i| Some(i) != self.soft_delete)
            .collect();
        self.write = all
            .filter(|&i| Some(i) != self.soft_delete && Some(i) != self.primary)
            .collect();
    }

    fn resolve(&self, name: &str) -> Result<usize> {
        self.record
            .position(name)
            .ok_or_else(|| GenerateError::FieldNotFound {
                name: name.trim().to_string(),
                record: self.model().to_string(),
            })
    }

    fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> Result<BTreeSet<usize>> {
        names.iter().map(|n| self.resolve(n.as_ref())).collect()
    }

    fn drop_excluded(
        &self,
        ordinals: &mut BTreeSet<usize>,
        set: &str,
        soft_delete: Option<usize>,
        primary: Option<usize>,
    ) {
        for excluded in [soft_delete, primary].into_iter().flatten() {
            if ordinals.remove(&excluded) {
                warn!(
                    record = self.model(),
                    field = self.field_name(excluded),
                    set,
                    "dropping field from override, its role excludes it"
                );
            }
        }
    }

    fn descriptor(&self, ordinal: usize) -> Option<&FieldDescriptor> {
        self.record.field(ordinal)
    }

    fn field_name(&self, ordinal: usize) -> &str {
        self.descriptor(ordinal).map_or("", FieldDescriptor::name)
    }

    fn column(&self, ordinal: usize) -> &str {
        self.descriptor(ordinal).map_or("", FieldDescriptor::column)
    }

    /// Read field names in ordinal order, each prefixed
    #[must_use]
    pub fn read_field_names(&self, prefix: &str) -> Vec<String> {
        self.read
            .iter()
            .map(|&i| format!("{prefix}{}", self.field_name(i)))
            .collect()
    }

    /// Read field column names in ordinal order, each prefixed
    #[must_use]
    pub fn read_field_columns(&self, prefix: &str) -> Vec<String> {
        self.read
            .iter()
            .map(|&i| format!("{prefix}{}", self.column(i)))
            .collect()
    }

    /// Write field value expressions in ordinal order
    ///
    /// Fields whose type needs addressable storage are taken by reference.
    #[must_use]
    pub fn write_field_names(&self, prefix: &str) -> Vec<String> {
        self.write
            .iter()
            .filter_map(|&i| self.descriptor(i))
            .map(|f| {
                let amp = if f.shape().requires_reference() { "&" } else { "" };
                format!("{amp}{prefix}{}", f.name())
            })
            .collect()
    }

    /// Write field column names in ordinal order, each prefixed
    #[must_use]
    pub fn write_field_columns(&self, prefix: &str) -> Vec<String> {
        self.write
            .iter()
            .map(|&i| format!("{prefix}{}", self.column(i)))
            .collect()
    }

    /// Declared name of the primary field, empty if none
    #[must_use]
    pub fn primary_name(&self) -> &str {
        self.primary.map_or("", |i| self.field_name(i))
    }

    /// Column of the primary field, empty if none
    #[must_use]
    pub fn primary_column(&self) -> &str {
        self.primary.map_or("", |i| self.column(i))
    }

    /// Column of the soft-delete field
    #[must_use]
    pub fn soft_delete_column(&self) -> Option<&str> {
        self.soft_delete.map(|i| self.column(i))
    }

    /// Suffix appended to generated function names
    #[must_use]
    pub fn suffix(&self) -> &str {
        if self.skip_suffix {
            ""
        } else {
            self.model()
        }
    }
}

/// `$1..$n`
#[must_use]
pub fn placeholders(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("${i}")).collect()
}

/// Everything one generation session accumulates
#[derive(Debug)]
pub struct GenerationState {
    /// Classified field roles
    pub roles: FieldRoles,
    /// Shared declarations and imports requested so far
    pub registry: SharedDeclarationRegistry,
    /// Rendered operation functions, in requested order
    pub body: String,
}

impl GenerationState {
    /// Fresh state around classified roles
    #[must_use]
    pub fn new(roles: FieldRoles) -> Self {
        Self {
            roles,
            registry: SharedDeclarationRegistry::new(),
            body: String::new(),
        }
    }
}
