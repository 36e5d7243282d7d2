//! Delete operation
//!
//! With a soft-delete field the generated statement marks the row instead of
//! removing it. Either way, zero affected rows is reported as
//! `ErrNoRowsAffected` even though the statement itself succeeded.

use super::templates::TemplateRegistry;
use super::{sql, Operation, OperationRenderer};
use crate::error::Result;
use crate::registry::{Declaration, DeclarationSink};
use crate::state::FieldRoles;
use serde::Serialize;

/// Values placed into the Delete template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteContext {
    /// Function-name suffix
    pub suffix: String,
    /// Logical or physical delete statement
    pub query: String,
}

impl DeleteContext {
    /// Build the context from classified roles
    #[must_use]
    pub fn from_roles(roles: &FieldRoles) -> Self {
        let query = match roles.soft_delete_column() {
            Some(column) => sql::soft_delete(roles.table(), roles.primary_column(), column),
            None => sql::delete(roles.table(), roles.primary_column()),
        };
        Self {
            suffix: roles.suffix().to_string(),
            query,
        }
    }
}

/// Renders `Delete<Suffix>`
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteRenderer;

impl OperationRenderer for DeleteRenderer {
    fn operation(&self) -> Operation {
        Operation::Delete
    }

    fn render(
        &self,
        roles: &FieldRoles,
        sink: &mut dyn DeclarationSink,
        templates: &TemplateRegistry,
    ) -> Result<String> {
        sink.ensure_declared(Declaration::Execer);
        sink.ensure_declared(Declaration::NoRowsAffected);
        templates.render("delete", &DeleteContext::from_roles(roles))
    }
}
