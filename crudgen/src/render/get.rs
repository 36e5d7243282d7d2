//! Get operation

use super::templates::TemplateRegistry;
use super::{sql, Operation, OperationRenderer};
use crate::error::Result;
use crate::registry::{Declaration, DeclarationSink};
use crate::state::FieldRoles;
use serde::Serialize;

/// Values placed into the Get template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetContext {
    /// Function-name suffix
    pub suffix: String,
    /// Record type name
    pub model: String,
    /// SELECT keyed on the primary column
    pub query: String,
    /// Scan targets for the returned row
    pub scan: String,
}

impl GetContext {
    /// Build the context from classified roles
    #[must_use]
    pub fn from_roles(roles: &FieldRoles) -> Self {
        let query = format!(
            "{} {}",
            sql::select(&roles.read_field_columns(""), roles.table()),
            sql::where_primary(roles.primary_column(), 1, roles.soft_delete_column()),
        );
        Self {
            suffix: roles.suffix().to_string(),
            model: roles.model().to_string(),
            query,
            scan: roles.read_field_names("&y.").join(", "),
        }
    }
}

/// Renders `Get<Suffix>`
///
/// The generated function propagates `sql.ErrNoRows` from `Scan` unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetRenderer;

impl OperationRenderer for GetRenderer {
    fn operation(&self) -> Operation {
        Operation::Get
    }

    fn render(
        &self,
        roles: &FieldRoles,
        sink: &mut dyn DeclarationSink,
        templates: &TemplateRegistry,
    ) -> Result<String> {
        sink.ensure_declared(Declaration::QueryRower);
        templates.render("get", &GetContext::from_roles(roles))
    }
}
