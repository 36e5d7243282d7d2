//! Update operation

use super::templates::TemplateRegistry;
use super::{sql, Operation, OperationRenderer};
use crate::error::Result;
use crate::registry::{Declaration, DeclarationSink};
use crate::state::FieldRoles;
use serde::Serialize;

/// Values placed into the Update template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateContext {
    /// Function-name suffix
    pub suffix: String,
    /// Record type name
    pub model: String,
    /// UPDATE ... RETURNING statement
    pub query: String,
    /// Write values followed by the primary value
    pub args: String,
    /// Scan targets for the returned row
    pub scan: String,
}

impl UpdateContext {
    /// Build the context from classified roles
    #[must_use]
    pub fn from_roles(roles: &FieldRoles) -> Self {
        let mut args = roles.write_field_names("x.");
        args.push(format!("x.{}", roles.primary_name()));

        Self {
            suffix: roles.suffix().to_string(),
            model: roles.model().to_string(),
            query: sql::update(
                roles.table(),
                &roles.write_field_columns(""),
                roles.primary_column(),
                roles.soft_delete_column(),
                &roles.read_field_columns(""),
            ),
            args: args.join(", "),
            scan: roles.read_field_names("&y.").join(", "),
        }
    }
}

/// Renders `Update<Suffix>`
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateRenderer;

impl OperationRenderer for UpdateRenderer {
    fn operation(&self) -> Operation {
        Operation::Update
    }

    fn render(
        &self,
        roles: &FieldRoles,
        sink: &mut dyn DeclarationSink,
        templates: &TemplateRegistry,
    ) -> Result<String> {
        sink.ensure_declared(Declaration::QueryRower);
        templates.render("update", &UpdateContext::from_roles(roles))
    }
}
