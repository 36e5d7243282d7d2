//! Create operation

use super::templates::TemplateRegistry;
use super::{sql, Operation, OperationRenderer};
use crate::error::Result;
use crate::registry::{Declaration, DeclarationSink};
use crate::state::FieldRoles;
use serde::Serialize;

/// Values placed into the Create template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateContext {
    /// Function-name suffix
    pub suffix: String,
    /// Record type name
    pub model: String,
    /// INSERT ... RETURNING statement
    pub query: String,
    /// Write values, comma separated; empty when nothing is written
    pub args: String,
    /// Scan targets for the returned row
    pub scan: String,
}

impl CreateContext {
    /// Build the context from classified roles
    #[must_use]
    pub fn from_roles(roles: &FieldRoles) -> Self {
        Self {
            suffix: roles.suffix().to_string(),
            model: roles.model().to_string(),
            query: sql::insert(
                roles.table(),
                &roles.write_field_columns(""),
                &roles.read_field_columns(""),
            ),
            args: roles.write_field_names("x.").join(", "),
            scan: roles.read_field_names("&y.").join(", "),
        }
    }
}

/// Renders `Create<Suffix>`
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateRenderer;

impl OperationRenderer for CreateRenderer {
    fn operation(&self) -> Operation {
        Operation::Create
    }

    fn render(
        &self,
        roles: &FieldRoles,
        sink: &mut dyn DeclarationSink,
        templates: &TemplateRegistry,
    ) -> Result<String> {
        sink.ensure_declared(Declaration::QueryRower);
        templates.render("create", &CreateContext::from_roles(roles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SharedDeclarationRegistry;
    use crate::render::fixtures;

    #[test]
    fn test_create_context() {
        let ctx = CreateContext::from_roles(&fixtures::foo(true));
        assert_eq!(ctx.query, "INSERT INTO Foo (name) VALUES ($1) RETURNING id, name");
        assert_eq!(ctx.args, "x.Name");
        assert_eq!(ctx.scan, "&y.ID, &y.Name");
    }

    #[test]
    fn test_render_create() {
        let mut registry = SharedDeclarationRegistry::new();
        let templates = TemplateRegistry::new().unwrap();
        let text = CreateRenderer
            .render(&fixtures::foo(true), &mut registry, &templates)
            .unwrap();

        assert!(text.contains("func CreateFoo(db cruderQueryRower, x Foo) (*Foo, error) {"));
        assert!(text.contains("`INSERT INTO Foo (name) VALUES ($1) RETURNING id, name`,\n\t\tx.Name,\n"));
        assert!(text.contains(").Scan(&y.ID, &y.Name)"));
        assert!(registry.is_declared(Declaration::QueryRower));
    }

    #[test]
    fn test_render_create_without_write_fields() {
        let mut roles = fixtures::foo(false);
        roles.set_write_fields::<&str>(&[]).unwrap();
        let mut registry = SharedDeclarationRegistry::new();
        let templates = TemplateRegistry::new().unwrap();
        let text = CreateRenderer.render(&roles, &mut registry, &templates).unwrap();

        assert!(text.contains("`INSERT INTO Foo DEFAULT VALUES RETURNING id, name`,\n\t).Scan("));
    }
}
