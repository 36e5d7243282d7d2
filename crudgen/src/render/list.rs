//! List operation
//!
//! The generated function assembles its statement at run time: the static
//! SELECT, an optional soft-delete predicate, the caller's filter and sort
//! order, then LIMIT/OFFSET when they are non-zero.

use super::templates::TemplateRegistry;
use super::{sql, Operation, OperationRenderer};
use crate::error::Result;
use crate::registry::{Declaration, DeclarationSink, IMPORT_FMT, IMPORT_STRINGS};
use crate::state::FieldRoles;
use serde::Serialize;

/// Values placed into the List template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListContext {
    /// Function-name suffix
    pub suffix: String,
    /// Record type name
    pub model: String,
    /// `SELECT <read columns> FROM <table>`
    pub select: String,
    /// `WHERE <soft delete> IS NULL`, empty without a soft-delete field
    pub soft_delete_where: String,
    /// Keyword joining the caller's filter: `AND` after a soft-delete clause, else `WHERE`
    pub filter_join: String,
    /// Scan targets for each row
    pub scan: String,
}

impl ListContext {
    /// Build the context from classified roles
    #[must_use]
    pub fn from_roles(roles: &FieldRoles) -> Self {
        let (soft_delete_where, filter_join) = roles.soft_delete_column().map_or_else(
            || (String::new(), "WHERE"),
            |column| (format!("WHERE {}", sql::is_null(column)), "AND"),
        );
        Self {
            suffix: roles.suffix().to_string(),
            model: roles.model().to_string(),
            select: sql::select(&roles.read_field_columns(""), roles.table()),
            soft_delete_where,
            filter_join: filter_join.to_string(),
            scan: roles.read_field_names("&e.").join(", "),
        }
    }
}

/// Renders `List<Suffix>`
#[derive(Debug, Clone, Copy, Default)]
pub struct ListRenderer;

impl OperationRenderer for ListRenderer {
    fn operation(&self) -> Operation {
        Operation::List
    }

    fn render(
        &self,
        roles: &FieldRoles,
        sink: &mut dyn DeclarationSink,
        templates: &TemplateRegistry,
    ) -> Result<String> {
        sink.ensure_declared(Declaration::Queryer);
        sink.ensure_declared(Declaration::SqlFilter);
        sink.ensure_declared(Declaration::SqlSorter);
        sink.require_import(IMPORT_FMT);
        sink.require_import(IMPORT_STRINGS);
        templates.render("list", &ListContext::from_roles(roles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SharedDeclarationRegistry;
    use crate::render::fixtures;

    #[test]
    fn test_list_context_with_soft_delete() {
        let ctx = ListContext::from_roles(&fixtures::foo(true));
        assert_eq!(ctx.select, "SELECT id, name FROM Foo");
        assert_eq!(ctx.soft_delete_where, "WHERE deleted_at IS NULL");
        assert_eq!(ctx.filter_join, "AND");
        assert_eq!(ctx.scan, "&e.ID, &e.Name");
    }

    #[test]
    fn test_list_context_without_soft_delete() {
        let ctx = ListContext::from_roles(&fixtures::foo(false));
        assert!(ctx.soft_delete_where.is_empty());
        assert_eq!(ctx.filter_join, "WHERE");
    }

    #[test]
    fn test_render_list() {
        let mut registry = SharedDeclarationRegistry::new();
        let templates = TemplateRegistry::new().unwrap();
        let text = ListRenderer
            .render(&fixtures::foo(true), &mut registry, &templates)
            .unwrap();

        assert!(text.contains("func ListFoo(db cruderQueryer, limit, offset uint64, filter cruderSQLFilter, sorter cruderSQLSorter) ([]Foo, error) {"));
        assert!(text.contains("sqlParts := []string{`SELECT id, name FROM Foo`}\n\tsqlParts = append(sqlParts, `WHERE deleted_at IS NULL`)\n"));
        assert!(text.contains("\"AND \"+filters"));
        assert!(text.contains("fmt.Sprintf(\"LIMIT %d\", limit)"));
        assert!(text.contains("return r, rows.Err()"));
        assert_eq!(
            registry.declarations(),
            vec![Declaration::Queryer, Declaration::SqlFilter, Declaration::SqlSorter]
        );
        let imports: Vec<_> = registry.imports().collect();
        assert_eq!(imports, vec!["database/sql", "fmt", "strings"]);
    }

    #[test]
    fn test_render_list_without_soft_delete() {
        let mut registry = SharedDeclarationRegistry::new();
        let templates = TemplateRegistry::new().unwrap();
        let text = ListRenderer
            .render(&fixtures::foo(false), &mut registry, &templates)
            .unwrap();

        assert!(!text.contains("IS NULL"));
        assert!(text.contains("\"WHERE \"+filters"));
    }
}
