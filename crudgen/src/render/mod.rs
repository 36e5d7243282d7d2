//! Operation renderers
//!
//! One renderer per CRUD operation. A renderer reads the classified field
//! roles, requests the shared declarations its function needs through a
//! [`DeclarationSink`], fills a serializable context record and hands it to
//! the [`TemplateRegistry`]. The returned text is appended to the session
//! body by the caller.

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod sql;
pub mod templates;
pub mod update;

pub use create::{CreateContext, CreateRenderer};
pub use delete::{DeleteContext, DeleteRenderer};
pub use get::{GetContext, GetRenderer};
pub use list::{ListContext, ListRenderer};
pub use templates::TemplateRegistry;
pub use update::{UpdateContext, UpdateRenderer};

use crate::error::{GenerateError, Result};
use crate::registry::DeclarationSink;
use crate::state::FieldRoles;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A CRUD operation to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Insert one entry
    Create,
    /// Fetch one entry by primary key
    Get,
    /// Fetch a page of entries
    List,
    /// Update one entry by primary key
    Update,
    /// Delete one entry by primary key
    Delete,
}

impl Operation {
    /// All operations in default generation order
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Get,
        Self::List,
        Self::Update,
        Self::Delete,
    ];

    /// Lowercase operation name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Get => "get",
            Self::List => "list",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Whether the generated SQL is keyed on the primary field
    #[must_use]
    pub const fn needs_primary(self) -> bool {
        matches!(self, Self::Get | Self::Update | Self::Delete)
    }

    /// Renderer for this operation
    #[must_use]
    pub fn renderer(self) -> &'static dyn OperationRenderer {
        match self {
            Self::Create => &CreateRenderer,
            Self::Get => &GetRenderer,
            Self::List => &ListRenderer,
            Self::Update => &UpdateRenderer,
            Self::Delete => &DeleteRenderer,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "get" | "read" => Ok(Self::Get),
            "list" => Ok(Self::List),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(GenerateError::UnknownOperation(other.to_string())),
        }
    }
}

/// Renders one CRUD operation's function text
pub trait OperationRenderer: Sync {
    /// Operation this renderer produces
    fn operation(&self) -> Operation;

    /// Render the function, requesting shared declarations through `sink`
    ///
    /// # Errors
    ///
    /// Returns an error if the context does not fit the template.
    fn render(
        &self,
        roles: &FieldRoles,
        sink: &mut dyn DeclarationSink,
        templates: &TemplateRegistry,
    ) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::metadata::{FieldSpec, RecordMetadata};
    use crate::state::FieldRoles;

    /// `Foo { ID, Name, DeletedAt }` with lower-cased columns
    pub fn foo(soft_delete: bool) -> FieldRoles {
        let mut specs = vec![
            FieldSpec::new("ID", "uint64").column("id"),
            FieldSpec::new("Name", "string").column("name"),
        ];
        if soft_delete {
            specs.push(FieldSpec::new("DeletedAt", "time.Time").column("deleted_at"));
        }
        let mut roles = FieldRoles::new(RecordMetadata::new("Foo", specs).unwrap());
        roles.set_primary_field("ID").unwrap();
        if soft_delete {
            roles.set_soft_delete_field("DeletedAt").unwrap();
        }
        roles.reset_default_sets();
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_from_str() {
        assert_eq!("Create".parse::<Operation>().unwrap(), Operation::Create);
        assert_eq!(" delete ".parse::<Operation>().unwrap(), Operation::Delete);
        assert_eq!("read".parse::<Operation>().unwrap(), Operation::Get);
        assert!(matches!(
            "upsert".parse::<Operation>(),
            Err(GenerateError::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_renderer_matches_operation() {
        for op in Operation::ALL {
            assert_eq!(op.renderer().operation(), op);
        }
    }

    #[test]
    fn test_needs_primary() {
        assert!(!Operation::Create.needs_primary());
        assert!(!Operation::List.needs_primary());
        assert!(Operation::Get.needs_primary());
        assert!(Operation::Update.needs_primary());
        assert!(Operation::Delete.needs_primary());
    }
}
