//! Error types and error handling

use thiserror::Error;

/// Result alias used throughout the generator
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Generation-time error
///
/// Every variant is terminal for the invocation that produced it: nothing is
/// retried and no partially generated text is ever returned alongside it.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The requested record type does not exist in the metadata source
    #[error("the struct {name} doesn't seem to exist in package {package}")]
    RecordNotFound {
        /// Record type name that was looked up
        name: String,
        /// Package the lookup ran against
        package: String,
    },

    /// The requested type exists but is not a struct
    #[error("the type {name} is not a struct (found {kind})")]
    NotAStruct {
        /// Record type name
        name: String,
        /// Kind reported by the metadata source
        kind: String,
    },

    /// Two fields of one record share a declared name
    #[error("the field {field} is declared more than once in struct {record}")]
    DuplicateField {
        /// Record type name
        record: String,
        /// Duplicated field name
        field: String,
    },

    /// A compact field spec could not be parsed
    #[error("invalid field spec '{0}'. Expected format: Name:type[:column]")]
    InvalidFieldSpec(String),

    /// An override names a field the record does not have
    #[error("the field {name} does not exist in struct {record}")]
    FieldNotFound {
        /// The override name, trimmed
        name: String,
        /// Record type name
        record: String,
    },

    /// Get, Update or Delete was requested but no primary field is configured
    #[error("struct {record} has no primary field; name one with an override or add an `ID` field")]
    MissingPrimaryField {
        /// Record type name
        record: String,
    },

    /// The primary and soft-delete roles resolved to the same field
    #[error("the field {field} of struct {record} cannot be both the primary and the soft-delete field")]
    ConflictingRoles {
        /// Record type name
        record: String,
        /// Field claimed by both roles
        field: String,
    },

    /// Update was requested but no field is left to assign
    #[error("struct {record} has no write fields to update")]
    EmptyWriteSet {
        /// Record type name
        record: String,
    },

    /// An operation name outside create/get/list/update/delete
    #[error("unknown operation '{0}'. Valid operations: create, get, list, update, delete")]
    UnknownOperation(String),

    /// A rendering context did not fit its template
    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// A built-in template failed to compile
    #[error("template syntax error: {0}")]
    TemplateSyntax(#[from] Box<handlebars::TemplateError>),

    /// Assembled text failed final validation
    #[error("format error: {message}")]
    Format {
        /// Formatter diagnostic
        message: String,
    },

    /// Package manifest could not be decoded
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl From<figment::Error> for GenerateError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl From<handlebars::TemplateError> for GenerateError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::TemplateSyntax(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_not_found_message() {
        let err = GenerateError::FieldNotFound {
            name: "Missing".to_string(),
            record: "Foo".to_string(),
        };
        assert_eq!(err.to_string(), "the field Missing does not exist in struct Foo");
    }

    #[test]
    fn test_record_not_found_message() {
        let err = GenerateError::RecordNotFound {
            name: "Bar".to_string(),
            package: "example".to_string(),
        };
        assert!(err.to_string().contains("Bar"));
        assert!(err.to_string().contains("example"));
    }
}
