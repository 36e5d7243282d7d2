//! Record metadata at the boundary with the source-parsing collaborator
//!
//! The generator never parses Go itself. It receives, for one record type, an
//! ordered list of field descriptors (declared name, declared type, optional
//! column name) and works purely from those.
//!
//! Metadata arrives either programmatically ([`RecordMetadata::new`]), from
//! compact field specs (`Name:type[:column]`), or from a JSON
//! [`PackageManifest`]:
//!
//! ```json
//! {
//!   "package": "example",
//!   "declarations": [],
//!   "records": [
//!     {
//!       "name": "Foo",
//!       "fields": [
//!         { "name": "ID", "type": "uint64", "tag": "db:\"id\"" },
//!         { "name": "Name", "type": "string", "tag": "db:\"name\"" },
//!         { "name": "DeletedAt", "type": "time.Time", "tag": "db:\"deleted_at\"" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::error::{GenerateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Go predeclared types that are never passed by reference
///
/// `error` is predeclared but a named interface type, so it stays out.
const BASIC_TYPES: &[&str] = &[
    "bool", "string", "byte", "rune", "int", "int8", "int16", "int32", "int64", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr", "float32", "float64", "complex64", "complex128",
    "any",
];

/// Structural shape of a declared field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeShape {
    /// Predeclared type (`string`, `uint64`, ...)
    Basic,
    /// Named type (`time.Time`, `sql.NullString`, `Status`)
    Named,
    /// Pointer type (`*T`)
    Pointer,
    /// Slice or array type (`[]T`, `[4]T`)
    Slice,
    /// Map type (`map[K]V`)
    Map,
    /// Anything else (func, chan, inline struct or interface)
    Other,
}

impl TypeShape {
    /// Classify a Go type expression
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudgen::metadata::TypeShape;
    /// assert_eq!(TypeShape::of("uint64"), TypeShape::Basic);
    /// assert_eq!(TypeShape::of("time.Time"), TypeShape::Named);
    /// assert_eq!(TypeShape::of("*string"), TypeShape::Pointer);
    /// ```
    #[must_use]
    pub fn of(type_expr: &str) -> Self {
        let expr = type_expr.trim();
        if expr.starts_with('*') {
            Self::Pointer
        } else if expr.starts_with('[') {
            Self::Slice
        } else if expr.starts_with("map[") {
            Self::Map
        } else if BASIC_TYPES.contains(&expr) {
            Self::Basic
        } else if is_qualified_identifier(expr) {
            Self::Named
        } else {
            Self::Other
        }
    }

    /// Whether a write value of this shape is passed as `&x.Field`
    #[must_use]
    pub const fn requires_reference(self) -> bool {
        matches!(self, Self::Named)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_qualified_identifier(s: &str) -> bool {
    match s.split_once('.') {
        Some((pkg, name)) => is_identifier(pkg) && is_identifier(name),
        None => is_identifier(s),
    }
}

/// Extract the `db` column name from a Go struct tag
///
/// Options after a comma are ignored; an empty value or `-` yields `None`.
///
/// # Examples
///
/// ```
/// # use crudgen::metadata::column_from_tag;
/// assert_eq!(column_from_tag(r#"db:"deleted_at" json:"deletedAt""#), Some("deleted_at".to_string()));
/// assert_eq!(column_from_tag(r#"json:"name""#), None);
/// assert_eq!(column_from_tag(r#"db:"-""#), None);
/// ```
#[must_use]
pub fn column_from_tag(tag: &str) -> Option<String> {
    let mut rest = tag.trim().trim_matches('`');
    while !rest.is_empty() {
        rest = rest.trim_start();
        let (key, after_key) = rest.split_once(':')?;
        let after_key = after_key.strip_prefix('"')?;
        let end = closing_quote(after_key)?;
        let value = &after_key[..end];
        rest = &after_key[end + 1..];

        if key.trim() == "db" {
            let column = value.split(',').next().unwrap_or_default().trim();
            return (!column.is_empty() && column != "-").then(|| column.to_string());
        }
    }
    None
}

/// Index of the first unescaped `"`
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in s.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some(idx),
            _ => escaped = false,
        }
    }
    None
}

/// One field of a record type, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    ordinal: usize,
    name: String,
    column: Option<String>,
    type_expr: String,
    shape: TypeShape,
}

impl FieldDescriptor {
    /// Position of the field within its record
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Declared field name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared Go type expression
    #[must_use]
    pub fn type_expr(&self) -> &str {
        &self.type_expr
    }

    /// Shape of the declared type
    #[must_use]
    pub const fn shape(&self) -> TypeShape {
        self.shape
    }

    /// Database column name, defaulting to the declared name
    #[must_use]
    pub fn column(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

/// Unresolved field input: `name`, Go type, optional column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Declared field name
    pub name: String,
    /// Go type expression
    #[serde(rename = "type")]
    pub type_expr: String,
    /// Explicit column name (wins over `tag`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Raw Go struct tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl FieldSpec {
    /// Create a field spec without a column override
    pub fn new(name: impl Into<String>, type_expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_expr: type_expr.into(),
            column: None,
            tag: None,
        }
    }

    /// Set the column name
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Parse `Name:type[:column]`
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudgen::metadata::FieldSpec;
    /// let spec = FieldSpec::parse("DeletedAt:time.Time:deleted_at").unwrap();
    /// assert_eq!(spec.name, "DeletedAt");
    /// assert_eq!(spec.type_expr, "time.Time");
    /// assert_eq!(spec.column.as_deref(), Some("deleted_at"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidFieldSpec`] if the name is not a Go
    /// identifier or the type is missing.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parts = input.splitn(3, ':').map(str::trim);
        let name = parts.next().unwrap_or_default();
        let type_expr = parts.next().unwrap_or_default();

        if !is_identifier(name) || type_expr.is_empty() {
            return Err(GenerateError::InvalidFieldSpec(input.to_string()));
        }

        let spec = Self::new(name, type_expr);
        Ok(match parts.next().filter(|c| !c.is_empty()) {
            Some(column) => spec.column(column),
            None => spec,
        })
    }

    fn resolved_column(&self) -> Option<String> {
        self.column
            .clone()
            .or_else(|| self.tag.as_deref().and_then(column_from_tag))
    }
}

/// Kind of a named type as reported by the metadata source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordKind {
    /// A struct type
    #[default]
    Struct,
    /// Any other kind (`interface`, `alias`, `int`, ...)
    Other(String),
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct => f.write_str("struct"),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

impl From<&str> for RecordKind {
    fn from(kind: &str) -> Self {
        if kind.eq_ignore_ascii_case("struct") {
            Self::Struct
        } else {
            Self::Other(kind.to_string())
        }
    }
}

/// Ordered field list for one record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMetadata {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl RecordMetadata {
    /// Build metadata from field specs in declaration order
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::DuplicateField`] if two specs share a name.
    pub fn new(name: impl Into<String>, specs: Vec<FieldSpec>) -> Result<Self> {
        let name = name.into();
        let mut seen = HashSet::with_capacity(specs.len());
        let mut fields = Vec::with_capacity(specs.len());

        for (ordinal, spec) in specs.into_iter().enumerate() {
            if !seen.insert(spec.name.clone()) {
                return Err(GenerateError::DuplicateField {
                    record: name,
                    field: spec.name,
                });
            }
            let column = spec.resolved_column();
            let shape = TypeShape::of(&spec.type_expr);
            fields.push(FieldDescriptor {
                ordinal,
                name: spec.name,
                column,
                type_expr: spec.type_expr,
                shape,
            });
        }

        Ok(Self { name, fields })
    }

    /// Record type name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in ordinal order
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field at `ordinal`
    #[must_use]
    pub fn field(&self, ordinal: usize) -> Option<&FieldDescriptor> {
        self.fields.get(ordinal)
    }

    /// Ordinal of the field declared as `name`, after trimming whitespace
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Anything that can resolve a record type name to its metadata
pub trait MetadataSource {
    /// Package the records belong to
    fn package(&self) -> &str;

    /// Type names already declared in the target package
    fn existing_declarations(&self) -> &[String] {
        &[]
    }

    /// Resolve `name` to its metadata
    ///
    /// # Errors
    ///
    /// [`GenerateError::RecordNotFound`] when the type is unknown,
    /// [`GenerateError::NotAStruct`] when it is not a struct.
    fn lookup(&self, name: &str) -> Result<RecordMetadata>;
}

/// One record entry in a manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEntry {
    /// Record type name
    pub name: String,
    /// Kind of the type; defaults to `struct`
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

fn default_kind() -> String {
    "struct".to_string()
}

/// Package-level metadata produced by an external Go type checker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Go package name
    pub package: String,
    /// Type names already declared in the package
    #[serde(default)]
    pub declarations: Vec<String>,
    /// Record types in the package
    #[serde(default)]
    pub records: Vec<RecordEntry>,
}

impl PackageManifest {
    /// Decode a manifest from JSON text
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Manifest`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl MetadataSource for PackageManifest {
    fn package(&self) -> &str {
        &self.package
    }

    fn existing_declarations(&self) -> &[String] {
        &self.declarations
    }

    fn lookup(&self, name: &str) -> Result<RecordMetadata> {
        let entry = self
            .records
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| GenerateError::RecordNotFound {
                name: name.to_string(),
                package: self.package.clone(),
            })?;

        if let RecordKind::Other(kind) = RecordKind::from(entry.kind.as_str()) {
            return Err(GenerateError::NotAStruct {
                name: name.to_string(),
                kind,
            });
        }

        RecordMetadata::new(entry.name.clone(), entry.fields.clone())
    }
}
