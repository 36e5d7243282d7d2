//! Shared declaration registry
//!
//! Operation renderers request small capability interfaces (and the sentinel
//! error) that several generated functions share. The registry makes those
//! requests idempotent: each key reaches the header at most once per session,
//! no matter how many renderers ask for it or in what order they run.
//!
//! Header order is "first requested": every request carries a [`Rank`] of
//! `(operation position, request index)` and the header is emitted in
//! ascending rank, so concurrent and sequential rendering agree byte for byte.

use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Import path for `database/sql`
pub const IMPORT_SQL: &str = "database/sql";
/// Import path for `errors`
pub const IMPORT_ERRORS: &str = "errors";
/// Import path for `fmt`
pub const IMPORT_FMT: &str = "fmt";
/// Import path for `strings`
pub const IMPORT_STRINGS: &str = "strings";

/// A shared declaration key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Declaration {
    /// Execute a statement
    Execer,
    /// Run a query returning multiple rows
    Queryer,
    /// Run a query returning one row
    QueryRower,
    /// Apply a filter predicate
    SqlFilter,
    /// Apply a sort order
    SqlSorter,
    /// Sentinel error for deletes that matched nothing
    NoRowsAffected,
}

impl Declaration {
    /// Every declaration, in canonical order
    pub const ALL: [Self; 6] = [
        Self::Execer,
        Self::Queryer,
        Self::QueryRower,
        Self::SqlFilter,
        Self::SqlSorter,
        Self::NoRowsAffected,
    ];

    /// Identifier the declaration introduces in the target package
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Execer => "cruderExecer",
            Self::Queryer => "cruderQueryer",
            Self::QueryRower => "cruderQueryRower",
            Self::SqlFilter => "cruderSQLFilter",
            Self::SqlSorter => "cruderSQLSorter",
            Self::NoRowsAffected => "ErrNoRowsAffected",
        }
    }

    /// Declaration source text
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Execer => EXECER_DECL,
            Self::Queryer => QUERYER_DECL,
            Self::QueryRower => QUERY_ROWER_DECL,
            Self::SqlFilter => SQL_FILTER_DECL,
            Self::SqlSorter => SQL_SORTER_DECL,
            Self::NoRowsAffected => NO_ROWS_AFFECTED_DECL,
        }
    }

    /// Imports the declaration text refers to
    #[must_use]
    pub const fn imports(self) -> &'static [&'static str] {
        match self {
            Self::Execer | Self::Queryer | Self::QueryRower => &[IMPORT_SQL],
            Self::NoRowsAffected => &[IMPORT_ERRORS],
            Self::SqlFilter | Self::SqlSorter => &[],
        }
    }
}

const EXECER_DECL: &str = r"
type cruderExecer interface {
	Exec(string, ...interface{}) (sql.Result, error)
}
";

const QUERYER_DECL: &str = r"
type cruderQueryer interface {
	Query(string, ...interface{}) (*sql.Rows, error)
}
";

const QUERY_ROWER_DECL: &str = r"
type cruderQueryRower interface {
	QueryRow(string, ...interface{}) *sql.Row
}
";

const SQL_FILTER_DECL: &str = r"
// cruderSQLFilter returns a WHERE predicate (without the WHERE keyword) and its
// positional arguments, numbered from $1
type cruderSQLFilter interface {
	Where() (string, []interface{})
}
";

const SQL_SORTER_DECL: &str = r"
// cruderSQLSorter returns an ORDER BY expression (without the ORDER BY keyword)
type cruderSQLSorter interface {
	OrderBy() string
}
";

const NO_ROWS_AFFECTED_DECL: &str = r#"
// ErrNoRowsAffected is returned when a statement succeeded but changed no rows
var ErrNoRowsAffected = errors.New("sql: no rows affected")
"#;

/// Position of a declaration request within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Rank {
    /// Position of the requesting operation in the requested list
    pub operation: usize,
    /// Index of the request within that operation's render
    pub request: usize,
}

/// Single-owner registry of emitted declarations and required imports
#[derive(Debug, Default)]
pub struct SharedDeclarationRegistry {
    declared: BTreeMap<Declaration, Rank>,
    existing: BTreeSet<String>,
    imports: BTreeSet<String>,
    arrivals: usize,
}

impl SharedDeclarationRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that treats the given package identifiers as already declared
    #[must_use]
    pub fn with_existing<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            existing: identifiers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Request `decl` in arrival order
    ///
    /// Returns `true` if this call newly scheduled it for the header.
    pub fn ensure_declared(&mut self, decl: Declaration) -> bool {
        let rank = Rank {
            operation: 0,
            request: self.arrivals,
        };
        self.arrivals += 1;
        self.ensure_declared_at(decl, rank)
    }

    /// Request `decl` on behalf of the request at `rank`
    ///
    /// Returns `true` if this call newly scheduled it for the header. A later
    /// call with a lower rank moves the declaration earlier but still returns
    /// `false`.
    pub fn ensure_declared_at(&mut self, decl: Declaration, rank: Rank) -> bool {
        if self.existing.contains(decl.identifier()) {
            trace!(declaration = decl.identifier(), "already declared in package");
            return false;
        }

        if let Some(current) = self.declared.get_mut(&decl) {
            *current = (*current).min(rank);
            return false;
        }

        trace!(declaration = decl.identifier(), ?rank, "declaring");
        self.declared.insert(decl, rank);
        for import in decl.imports() {
            self.require_import(*import);
        }
        true
    }

    /// Add an import path to the import set
    pub fn require_import(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.imports.contains(&path) {
            trace!(import = %path, "requiring import");
            self.imports.insert(path);
        }
    }

    /// Whether `decl` is scheduled for the header
    #[must_use]
    pub fn is_declared(&self, decl: Declaration) -> bool {
        self.declared.contains_key(&decl)
    }

    /// Scheduled declarations in header order
    #[must_use]
    pub fn declarations(&self) -> Vec<Declaration> {
        let mut ranked: Vec<_> = self.declared.iter().map(|(d, r)| (*r, *d)).collect();
        ranked.sort_unstable();
        ranked.into_iter().map(|(_, d)| d).collect()
    }

    /// Required imports, lexicographically
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(String::as_str)
    }

    /// Header text: every scheduled declaration once, in header order
    #[must_use]
    pub fn header(&self) -> String {
        self.declarations().into_iter().map(Declaration::text).collect()
    }
}

/// Where renderers send their declaration and import requests
pub trait DeclarationSink {
    /// Request a shared declaration; `true` if newly emitted
    fn ensure_declared(&mut self, decl: Declaration) -> bool;

    /// Require an import path
    fn require_import(&mut self, path: &str);
}

impl DeclarationSink for SharedDeclarationRegistry {
    fn ensure_declared(&mut self, decl: Declaration) -> bool {
        Self::ensure_declared(self, decl)
    }

    fn require_import(&mut self, path: &str) {
        Self::require_import(self, path);
    }
}

/// Sink for one operation's render over an exclusively borrowed registry
#[derive(Debug)]
pub struct RegistryScope<'a> {
    registry: &'a mut SharedDeclarationRegistry,
    operation: usize,
    requests: usize,
}

impl<'a> RegistryScope<'a> {
    /// Scope requests to the operation at `operation` in the requested list
    pub fn new(registry: &'a mut SharedDeclarationRegistry, operation: usize) -> Self {
        Self {
            registry,
            operation,
            requests: 0,
        }
    }
}

impl DeclarationSink for RegistryScope<'_> {
    fn ensure_declared(&mut self, decl: Declaration) -> bool {
        let rank = Rank {
            operation: self.operation,
            request: self.requests,
        };
        self.requests += 1;
        self.registry.ensure_declared_at(decl, rank)
    }

    fn require_import(&mut self, path: &str) {
        self.registry.require_import(path);
    }
}

/// Sink for one operation's render over a registry shared between threads
///
/// Each request takes the lock once; nothing is held between requests.
#[derive(Debug)]
pub struct LockedScope<'a> {
    registry: &'a Mutex<SharedDeclarationRegistry>,
    operation: usize,
    requests: usize,
}

impl<'a> LockedScope<'a> {
    /// Scope requests to the operation at `operation` in the requested list
    #[must_use]
    pub const fn new(registry: &'a Mutex<SharedDeclarationRegistry>, operation: usize) -> Self {
        Self {
            registry,
            operation,
            requests: 0,
        }
    }
}

impl DeclarationSink for LockedScope<'_> {
    fn ensure_declared(&mut self, decl: Declaration) -> bool {
        let rank = Rank {
            operation: self.operation,
            request: self.requests,
        };
        self.requests += 1;
        self.registry.lock().ensure_declared_at(decl, rank)
    }

    fn require_import(&mut self, path: &str) {
        self.registry.lock().require_import(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_declared_is_idempotent() {
        let mut registry = SharedDeclarationRegistry::new();
        assert!(registry.ensure_declared(Declaration::QueryRower));
        assert!(!registry.ensure_declared(Declaration::QueryRower));
        assert!(!registry.ensure_declared(Declaration::QueryRower));
        assert_eq!(registry.header().matches("type cruderQueryRower").count(), 1);
    }

    #[test]
    fn test_declarations_pull_in_imports() {
        let mut registry = SharedDeclarationRegistry::new();
        registry.ensure_declared(Declaration::NoRowsAffected);
        registry.ensure_declared(Declaration::Execer);
        registry.require_import(IMPORT_FMT);
        let imports: Vec<_> = registry.imports().collect();
        assert_eq!(imports, vec!["database/sql", "errors", "fmt"]);
    }

    #[test]
    fn test_header_follows_first_request() {
        let mut registry = SharedDeclarationRegistry::new();
        registry.ensure_declared(Declaration::SqlSorter);
        registry.ensure_declared(Declaration::Execer);
        registry.ensure_declared(Declaration::SqlSorter);
        assert_eq!(
            registry.declarations(),
            vec![Declaration::SqlSorter, Declaration::Execer]
        );
    }

    #[test]
    fn test_lower_rank_moves_declaration_earlier() {
        let mut registry = SharedDeclarationRegistry::new();
        let late = Rank { operation: 3, request: 0 };
        let early = Rank { operation: 1, request: 0 };
        assert!(registry.ensure_declared_at(Declaration::Execer, late));
        assert!(registry.ensure_declared_at(Declaration::QueryRower, Rank { operation: 2, request: 0 }));
        assert!(!registry.ensure_declared_at(Declaration::Execer, early));
        assert_eq!(
            registry.declarations(),
            vec![Declaration::Execer, Declaration::QueryRower]
        );
    }

    #[test]
    fn test_existing_identifiers_are_skipped() {
        let mut registry = SharedDeclarationRegistry::with_existing(["cruderExecer"]);
        assert!(!registry.ensure_declared(Declaration::Execer));
        assert!(!registry.is_declared(Declaration::Execer));
        assert!(registry.header().is_empty());
        assert_eq!(registry.imports().count(), 0);
    }

    #[test]
    fn test_locked_scope_ranks_by_operation() {
        let registry = Mutex::new(SharedDeclarationRegistry::new());
        let mut second = LockedScope::new(&registry, 1);
        let mut first = LockedScope::new(&registry, 0);
        second.ensure_declared(Declaration::Execer);
        first.ensure_declared(Declaration::Queryer);
        first.ensure_declared(Declaration::Execer);
        assert_eq!(
            registry.lock().declarations(),
            vec![Declaration::Queryer, Declaration::Execer]
        );
    }

    #[test]
    fn test_every_declaration_text_names_its_identifier() {
        for decl in Declaration::ALL {
            assert!(decl.text().contains(decl.identifier()));
        }
    }
}
