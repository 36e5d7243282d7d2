//! crudgen: deterministic CRUD data-access code synthesis
//!
//! Given field metadata for one record type, crudgen emits a Go source unit
//! with parameterized PostgreSQL-dialect Create, Get, List, Update and Delete
//! functions plus the minimal set of shared driver interfaces they need.
//!
//! # Design Principles
//!
//! 1. **Convention Over Configuration**: `ID` is the primary key and
//!    `DeletedAt` the soft-delete marker unless overridden
//! 2. **Deterministic Output**: identical input produces byte-identical text
//! 3. **All or Nothing**: any failure discards the whole session
//!
//! # Quick Start
//!
//! ```rust
//! use crudgen::prelude::*;
//!
//! # fn main() -> crudgen::error::Result<()> {
//! let record = RecordMetadata::new(
//!     "Foo",
//!     vec![
//!         FieldSpec::new("ID", "uint64").column("id"),
//!         FieldSpec::new("Name", "string").column("name"),
//!     ],
//! )?;
//!
//! let generator = CrudGenerator::new(GeneratorSettings::default())?;
//! let source = generator.generate(record, "example")?;
//! assert!(source.text.contains("func GetFoo("));
//! # Ok(())
//! # }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod assemble;
pub mod classify;
pub mod config;
pub mod error;
pub mod generator;
pub mod metadata;
pub mod registry;
pub mod render;
pub mod state;

/// Commonly used types
pub mod prelude {
    pub use crate::assemble::{GeneratedSource, Passthrough, SourceFormatter, SyntaxCheck};
    pub use crate::classify::{FieldClassifier, Overrides};
    pub use crate::config::{FormatMode, GeneratorSettings};
    pub use crate::error::{GenerateError, Result};
    pub use crate::generator::CrudGenerator;
    pub use crate::metadata::{
        FieldDescriptor, FieldSpec, MetadataSource, PackageManifest, RecordMetadata,
    };
    pub use crate::registry::Declaration;
    pub use crate::render::Operation;
}
