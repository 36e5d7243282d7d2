//! CRUD generator orchestrator
//!
//! Coordinates one generation session per record type:
//! 1. Classify the record's fields ([`FieldClassifier`])
//! 2. Reject primary-keyed operations when no primary field resolved, and
//!    Update when no write field is left
//! 3. Render every requested operation, sequentially or on scoped threads
//! 4. Assemble package clause, imports, header and body ([`Assembler`])
//!
//! Any failure discards the whole session; nothing partial is returned.

use crate::assemble::{Assembler, GeneratedSource, Passthrough, SourceFormatter, SyntaxCheck};
use crate::classify::FieldClassifier;
use crate::config::{FormatMode, GeneratorSettings};
use crate::error::{GenerateError, Result};
use crate::metadata::{MetadataSource, RecordMetadata};
use crate::registry::{LockedScope, RegistryScope, SharedDeclarationRegistry};
use crate::render::{Operation, TemplateRegistry};
use crate::state::GenerationState;
use parking_lot::Mutex;
use std::panic;
use std::thread::{self, ScopedJoinHandle};
use tracing::{debug, info_span};

/// CRUD code generator
pub struct CrudGenerator {
    settings: GeneratorSettings,
    templates: TemplateRegistry,
    formatter: Option<Box<dyn SourceFormatter>>,
}

impl std::fmt::Debug for CrudGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudGenerator")
            .field("settings", &self.settings)
            .field("custom_formatter", &self.formatter.is_some())
            .finish_non_exhaustive()
    }
}

impl CrudGenerator {
    /// Create a generator for `settings`
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in template fails to compile.
    pub fn new(settings: GeneratorSettings) -> Result<Self> {
        Ok(Self {
            settings,
            templates: TemplateRegistry::new()?,
            formatter: None,
        })
    }

    /// Use `formatter` as the final step instead of the one `settings.format` names
    #[must_use]
    pub fn with_formatter(mut self, formatter: Box<dyn SourceFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Settings this generator runs with
    #[must_use]
    pub const fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Look `name` up in `source` and generate its operations
    ///
    /// The output package defaults to the source's package, and identifiers
    /// the source already declares are never emitted again.
    ///
    /// # Errors
    ///
    /// Lookup errors ([`GenerateError::RecordNotFound`],
    /// [`GenerateError::NotAStruct`]) plus everything [`Self::generate`] returns.
    pub fn generate_from(&self, source: &dyn MetadataSource, name: &str) -> Result<GeneratedSource> {
        let record = source.lookup(name)?;
        let package = self.settings.package.as_deref().unwrap_or(source.package());
        self.run(
            record,
            package,
            SharedDeclarationRegistry::with_existing(source.existing_declarations().iter().cloned()),
        )
    }

    /// Generate the requested operations for `record` into `package`
    ///
    /// # Errors
    ///
    /// - [`GenerateError::FieldNotFound`] if an override names an unknown field
    /// - [`GenerateError::MissingPrimaryField`] if Get, Update or Delete is
    ///   requested and no primary field resolved
    /// - [`GenerateError::EmptyWriteSet`] if Update is requested with no write
    ///   fields
    /// - [`GenerateError::Format`] if the assembled text fails validation
    pub fn generate(&self, record: RecordMetadata, package: &str) -> Result<GeneratedSource> {
        let package = self.settings.package.as_deref().unwrap_or(package);
        self.run(record, package, SharedDeclarationRegistry::new())
    }

    fn run(
        &self,
        record: RecordMetadata,
        package: &str,
        registry: SharedDeclarationRegistry,
    ) -> Result<GeneratedSource> {
        let span = info_span!("generate", record = record.name(), package);
        let _enter = span.enter();

        let mut state = FieldClassifier::classify(record, &self.settings.overrides())?;
        state.registry = registry;

        let operations = self.settings.unique_operations();
        if state.roles.primary().is_none() && operations.iter().any(|op| op.needs_primary()) {
            return Err(GenerateError::MissingPrimaryField {
                record: state.roles.model().to_string(),
            });
        }
        if state.roles.write().is_empty() && operations.contains(&Operation::Update) {
            return Err(GenerateError::EmptyWriteSet {
                record: state.roles.model().to_string(),
            });
        }

        if self.settings.parallel {
            self.render_parallel(&mut state, &operations)?;
        } else {
            self.render_sequential(&mut state, &operations)?;
        }

        let formatter: &dyn SourceFormatter = match (&self.formatter, self.settings.format) {
            (Some(formatter), _) => formatter.as_ref(),
            (None, FormatMode::Check) => &SyntaxCheck,
            (None, FormatMode::None) => &Passthrough,
        };
        Assembler::new(formatter).assemble(state, package)
    }

    fn render_sequential(&self, state: &mut GenerationState, operations: &[Operation]) -> Result<()> {
        let GenerationState {
            roles,
            registry,
            body,
        } = state;

        for (position, op) in operations.iter().enumerate() {
            let mut scope = RegistryScope::new(registry, position);
            let text = op.renderer().render(roles, &mut scope, &self.templates)?;
            debug!(operation = %op, bytes = text.len(), "rendered operation");
            body.push_str(&text);
        }
        Ok(())
    }

    fn render_parallel(&self, state: &mut GenerationState, operations: &[Operation]) -> Result<()> {
        let registry = Mutex::new(std::mem::take(&mut state.registry));
        let roles = &state.roles;

        let fragments: Vec<Result<String>> = thread::scope(|s| {
            let handles: Vec<_> = operations
                .iter()
                .enumerate()
                .map(|(position, op)| {
                    let registry = &registry;
                    s.spawn(move || {
                        let mut scope = LockedScope::new(registry, position);
                        op.renderer().render(roles, &mut scope, &self.templates)
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(join_fragment)
                .collect()
        });

        state.registry = registry.into_inner();
        for (op, fragment) in operations.iter().zip(fragments) {
            let text = fragment?;
            debug!(operation = %op, bytes = text.len(), "rendered operation");
            state.body.push_str(&text);
        }
        Ok(())
    }
}

/// Join a renderer thread, re-raising its panic on the caller
fn join_fragment<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| panic::resume_unwind(payload))
}
