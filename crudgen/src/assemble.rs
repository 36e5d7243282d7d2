//! Source unit assembly
//!
//! Concatenates, in fixed order, the package clause, the import block, the
//! header declarations and the operation bodies, then passes the result
//! through a [`SourceFormatter`]. A formatter failure discards the text.

use crate::error::{GenerateError, Result};
use crate::registry::Declaration;
use crate::state::GenerationState;
use std::fmt::Write as _;
use tracing::debug;

/// Final formatting/validation step for assembled source
pub trait SourceFormatter: Send + Sync {
    /// Return the formatted source or a diagnostic
    ///
    /// # Errors
    ///
    /// Returns a human-readable diagnostic if `source` is rejected.
    fn format(&self, source: &str) -> std::result::Result<String, String>;
}

/// Leaves the text untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl SourceFormatter for Passthrough {
    fn format(&self, source: &str) -> std::result::Result<String, String> {
        Ok(source.to_string())
    }
}

/// Structural check and whitespace normalization
///
/// Verifies the package clause names a Go identifier and that `()`, `[]` and
/// `{}` balance outside comments and string, rune and raw-string literals.
/// Then strips trailing whitespace, collapses runs of blank lines and ends the
/// text with exactly one newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxCheck;

impl SourceFormatter for SyntaxCheck {
    fn format(&self, source: &str) -> std::result::Result<String, String> {
        check_package_clause(source)?;
        check_delimiters(source)?;
        Ok(normalize_whitespace(source))
    }
}

fn check_package_clause(source: &str) -> std::result::Result<(), String> {
    let first = source
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("//"))
        .unwrap_or_default();
    let name = first
        .strip_prefix("package ")
        .ok_or_else(|| "expected 'package' clause".to_string())?
        .trim();

    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(format!("invalid package name '{name}'"))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Lexical {
    Code,
    LineComment,
    BlockComment,
    Interpreted,
    Rune,
    Raw,
}

fn check_delimiters(source: &str) -> std::result::Result<(), String> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut state = Lexical::Code;
    let mut line = 1;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        state = match (state, c) {
            (Lexical::Code, '/') if chars.peek() == Some(&'/') => Lexical::LineComment,
            (Lexical::Code, '/') if chars.peek() == Some(&'*') => {
                chars.next();
                Lexical::BlockComment
            }
            (Lexical::Code, '"') => Lexical::Interpreted,
            (Lexical::Code, '\'') => Lexical::Rune,
            (Lexical::Code, '`') => Lexical::Raw,
            (Lexical::Code, '(' | '[' | '{') => {
                stack.push((c, line));
                Lexical::Code
            }
            (Lexical::Code, ')' | ']' | '}') => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => Lexical::Code,
                    Some((open, opened)) => {
                        return Err(format!(
                            "line {line}: '{c}' closes '{open}' opened on line {opened}"
                        ))
                    }
                    None => return Err(format!("line {line}: unmatched '{c}'")),
                }
            }
            (Lexical::LineComment, '\n') => Lexical::Code,
            (Lexical::BlockComment, '*') if chars.peek() == Some(&'/') => {
                chars.next();
                Lexical::Code
            }
            (Lexical::Interpreted | Lexical::Rune, '\\') => {
                chars.next();
                state
            }
            (Lexical::Interpreted, '"') | (Lexical::Rune, '\'') | (Lexical::Raw, '`') => {
                Lexical::Code
            }
            (Lexical::Interpreted | Lexical::Rune, '\n') => {
                return Err(format!("line {}: unterminated literal", line - 1))
            }
            (current, _) => current,
        };
    }

    match (state, stack.pop()) {
        (Lexical::Interpreted | Lexical::Rune | Lexical::Raw, _) => {
            Err("unterminated literal at end of file".to_string())
        }
        (Lexical::BlockComment, _) => Err("unterminated block comment".to_string()),
        (_, Some((open, opened))) => Err(format!("'{open}' opened on line {opened} is never closed")),
        (_, None) => Ok(()),
    }
}

fn normalize_whitespace(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut blank_run = false;
    for line in source.trim().lines() {
        let line = line.trim_end();
        if line.is_empty() {
            if !blank_run {
                out.push('\n');
            }
            blank_run = true;
        } else {
            out.push_str(line);
            out.push('\n');
            blank_run = false;
        }
    }
    out
}

/// Generated source and what it required
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    /// Package the source declares
    pub package: String,
    /// Record type the operations serve
    pub record: String,
    /// Final source text
    pub text: String,
    /// Required import paths, lexicographically
    pub imports: Vec<String>,
    /// Shared declarations emitted, in header order
    pub declarations: Vec<Declaration>,
}

/// Joins a finished [`GenerationState`] into one source unit
pub struct Assembler<'a> {
    formatter: &'a dyn SourceFormatter,
}

impl std::fmt::Debug for Assembler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembler").finish_non_exhaustive()
    }
}

impl<'a> Assembler<'a> {
    /// Assembler using `formatter` as the final step
    #[must_use]
    pub const fn new(formatter: &'a dyn SourceFormatter) -> Self {
        Self { formatter }
    }

    /// Unformatted concatenation of all parts
    #[must_use]
    pub fn concat(state: &GenerationState, package: &str) -> String {
        let mut out = format!("package {package}\n");

        let imports: Vec<_> = state.registry.imports().collect();
        if !imports.is_empty() {
            out.push_str("\nimport (\n");
            for import in imports {
                let _ = writeln!(out, "\t\"{import}\"");
            }
            out.push_str(")\n");
        }

        out.push_str(&state.registry.header());
        out.push_str(&state.body);
        out
    }

    /// Consume `state` and produce the final source
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Format`] if the formatter rejects the text.
    pub fn assemble(&self, state: GenerationState, package: &str) -> Result<GeneratedSource> {
        let raw = Self::concat(&state, package);
        let text = self
            .formatter
            .format(&raw)
            .map_err(|message| GenerateError::Format { message })?;

        debug!(package, bytes = text.len(), "assembled source unit");

        Ok(GeneratedSource {
            package: package.to_string(),
            record: state.roles.model().to_string(),
            imports: state.registry.imports().map(ToString::to_string).collect(),
            declarations: state.registry.declarations(),
            text,
        })
    }
}
