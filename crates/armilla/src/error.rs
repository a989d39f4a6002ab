//! Error types for diagram compilation.

use std::io;

use thiserror::Error;

use crate::validate::Diagnostic;

fn itemize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(Diagnostic::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The main error type for Armilla operations.
///
/// Recoverable conditions (dropped edges, unknown styles) are *warnings*
/// carried alongside successful output and never raised as errors; see the
/// `warnings` list on [`crate::CompileOutput`].
#[derive(Debug, Error)]
pub enum ArmillaError {
    /// The diagram failed structural validation. No partial rendering is
    /// attempted; the itemized diagnostics are the complete set found in
    /// one pass.
    #[error("invalid diagram: {}", itemize(.0))]
    Invalid(Vec<Diagnostic>),

    /// A broken invariant that validation cannot excuse: a shape plugin
    /// returning non-positive bounds, container nesting beyond the depth
    /// guard, or similar. These fail loudly rather than degrade.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ArmillaError {
    /// The structural diagnostics, when this is a validation failure.
    pub fn diagnostics(&self) -> Option<&[Diagnostic]> {
        match self {
            Self::Invalid(diagnostics) => Some(diagnostics),
            _ => None,
        }
    }
}
