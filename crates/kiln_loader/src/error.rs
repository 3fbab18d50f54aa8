//! The loader's error taxonomy.

use crate::ancestry::PolicyViolation;
use crate::compiler::CompileError;
use kiln_diagnostics::Diagnostic;

/// Errors a load or parse request can fail with.
///
/// On any error the caches are left exactly as they were before the request
/// began, with one documented leniency: a compilation pass that installed
/// auxiliary units before failing to produce a usable main unit keeps those
/// auxiliaries, since they may be individually valid and reusable.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The name resolved nowhere: not in a cache, not through an ancestor,
    /// and no source was found. Recoverable; absence is never cached, so a
    /// later request retries resolution from scratch.
    #[error("unit '{name}' was not found in any cache, ancestor, or source root")]
    NotFound {
        /// The requested symbolic name.
        name: String,
    },

    /// The compiler rejected the source. Carries its diagnostics verbatim.
    #[error("compilation failed with {} diagnostic(s)", .diagnostics.len())]
    CompilationFailed {
        /// The diagnostics the compiler emitted, in emission order.
        diagnostics: Vec<Diagnostic>,
    },

    /// A source could not be resolved or read.
    #[error("I/O failure while fetching source for '{name}': {source}")]
    Io {
        /// The requested symbolic name.
        name: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A package access check failed before an ancestor query. Aborts the
    /// request immediately with no cache mutation.
    #[error(transparent)]
    PolicyViolation(#[from] PolicyViolation),

    /// A request ended with no unit and no recorded error. This indicates a
    /// logic bug in the loader and is never silently swallowed.
    #[error("loader invariant violated: {message}")]
    Invariant {
        /// Description of the violated invariant.
        message: String,
    },
}

impl From<CompileError> for LoadError {
    fn from(err: CompileError) -> Self {
        Self::CompilationFailed {
            diagnostics: err.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_diagnostics::{Category, DiagnosticCode};
    use kiln_source::Span;

    #[test]
    fn not_found_display() {
        let err = LoadError::NotFound {
            name: "app.Greeter".to_string(),
        };
        assert!(format!("{err}").contains("app.Greeter"));
    }

    #[test]
    fn compile_error_converts() {
        let compile = CompileError::new(vec![Diagnostic::error(
            DiagnosticCode::new(Category::Error, 101),
            "boom",
            "A",
            Span::DUMMY,
        )]);
        let err = LoadError::from(compile);
        match err {
            LoadError::CompilationFailed { diagnostics } => assert_eq!(diagnostics.len(), 1),
            other => panic!("expected CompilationFailed, got {other}"),
        }
    }

    #[test]
    fn io_error_chains_source() {
        use std::error::Error;
        let err = LoadError::Io {
            name: "app.Greeter".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn policy_violation_is_transparent() {
        let err: LoadError = PolicyViolation {
            package: "sys.internal".to_string(),
            reason: "restricted".to_string(),
        }
        .into();
        assert!(format!("{err}").contains("sys.internal"));
    }

    #[test]
    fn invariant_display() {
        let err = LoadError::Invariant {
            message: "no unit and no error recorded".to_string(),
        };
        assert!(format!("{err}").starts_with("loader invariant violated:"));
    }
}
