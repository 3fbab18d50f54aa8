//! Structured diagnostic messages with severity, codes, and source spans.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use kiln_source::Span;
use serde::{Deserialize, Serialize};

/// A structured diagnostic message produced during compilation.
///
/// Diagnostics are how a compiler reports errors and warnings back through
/// the loader. A compilation failure carries its diagnostics verbatim; the
/// loader never interprets them beyond counting errors.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The name of the source unit the diagnostic refers to.
    pub source: String,
    /// The byte range within that source, [`Span::DUMMY`] when unknown.
    pub span: Span,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    pub fn error(
        code: DiagnosticCode,
        message: impl Into<String>,
        source: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::with_severity(Severity::Error, code, message, source, span)
    }

    /// Creates a warning diagnostic.
    pub fn warning(
        code: DiagnosticCode,
        message: impl Into<String>,
        source: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::with_severity(Severity::Warning, code, message, source, span)
    }

    /// Creates a diagnostic with an explicit severity.
    pub fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        source: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            source: source.into(),
            span,
            notes: Vec::new(),
        }
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Error, 101);
        let diag = Diagnostic::error(code, "unexpected token", "Greeter", Span::new(4, 9));
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "unexpected token");
        assert_eq!(diag.source, "Greeter");
        assert_eq!(format!("{}", diag.code), "E101");
    }

    #[test]
    fn create_warning() {
        let code = DiagnosticCode::new(Category::Warning, 201);
        let diag = Diagnostic::warning(code, "unused declaration", "Greeter", Span::DUMMY);
        assert_eq!(diag.severity, Severity::Warning);
        assert!(diag.span.is_empty());
    }

    #[test]
    fn notes_accumulate() {
        let code = DiagnosticCode::new(Category::Error, 102);
        let diag = Diagnostic::error(code, "unresolved reference", "Greeter", Span::DUMMY)
            .with_note("declared units must be compiled before use")
            .with_note("did you mean 'Greeting'?");
        assert_eq!(diag.notes.len(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Error, 101);
        let diag = Diagnostic::error(code, "boom", "A", Span::new(0, 4));
        let json = serde_json::to_string(&diag).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message, "boom");
        assert_eq!(back.span, Span::new(0, 4));
    }
}
