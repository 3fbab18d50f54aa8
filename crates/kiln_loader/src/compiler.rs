//! The external compiler seam.

use kiln_cache::{BinaryUnit, NameCache};
use kiln_common::SymbolicName;
use kiln_diagnostics::Diagnostic;
use kiln_source::{SourceIdentity, SourceUnit};
use std::sync::Arc;

/// One binary unit produced by a compilation, in emission order.
///
/// A single compilation may produce several units: the top-level declaration
/// of the requested source plus nested or auxiliary units compiled
/// alongside it, possibly from additional sources the compiler pulled in.
#[derive(Debug, Clone)]
pub struct EmittedUnit {
    /// The symbolic name of the unit.
    pub name: SymbolicName,
    /// The opaque compiled payload.
    pub payload: Vec<u8>,
    /// The identity of the source unit this unit originated from.
    pub origin: SourceIdentity,
    /// Whether this unit is a top-level declaration of its source.
    pub is_top_level: bool,
    /// Names of units this unit was compiled against.
    pub links: Vec<SymbolicName>,
}

/// Read-only view of the loader's cache handed to a compiler while it runs.
///
/// Compilation executes inside the loader's critical section, so a compiler
/// must never call back into the loader to resolve a reference; it resolves
/// previously loaded units through this handle instead. Units the current
/// pass emits become visible to later lookups only after the pass installs
/// them.
pub struct CompileContext<'a> {
    names: &'a NameCache,
}

impl<'a> CompileContext<'a> {
    pub(crate) fn new(names: &'a NameCache) -> Self {
        Self { names }
    }

    /// Returns the already-loaded unit for a name, if any.
    pub fn lookup(&self, name: &str) -> Option<Arc<BinaryUnit>> {
        self.names.get(name)
    }
}

/// A structured compilation failure carrying the compiler's diagnostics.
///
/// Diagnostics are surfaced to the caller verbatim; the loader never retries
/// a failed compilation on its own.
#[derive(Debug, thiserror::Error)]
#[error("compilation failed with {} diagnostic(s)", .diagnostics.len())]
pub struct CompileError {
    /// The diagnostics the compiler emitted, in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileError {
    /// Creates a failure from accumulated diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

/// The external collaborator that turns source text into binary units.
///
/// Exactly one operation: compile a source unit into an ordered sequence of
/// named units. Implementations typically accumulate diagnostics in a
/// [`DiagnosticSink`](kiln_diagnostics::DiagnosticSink) while they work and
/// drain it into the [`CompileError`] they return.
pub trait Compiler: Send + Sync {
    /// Compiles one source unit.
    fn compile(
        &self,
        source: &SourceUnit,
        ctx: &CompileContext<'_>,
    ) -> Result<Vec<EmittedUnit>, CompileError>;
}
