//! The source compilation pass: invoke the compiler, realize and install
//! everything it emits, and select the main unit.

use crate::compiler::{CompileContext, CompileError, Compiler, EmittedUnit};
use crate::error::LoadError;
use kiln_cache::{BinaryUnit, NameCache, UnitStore};
use kiln_diagnostics::{Category, Diagnostic, DiagnosticCode};
use kiln_source::{SourceUnit, Span};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, warn};

/// The result of a successful compilation pass.
pub(crate) struct PassOutcome {
    /// The unit representing the requested source's top-level declaration.
    pub main: Arc<BinaryUnit>,
    /// Every unit the pass realized, in emission order (main included).
    pub all: Vec<Arc<BinaryUnit>>,
}

/// Ways a compilation pass can fail.
pub(crate) enum PassError {
    /// The compiler itself failed.
    Compile(CompileError),
    /// The compiler succeeded but emitted no top-level declaration for the
    /// requested source. Units installed before this was detected are kept.
    NoMainUnit { source: String },
}

impl From<PassError> for LoadError {
    fn from(err: PassError) -> Self {
        match err {
            PassError::Compile(err) => err.into(),
            PassError::NoMainUnit { source } => {
                let message = format!("source '{source}' produced no top-level declaration");
                LoadError::CompilationFailed {
                    diagnostics: vec![Diagnostic::error(
                        DiagnosticCode::new(Category::Loader, 1),
                        message,
                        source,
                        Span::DUMMY,
                    )],
                }
            }
        }
    }
}

/// Runs one compilation and installs every produced unit.
///
/// Units are realized in the order the compiler emits them and installed in
/// the name cache before the pass returns, so a caller holding the main unit
/// can resolve references to sibling units without re-entering the compiler.
/// The main unit is the first emitted unit that is a top-level declaration
/// of the requested source. All realized units share one origin timestamp:
/// the instant the pass started, when the source was believed current.
///
/// When a persisted-unit store is configured, each unit is also written to
/// it; store failures are logged and never fail the compilation.
pub(crate) fn run(
    compiler: &dyn Compiler,
    source: &SourceUnit,
    names: &mut NameCache,
    store: Option<&UnitStore>,
) -> Result<PassOutcome, PassError> {
    let stamp = SystemTime::now();
    let emitted = {
        let ctx = CompileContext::new(names);
        compiler.compile(source, &ctx).map_err(PassError::Compile)?
    };

    let requested = source.identity();
    let mut main: Option<Arc<BinaryUnit>> = None;
    let mut all = Vec::with_capacity(emitted.len());

    for EmittedUnit {
        name,
        payload,
        origin,
        is_top_level,
        links,
    } in emitted
    {
        let unit = Arc::new(BinaryUnit::compiled(name, payload, stamp, links));
        names.insert(Arc::clone(&unit));
        if let Some(store) = store {
            if let Err(err) = store.write_unit(&unit) {
                warn!(unit = %unit.name(), error = %err, "failed to persist compiled unit");
            }
        }
        if main.is_none() && is_top_level && origin == requested {
            main = Some(Arc::clone(&unit));
        }
        all.push(unit);
    }

    match main {
        Some(main) => {
            debug!(source = source.name(), units = all.len(), main = %main.name(), "compilation pass complete");
            Ok(PassOutcome { main, all })
        }
        None => Err(PassError::NoMainUnit {
            source: source.name().to_string(),
        }),
    }
}
