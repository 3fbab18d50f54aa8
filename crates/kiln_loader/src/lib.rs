//! Compile-on-demand unit loading.
//!
//! Given a symbolic name or a source handle, the [`Loader`] returns a
//! previously compiled unit if one exists and is still valid, or invokes an
//! external [`Compiler`] collaborator and caches everything it produces.
//! Loaded units are cached by name; units from ancestor resolvers are not.
//! To be able to serve a unit that was asked for earlier but whose source
//! appeared later, absence is never cached: a failed lookup leaves no trace.
//!
//! The crate's seams are traits: [`Compiler`] turns one source unit into a
//! set of named binary units, [`SourceResolver`] maps symbolic names to
//! source locations, [`AncestorResolver`] consults higher-priority
//! collaborators, and [`AccessPolicy`] gates package access before each
//! ancestor query.

#![warn(missing_docs)]

pub mod ancestry;
pub mod compiler;
pub mod error;
pub mod loader;
mod pass;
pub mod resolver;

pub use ancestry::{
    AccessPolicy, AllowAll, AncestorResolver, PolicyViolation, StaticResolver, StoreResolver,
};
pub use compiler::{CompileContext, CompileError, Compiler, EmittedUnit};
pub use error::LoadError;
pub use loader::{LoadOptions, Loader};
pub use resolver::{DirectoryResolver, SourceResolver};
