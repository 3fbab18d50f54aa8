//! Ancestor resolution: higher-priority collaborators consulted before
//! local recompilation.
//!
//! Ancestors are chained as an ordered list rather than through inheritance.
//! An answer from an ancestor is authoritative for units it owns and local
//! staleness logic never overrides it, with one deliberate exception: an
//! answer identical to the locally cached candidate is treated like a miss
//! and falls through to local logic.

use crate::error::LoadError;
use kiln_cache::{BinaryUnit, UnitStore};
use kiln_common::SymbolicName;
use std::collections::HashMap;
use std::sync::Arc;

/// A higher-priority name resolver consulted before local recompilation.
///
/// `Ok(None)` means "not found" and is recorded as the request's fallback
/// error; any other error aborts the whole request immediately.
pub trait AncestorResolver: Send + Sync {
    /// Resolves a symbolic name to a unit this ancestor owns.
    fn resolve(&self, name: &SymbolicName) -> Result<Option<Arc<BinaryUnit>>, LoadError>;
}

/// A package access check run before each ancestor query.
#[derive(Debug, Clone, thiserror::Error)]
#[error("access to package '{package}' denied: {reason}")]
pub struct PolicyViolation {
    /// The package whose access was denied.
    pub package: String,
    /// Why access was denied.
    pub reason: String,
}

/// Gates package access ahead of ancestor delegation.
///
/// A violation aborts the whole request with no cache mutation. Unqualified
/// names carry no package and are not checked.
pub trait AccessPolicy: Send + Sync {
    /// Checks whether the requester may resolve names in `package`.
    fn check_access(&self, package: &str) -> Result<(), PolicyViolation>;
}

/// The default policy: every package is accessible.
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn check_access(&self, _package: &str) -> Result<(), PolicyViolation> {
        Ok(())
    }
}

/// A fixed set of precompiled units (platform builtins).
#[derive(Default)]
pub struct StaticResolver {
    units: HashMap<SymbolicName, Arc<BinaryUnit>>,
}

impl StaticResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a unit under its own name, superseding any previous one.
    pub fn insert(&mut self, unit: Arc<BinaryUnit>) {
        self.units.insert(unit.name().clone(), unit);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_unit(mut self, unit: Arc<BinaryUnit>) -> Self {
        self.insert(unit);
        self
    }
}

impl AncestorResolver for StaticResolver {
    fn resolve(&self, name: &SymbolicName) -> Result<Option<Arc<BinaryUnit>>, LoadError> {
        Ok(self.units.get(name.as_str()).cloned())
    }
}

/// Serves units persisted to a [`UnitStore`] directory by an earlier run.
///
/// Reads are fail-safe: a missing, corrupt, or incompatible artifact is a
/// miss, never an error.
pub struct StoreResolver {
    store: UnitStore,
}

impl StoreResolver {
    /// Creates a resolver over a persisted-unit store.
    pub fn new(store: UnitStore) -> Self {
        Self { store }
    }
}

impl AncestorResolver for StoreResolver {
    fn resolve(&self, name: &SymbolicName) -> Result<Option<Arc<BinaryUnit>>, LoadError> {
        Ok(self.store.read_unit(name.as_str()).map(Arc::new))
    }
}
