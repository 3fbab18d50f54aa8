//! Compiled binary units.

use kiln_common::{ContentHash, SymbolicName};
use std::time::SystemTime;

/// A compiled, runnable artifact for one symbolic name.
///
/// Units are created once per successful compilation pass and are immutable
/// thereafter; they are shared between caches and callers as
/// `Arc<BinaryUnit>` without further synchronization. The origin timestamp
/// records the instant the source the unit was built from was believed
/// current; units without one (precompiled artifacts, or units predating
/// timestamp tracking) are never considered stale.
#[derive(Debug, Clone)]
pub struct BinaryUnit {
    name: SymbolicName,
    payload: Vec<u8>,
    origin_timestamp: Option<SystemTime>,
    links: Vec<SymbolicName>,
    dynamic: bool,
}

impl BinaryUnit {
    /// Creates a unit freshly produced by the managed compiler.
    ///
    /// Such units carry the `dynamic` marker and are recompilation
    /// candidates as long as they also carry an origin timestamp.
    pub fn compiled(
        name: SymbolicName,
        payload: Vec<u8>,
        origin_timestamp: SystemTime,
        links: Vec<SymbolicName>,
    ) -> Self {
        Self {
            name,
            payload,
            origin_timestamp: Some(origin_timestamp),
            links,
            dynamic: true,
        }
    }

    /// Creates a unit for an artifact that was not produced by the managed
    /// compiler in this process (a platform builtin or a persisted unit).
    ///
    /// Precompiled units are never recompilation candidates.
    pub fn precompiled(name: SymbolicName, payload: Vec<u8>, links: Vec<SymbolicName>) -> Self {
        Self {
            name,
            payload,
            origin_timestamp: None,
            links,
            dynamic: false,
        }
    }

    /// Reassembles a unit from its recorded parts (store round-trips).
    pub(crate) fn from_parts(
        name: SymbolicName,
        payload: Vec<u8>,
        origin_timestamp: Option<SystemTime>,
        links: Vec<SymbolicName>,
        dynamic: bool,
    ) -> Self {
        Self {
            name,
            payload,
            origin_timestamp,
            links,
            dynamic,
        }
    }

    /// The symbolic name this unit answers to.
    pub fn name(&self) -> &SymbolicName {
        &self.name
    }

    /// The opaque compiled payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The instant the unit's source was believed current, if recorded.
    pub fn origin_timestamp(&self) -> Option<SystemTime> {
        self.origin_timestamp
    }

    /// Names of units this unit was compiled against (inheritance and other
    /// relationships, opaque to the cache).
    pub fn links(&self) -> &[SymbolicName] {
        &self.links
    }

    /// Returns `true` if this unit was produced by the managed compiler and
    /// is therefore eligible for recompilation checks.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// The content hash of the payload.
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::from_bytes(&self.payload)
    }
}
