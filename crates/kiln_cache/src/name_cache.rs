//! The symbolic-name-keyed unit cache.

use crate::unit::BinaryUnit;
use kiln_common::SymbolicName;
use std::collections::HashMap;
use std::sync::Arc;

/// Mapping from symbolic name to the resolved binary unit.
///
/// This is the canonical answer to "is this name already available". Entries
/// are inserted only for fully realized units and are replaced atomically
/// from a reader's point of view: the map holds `Arc`s, so a reader observes
/// either the old unit or the new one, never a partial state.
///
/// Absence is never recorded: a name that failed to resolve is simply not
/// present, and a later request retries resolution from scratch. A unit that
/// will exist later must not be remembered as missing.
///
/// The cache itself is a plain map. The load coordinator wraps it (together
/// with the [`SourceCache`](crate::SourceCache)) in a single mutex scoped to
/// the whole cache, because its compound check-then-compile-then-install
/// sequences must be linearizable with respect to each other. That trades
/// concurrency across unrelated names for correctness simplicity.
#[derive(Debug, Default)]
pub struct NameCache {
    entries: HashMap<SymbolicName, Arc<BinaryUnit>>,
}

impl NameCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the cached unit for a name, if present.
    pub fn get(&self, name: &str) -> Option<Arc<BinaryUnit>> {
        self.entries.get(name).cloned()
    }

    /// Installs a unit under its name, superseding any previous entry.
    pub fn insert(&mut self, unit: Arc<BinaryUnit>) {
        self.entries.insert(unit.name().clone(), unit);
    }

    /// Removes the entry for a name. Returns `true` if one was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns every cached unit, in no particular order.
    pub fn snapshot(&self) -> Vec<Arc<BinaryUnit>> {
        self.entries.values().cloned().collect()
    }

    /// Returns the number of cached units.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no units.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
