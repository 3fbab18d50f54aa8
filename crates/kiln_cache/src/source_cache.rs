//! The source-identity-keyed memoization cache.

use crate::unit::BinaryUnit;
use kiln_source::SourceIdentity;
use std::collections::HashMap;
use std::sync::Arc;

/// Mapping from source identity to the main unit its compilation produced.
///
/// Distinct from the [`NameCache`](crate::NameCache): many different source
/// identities can legitimately resolve to the same symbolic name across
/// requests (anonymous and inline sources in particular), so this cache is
/// keyed on *how the caller referred to the source*, not on the resulting
/// name. Lookups here are a pure memoize-by-identity; staleness policy never
/// applies to them.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<SourceIdentity, Arc<BinaryUnit>>,
}

impl SourceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the memoized main unit for a source identity, if present.
    pub fn get(&self, identity: &SourceIdentity) -> Option<Arc<BinaryUnit>> {
        self.entries.get(identity).cloned()
    }

    /// Memoizes the main unit produced by compiling a source identity.
    pub fn insert(&mut self, identity: SourceIdentity, unit: Arc<BinaryUnit>) {
        self.entries.insert(identity, unit);
    }

    /// Drops every identity recorded under the given declared name.
    ///
    /// Called when a symbolic name is about to be recompiled, so a stale
    /// memoized unit cannot be served for the same source afterwards.
    pub fn remove_name(&mut self, name: &str) {
        self.entries.retain(|identity, _| identity.name != name);
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of memoized entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is memoized.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_common::SymbolicName;
    use std::path::PathBuf;

    fn make_unit(name: &str) -> Arc<BinaryUnit> {
        Arc::new(BinaryUnit::precompiled(
            SymbolicName::new(name),
            vec![],
            vec![],
        ))
    }

    fn identity(name: &str, origin: Option<&str>) -> SourceIdentity {
        SourceIdentity {
            name: name.to_string(),
            origin: origin.map(PathBuf::from),
        }
    }

    #[test]
    fn memoize_and_hit() {
        let mut cache = SourceCache::new();
        let unit = make_unit("Greeter");
        cache.insert(identity("Greeter", None), unit.clone());

        let got = cache.get(&identity("Greeter", None)).unwrap();
        assert!(Arc::ptr_eq(&unit, &got));
    }

    #[test]
    fn distinct_origins_are_distinct_entries() {
        let mut cache = SourceCache::new();
        cache.insert(identity("Greeter", Some("/a/Greeter.kn")), make_unit("Greeter"));
        cache.insert(identity("Greeter", Some("/b/Greeter.kn")), make_unit("Greeter"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&identity("Greeter", None)).is_none());
    }

    #[test]
    fn remove_name_drops_all_identities() {
        let mut cache = SourceCache::new();
        cache.insert(identity("Greeter", None), make_unit("Greeter"));
        cache.insert(identity("Greeter", Some("/a/Greeter.kn")), make_unit("Greeter"));
        cache.insert(identity("Other", None), make_unit("Other"));

        cache.remove_name("Greeter");
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&identity("Other", None)).is_some());
    }

    #[test]
    fn clear_empties() {
        let mut cache = SourceCache::new();
        cache.insert(identity("Greeter", None), make_unit("Greeter"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
