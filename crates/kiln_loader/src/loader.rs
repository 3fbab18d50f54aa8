//! The load coordinator: the per-request state machine that decides between
//! returning a cached unit, delegating to an ancestor, and recompiling.

use crate::ancestry::{AccessPolicy, AllowAll, AncestorResolver};
use crate::compiler::Compiler;
use crate::error::LoadError;
use crate::pass;
use crate::resolver::{DirectoryResolver, SourceResolver};
use kiln_cache::{BinaryUnit, NameCache, SourceCache, StalenessOracle, UnitStore};
use kiln_common::SymbolicName;
use kiln_config::{LoaderConfig, RecompileMode};
use kiln_source::SourceUnit;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Per-request options for [`Loader::load`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Whether the request may fall back to resolving and compiling source.
    pub allow_source_lookup: bool,
    /// Prefer a cached unit over a freshly compiled one even when the
    /// cached unit is eligible for recompilation.
    pub prefer_cached: bool,
    /// Best-effort pre-resolution of the returned unit's recorded links.
    pub resolve_links: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            allow_source_lookup: true,
            prefer_cached: false,
            resolve_links: false,
        }
    }
}

/// Both caches, guarded together.
///
/// One mutex scoped to the whole cache, not per key, because the
/// coordinator's compound check-then-compile-then-install sequences must be
/// linearizable with respect to each other. Compilation runs inside this
/// critical section, so compilations for different names are serialized
/// process-wide; a known scalability limit accepted for correctness
/// simplicity. There is no timeout contract: a hung compiler blocks every
/// other cache consumer.
struct CacheState {
    names: NameCache,
    sources: SourceCache,
}

/// How the source-lookup step concluded.
enum LookupOutcome {
    /// Another thread's freshly installed unit was adopted verbatim.
    Adopted(Arc<BinaryUnit>),
    /// The step ran to completion and finalized the cache with this result.
    Finalized(Option<Arc<BinaryUnit>>),
}

/// A compile-on-demand unit loader.
///
/// Each loader owns its own caches; there are no process-wide singletons.
/// Construct one with [`Loader::new`], wire collaborators with the
/// builder-style `with_*` methods, and tear it down with
/// [`clear_all`](Self::clear_all).
pub struct Loader {
    config: LoaderConfig,
    recompile_mode: Mutex<RecompileMode>,
    oracle: StalenessOracle,
    state: Mutex<CacheState>,
    resolver: Box<dyn SourceResolver>,
    compiler: Box<dyn Compiler>,
    ancestors: Vec<Box<dyn AncestorResolver>>,
    policy: Box<dyn AccessPolicy>,
    store: Option<UnitStore>,
}

impl Loader {
    /// Creates a loader from a configuration and a compiler collaborator.
    ///
    /// Sources are resolved by a [`DirectoryResolver`] over the configured
    /// roots, every package is accessible, and no ancestors are consulted;
    /// override each with the `with_*` methods.
    pub fn new(config: LoaderConfig, compiler: Box<dyn Compiler>) -> Self {
        let resolver = Box::new(DirectoryResolver::from_config(&config.source));
        let oracle = StalenessOracle::new(config.recompile.minimum_interval());
        let store = config
            .output
            .dir
            .as_deref()
            .map(|dir| UnitStore::new(dir, env!("CARGO_PKG_VERSION")));
        let mode = config.recompile.mode;
        Self {
            config,
            recompile_mode: Mutex::new(mode),
            oracle,
            state: Mutex::new(CacheState {
                names: NameCache::new(),
                sources: SourceCache::new(),
            }),
            resolver,
            compiler,
            ancestors: Vec::new(),
            policy: Box::new(AllowAll),
            store,
        }
    }

    /// Replaces the source resolver.
    pub fn with_resolver(mut self, resolver: Box<dyn SourceResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Appends an ancestor to the delegation chain (parent-first order).
    ///
    /// Chains must be acyclic; a loader reachable from its own ancestor
    /// chain deadlocks on its cache mutex.
    pub fn with_ancestor(mut self, ancestor: Box<dyn AncestorResolver>) -> Self {
        self.ancestors.push(ancestor);
        self
    }

    /// Replaces the package access policy.
    pub fn with_policy(mut self, policy: Box<dyn AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the configuration this loader was built from.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Returns the current tri-state recompilation mode.
    pub fn recompile_mode(&self) -> RecompileMode {
        *self.recompile_mode.lock().unwrap()
    }

    /// Overrides the recompilation mode at runtime.
    pub fn set_recompile_mode(&self, mode: RecompileMode) {
        *self.recompile_mode.lock().unwrap() = mode;
    }

    /// Loads the unit for a symbolic name.
    ///
    /// Resolution order: the local cache, then the ancestor chain (each
    /// query preceded by the package access check; an ancestor's answer is
    /// authoritative unless identical to the local candidate), then, if
    /// the candidate is recompilation-eligible and the caller allowed
    /// source lookup, source resolution and compilation under the cache
    /// mutex. An absent result is removed from the cache rather than
    /// recorded, so a unit whose source appears later can still be loaded.
    pub fn load(&self, name: &str, options: &LoadOptions) -> Result<Arc<BinaryUnit>, LoadError> {
        let name = SymbolicName::new(name);
        let mut candidate = self.state.lock().unwrap().names.get(name.as_str());
        let mut fallback: Option<LoadError> = None;

        for ancestor in &self.ancestors {
            if let Some(package) = name.package() {
                self.policy.check_access(package)?;
            }
            match ancestor.resolve(&name)? {
                Some(unit) => {
                    let identical = candidate.as_ref().is_some_and(|c| Arc::ptr_eq(c, &unit));
                    if !identical {
                        debug!(name = %name, "ancestor answered; local cache untouched");
                        return self.finish(unit, options);
                    }
                    // Identical to what we already hold: not authoritative,
                    // fall through to local staleness logic.
                }
                None => {
                    fallback.get_or_insert_with(|| LoadError::NotFound {
                        name: name.to_string(),
                    });
                }
            }
        }

        let recompilable = self.is_recompilable(candidate.as_deref());
        if let Some(unit) = &candidate {
            if options.prefer_cached || !recompilable {
                debug!(name = %name, "returning cached unit");
                return self.finish(Arc::clone(unit), options);
            }
        }

        if options.allow_source_lookup {
            match self.lookup_and_recompile(&name, candidate, &mut fallback)? {
                LookupOutcome::Adopted(unit) => return self.finish(unit, options),
                LookupOutcome::Finalized(result) => candidate = result,
            }
        } else if candidate.is_none() {
            fallback.get_or_insert_with(|| LoadError::NotFound {
                name: name.to_string(),
            });
        }

        match candidate {
            Some(unit) => self.finish(unit, options),
            None => Err(fallback.unwrap_or_else(|| LoadError::Invariant {
                message: format!("no unit and no error recorded for '{name}'"),
            })),
        }
    }

    /// Compiles a directly presented source, memoized by source identity.
    ///
    /// A memoization hit returns the previously produced main unit without
    /// invoking the compiler and without any staleness check: this path is a
    /// pure memoize-by-identity. On a miss the compilation pass runs and
    /// every produced unit is installed in the name cache before the main
    /// unit is returned.
    pub fn parse(
        &self,
        source: &SourceUnit,
        cache_by_identity: bool,
    ) -> Result<Arc<BinaryUnit>, LoadError> {
        let identity = source.identity();
        let mut state = self.state.lock().unwrap();
        if let Some(unit) = state.sources.get(&identity) {
            debug!(source = source.name(), "source identity memoized");
            return Ok(unit);
        }
        let outcome = pass::run(&*self.compiler, source, &mut state.names, self.store.as_ref())
            .map_err(LoadError::from)?;
        if cache_by_identity {
            state.sources.insert(identity, Arc::clone(&outcome.main));
        }
        Ok(outcome.main)
    }

    /// Removes the cached unit for a name. Returns `true` if one was cached.
    pub fn invalidate(&self, name: &str) -> bool {
        self.state.lock().unwrap().names.remove(name)
    }

    /// Empties both caches.
    pub fn clear_all(&self) {
        let mut state = self.state.lock().unwrap();
        state.names.clear();
        state.sources.clear();
    }

    /// Returns every unit currently loaded by this loader.
    pub fn snapshot_loaded(&self) -> Vec<Arc<BinaryUnit>> {
        self.state.lock().unwrap().names.snapshot()
    }

    /// Whether a recompilation may be attempted for this candidate.
    ///
    /// An absent candidate always is. A present one is only recompiled when
    /// the tri-state mode allows it (Inherit defers to the configured global
    /// flag), the unit was produced by the managed compiler, and it carries
    /// an origin timestamp to compare against.
    fn is_recompilable(&self, unit: Option<&BinaryUnit>) -> bool {
        let Some(unit) = unit else {
            return true;
        };
        match self.recompile_mode() {
            RecompileMode::Off => return false,
            RecompileMode::Inherit if !self.config.recompile.enabled => return false,
            _ => {}
        }
        unit.is_dynamic() && unit.origin_timestamp().is_some()
    }

    /// The source-lookup-and-recompile step, entirely inside the cache
    /// mutex so that at most one compilation per name can be in flight.
    fn lookup_and_recompile(
        &self,
        name: &SymbolicName,
        mut candidate: Option<Arc<BinaryUnit>>,
        fallback: &mut Option<LoadError>,
    ) -> Result<LookupOutcome, LoadError> {
        let mut state = self.state.lock().unwrap();

        // Another thread may have completed a recompilation for this name
        // between the unlocked cache read and here; adopt its result rather
        // than compiling a second time.
        let current = state.names.get(name.as_str());
        let changed = match (&candidate, &current) {
            (Some(a), Some(b)) => !Arc::ptr_eq(a, b),
            (None, None) => false,
            _ => true,
        };
        if changed {
            match current {
                Some(unit) => {
                    debug!(name = %name, "adopting concurrently installed unit");
                    return Ok(LookupOutcome::Adopted(unit));
                }
                // The entry was removed since the first read: resolve with
                // an absent candidate instead of surfacing a vanished unit.
                None => candidate = None,
            }
        }

        match self.resolver.resolve(name) {
            Ok(Some(location)) => {
                if self.oracle.is_stale(candidate.as_deref(), &location) {
                    info!(name = %name, location = %location, "source is newer, compiling");
                    state.sources.remove_name(name.as_str());
                    match location.read() {
                        Ok(content) => {
                            let source = SourceUnit::new(
                                name.as_str(),
                                content,
                                location.path().map(|p| p.to_path_buf()),
                            );
                            match pass::run(
                                &*self.compiler,
                                &source,
                                &mut state.names,
                                self.store.as_ref(),
                            ) {
                                Ok(outcome) => {
                                    debug!(name = %name, installed = outcome.all.len(), "recompiled");
                                    state.sources.insert(source.identity(), Arc::clone(&outcome.main));
                                    candidate = Some(outcome.main);
                                }
                                Err(err) => {
                                    // A failed compilation aborts the request,
                                    // but the cache is still finalized to the
                                    // prior candidate; auxiliaries installed
                                    // before the failure are kept.
                                    finalize(&mut state.names, name, candidate.as_ref());
                                    return Err(err.into());
                                }
                            }
                        }
                        Err(err) => {
                            warn!(name = %name, error = %err, "source read failed");
                            *fallback = Some(LoadError::Io {
                                name: name.to_string(),
                                source: err,
                            });
                        }
                    }
                }
            }
            Ok(None) => {
                if candidate.is_none() {
                    fallback.get_or_insert_with(|| LoadError::NotFound {
                        name: name.to_string(),
                    });
                }
            }
            Err(err) => {
                warn!(name = %name, error = %err, "source resolution failed");
                *fallback = Some(LoadError::Io {
                    name: name.to_string(),
                    source: err,
                });
            }
        }

        finalize(&mut state.names, name, candidate.as_ref());
        Ok(LookupOutcome::Finalized(candidate))
    }

    fn finish(
        &self,
        unit: Arc<BinaryUnit>,
        options: &LoadOptions,
    ) -> Result<Arc<BinaryUnit>, LoadError> {
        if options.resolve_links {
            self.resolve_links(&unit);
        }
        Ok(unit)
    }

    /// Best-effort pre-resolution of a unit's recorded links through the
    /// cache and ancestors. Failures are expected (a link may be satisfied
    /// by the execution platform) and are only logged.
    fn resolve_links(&self, unit: &BinaryUnit) {
        let options = LoadOptions {
            allow_source_lookup: false,
            prefer_cached: true,
            resolve_links: false,
        };
        for link in unit.links() {
            if let Err(err) = self.load(link.as_str(), &options) {
                debug!(link = %link, error = %err, "link did not resolve");
            }
        }
    }
}

/// Writes the request's final answer back to the name cache: a present unit
/// is installed under its own name, an absent one is removed under the
/// requested name. Absence must never be left behind as a cached fact.
fn finalize(names: &mut NameCache, name: &SymbolicName, candidate: Option<&Arc<BinaryUnit>>) {
    match candidate {
        Some(unit) => names.insert(Arc::clone(unit)),
        None => {
            names.remove(name.as_str());
        }
    }
}

impl AncestorResolver for Arc<Loader> {
    fn resolve(&self, name: &SymbolicName) -> Result<Option<Arc<BinaryUnit>>, LoadError> {
        match self.load(name.as_str(), &LoadOptions::default()) {
            Ok(unit) => Ok(Some(unit)),
            Err(LoadError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
