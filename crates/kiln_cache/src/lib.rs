//! Unit caching and staleness bookkeeping for the kiln loader.
//!
//! This crate holds the state the load coordinator reasons over: compiled
//! [`BinaryUnit`]s, the name-keyed and source-identity-keyed caches, the
//! staleness oracle deciding whether a cached unit is outdated, and an
//! on-disk store for persisted units. The caches themselves are plain maps;
//! the coordinator owns the single mutual-exclusion domain that makes its
//! compound check-then-compile sequences linearizable.

#![warn(missing_docs)]

pub mod error;
pub mod name_cache;
pub mod source_cache;
pub mod staleness;
pub mod store;
pub mod unit;

pub use error::CacheError;
pub use name_cache::NameCache;
pub use source_cache::SourceCache;
pub use staleness::StalenessOracle;
pub use store::UnitStore;
pub use unit::BinaryUnit;
