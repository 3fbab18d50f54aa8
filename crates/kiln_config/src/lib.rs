//! Loader configuration parsed from `kiln.toml`.
//!
//! Covers the recompilation policy (tri-state mode, global default flag, and
//! the staleness debounce interval), source lookup roots and extension, and
//! the optional persisted-unit output directory.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::{LoaderConfig, OutputConfig, RecompileConfig, RecompileMode, SourceConfig};
