//! Configuration types deserialized from `kiln.toml`.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The top-level loader configuration parsed from `kiln.toml`.
///
/// Every section has sensible defaults, so an absent or empty configuration
/// file yields a working loader: recompilation disabled, sources looked up
/// under the current directory with the `kn` extension, no persisted output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoaderConfig {
    /// Recompilation policy.
    #[serde(default)]
    pub recompile: RecompileConfig,
    /// Source lookup settings.
    #[serde(default)]
    pub source: SourceConfig,
    /// Persisted-unit output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// The tri-state recompilation switch.
///
/// `Inherit` defers to the global [`RecompileConfig::enabled`] flag; `On`
/// defers to the staleness oracle; `Off` never recompiles a cached unit
/// regardless of timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecompileMode {
    /// Defer to the global configuration flag.
    #[default]
    Inherit,
    /// Recompile when the staleness oracle says the source is newer.
    On,
    /// Never recompile a cached unit.
    Off,
}

/// Recompilation policy settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RecompileConfig {
    /// The tri-state recompilation switch the loader starts with.
    #[serde(default)]
    pub mode: RecompileMode,
    /// The global default consulted when the mode is
    /// [`RecompileMode::Inherit`].
    #[serde(default)]
    pub enabled: bool,
    /// Debounce window in milliseconds: a source must be newer than a unit's
    /// origin timestamp by more than this interval to count as stale.
    #[serde(default = "default_minimum_interval_ms")]
    pub minimum_interval_ms: u64,
}

impl RecompileConfig {
    /// Returns the debounce window as a [`Duration`].
    pub fn minimum_interval(&self) -> Duration {
        Duration::from_millis(self.minimum_interval_ms)
    }
}

impl Default for RecompileConfig {
    fn default() -> Self {
        Self {
            mode: RecompileMode::Inherit,
            enabled: false,
            minimum_interval_ms: default_minimum_interval_ms(),
        }
    }
}

fn default_minimum_interval_ms() -> u64 {
    100
}

/// Source lookup settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Ordered list of directories searched for source files.
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,
    /// File extension (without leading dot) a symbolic name maps to.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            extension: default_extension(),
        }
    }
}

fn default_roots() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

fn default_extension() -> String {
    "kn".to_string()
}

/// Persisted-unit output settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory where compiled units are persisted, if any.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}
