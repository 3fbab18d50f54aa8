//! Error types for unit-store operations.

use std::path::PathBuf;

/// Errors that can occur while persisting or reading stored units.
///
/// Reads are fail-safe (a corrupt or incompatible artifact is a miss, not
/// an error), so this enum surfaces only on the write path.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing a stored unit.
    #[error("unit store I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A header could not be encoded or decoded.
    #[error("unit store serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
