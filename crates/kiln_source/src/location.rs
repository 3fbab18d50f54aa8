//! Resolved source locations and their modification-time metadata.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A place a source can be fetched from.
///
/// Locations are what a source resolver hands back for a symbolic name:
/// either a file on the local filesystem or an in-memory buffer (used by
/// embedders and tests that supply source text directly).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// A source file on the local filesystem.
    File(PathBuf),
    /// An in-memory source with a display name and its full text.
    Memory {
        /// Display name for the buffer.
        name: String,
        /// The source text.
        content: String,
    },
}

impl SourceLocation {
    /// Creates an in-memory location.
    pub fn memory(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Memory {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Returns the filesystem path if this is a file location.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Memory { .. } => None,
        }
    }

    /// Returns the instant the source was last modified, if it can be
    /// determined reliably.
    ///
    /// Local files are queried through the filesystem's own metadata.
    /// Generic transport metadata for "last modified" is frequently
    /// unreliable, so locations without filesystem backing report `None`,
    /// which the staleness oracle treats as "not newer than anything".
    pub fn last_modified(&self) -> Option<SystemTime> {
        match self {
            Self::File(path) => std::fs::metadata(path).ok()?.modified().ok(),
            Self::Memory { .. } => None,
        }
    }

    /// Reads the full source text at this location.
    pub fn read(&self) -> io::Result<String> {
        match self {
            Self::File(path) => std::fs::read_to_string(path),
            Self::Memory { content, .. } => Ok(content.clone()),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory { name, .. } => write!(f, "<memory:{name}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_location_reads_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greeter.kn");
        std::fs::write(&path, "unit Greeter").unwrap();

        let loc = SourceLocation::File(path.clone());
        assert_eq!(loc.path(), Some(path.as_path()));
        assert_eq!(loc.read().unwrap(), "unit Greeter");
    }

    #[test]
    fn file_location_reports_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greeter.kn");
        std::fs::write(&path, "unit Greeter").unwrap();

        let loc = SourceLocation::File(path);
        assert!(loc.last_modified().is_some());
    }

    #[test]
    fn missing_file_has_no_modification_time() {
        let loc = SourceLocation::File(PathBuf::from("/nonexistent/greeter.kn"));
        assert!(loc.last_modified().is_none());
        assert!(loc.read().is_err());
    }

    #[test]
    fn memory_location_has_no_modification_time() {
        let loc = SourceLocation::memory("snippet", "unit A");
        assert!(loc.last_modified().is_none());
        assert!(loc.path().is_none());
        assert_eq!(loc.read().unwrap(), "unit A");
    }

    #[test]
    fn display_formats() {
        let file = SourceLocation::File(PathBuf::from("src/A.kn"));
        assert_eq!(format!("{file}"), "src/A.kn");
        let mem = SourceLocation::memory("snippet", "");
        assert_eq!(format!("{mem}"), "<memory:snippet>");
    }
}
