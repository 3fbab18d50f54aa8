//! Source units presented for compilation and their memoization identity.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter backing synthetic names for anonymous sources.
static ANONYMOUS_COUNTER: AtomicU64 = AtomicU64::new(1);

/// The identity under which a directly presented source is memoized.
///
/// Keyed on *how the caller referred to the source*: its declared name plus
/// the origin path, when one exists. The resulting unit name and the stream
/// or buffer instance play no part in the key. Two `SourceUnit`s with equal identity
/// are the same compilation target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceIdentity {
    /// The declared name of the source.
    pub name: String,
    /// The filesystem origin, if the source came from a file.
    pub origin: Option<PathBuf>,
}

/// A named piece of source text handed to the compiler.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    name: String,
    content: String,
    origin: Option<PathBuf>,
}

impl SourceUnit {
    /// Creates a source unit from its parts.
    pub fn new(name: impl Into<String>, content: impl Into<String>, origin: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            origin,
        }
    }

    /// Reads a source unit from a file; the file path becomes both the
    /// declared name and the origin.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self {
            name: path.display().to_string(),
            content,
            origin: Some(path.to_path_buf()),
        })
    }

    /// Creates a source unit from text under an explicit declared name.
    pub fn from_text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(name, content, None)
    }

    /// Creates a source unit with a synthesized, process-unique name.
    ///
    /// Each call draws a fresh name (`script1`, `script2`, ...), so two
    /// anonymous units never share a memoization identity.
    pub fn anonymous(content: impl Into<String>) -> Self {
        let n = ANONYMOUS_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::new(format!("script{n}"), content, None)
    }

    /// The declared name of this source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full source text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The filesystem origin, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// The identity under which this source is memoized.
    pub fn identity(&self) -> SourceIdentity {
        SourceIdentity {
            name: self.name.clone(),
            origin: self.origin.clone(),
        }
    }
}
