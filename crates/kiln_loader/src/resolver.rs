//! Mapping symbolic names to source locations.

use kiln_common::SymbolicName;
use kiln_config::SourceConfig;
use kiln_source::SourceLocation;
use std::io;
use std::path::PathBuf;

/// Maps a symbolic name to a source location, if one exists.
///
/// `Ok(None)` means "no source for this name" and is not an error; the
/// coordinator keeps whatever candidate it already has. I/O errors are
/// wrapped and recorded as the request's fallback error without aborting
/// other in-flight requests.
pub trait SourceResolver: Send + Sync {
    /// Resolves a symbolic name to a source location.
    fn resolve(&self, name: &SymbolicName) -> io::Result<Option<SourceLocation>>;
}

/// Resolves names against an ordered list of source root directories.
///
/// `a.b.Greeter` maps to `<root>/a/b/Greeter.<ext>` in the first root that
/// contains it. Because filesystem existence checks may be case-insensitive,
/// a hit is confirmed by listing the parent directory and comparing the
/// filename exactly; a case mismatch is a miss.
pub struct DirectoryResolver {
    roots: Vec<PathBuf>,
    extension: String,
}

impl DirectoryResolver {
    /// Creates a resolver over the given roots and source extension.
    pub fn new(roots: Vec<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            roots,
            extension: extension.into(),
        }
    }

    /// Creates a resolver from the source section of a loader configuration.
    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(config.roots.clone(), config.extension.clone())
    }

    /// Returns the path a name maps to, relative to a root.
    fn relative_path(&self, name: &SymbolicName) -> PathBuf {
        let mut rel = PathBuf::new();
        for segment in name.as_str().split('.') {
            rel.push(segment);
        }
        rel.set_extension(&self.extension);
        rel
    }
}

impl SourceResolver for DirectoryResolver {
    fn resolve(&self, name: &SymbolicName) -> io::Result<Option<SourceLocation>> {
        let rel = self.relative_path(name);
        for root in &self.roots {
            let path = root.join(&rel);
            if !path.is_file() {
                continue;
            }
            let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
                continue;
            };
            let mut matched = false;
            for entry in std::fs::read_dir(parent)? {
                if entry?.file_name().as_os_str() == file_name {
                    matched = true;
                    break;
                }
            }
            if matched {
                return Ok(Some(SourceLocation::File(path)));
            }
        }
        Ok(None)
    }
}
