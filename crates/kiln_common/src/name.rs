//! Hierarchical symbolic names identifying compiled units.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// A dotted hierarchical identifier for a compiled unit (e.g. `app.util.Greeter`).
///
/// Names are immutable once assigned and cheap to clone: the text is shared
/// behind an `Arc`, so a name can key the caches and travel inside units
/// without reallocating. Slash separators are accepted on construction and
/// normalized to dots, so `app/util/Greeter` and `app.util.Greeter` denote
/// the same unit.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SymbolicName(Arc<str>);

impl SymbolicName {
    /// Creates a symbolic name, normalizing `/` separators to `.`.
    pub fn new(name: &str) -> Self {
        if name.contains('/') {
            Self(name.replace('/', ".").into())
        } else {
            Self(name.into())
        }
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the package portion of the name (everything before the last
    /// dot), or `None` for an unqualified name.
    pub fn package(&self) -> Option<&str> {
        self.0.rfind('.').map(|idx| &self.0[..idx])
    }

    /// Returns the final segment of the name.
    pub fn simple_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }
}

impl fmt::Display for SymbolicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SymbolicName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for SymbolicName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets `HashMap<SymbolicName, _>` be queried with a plain `&str`.
impl Borrow<str> for SymbolicName {
    fn borrow(&self) -> &str {
        &self.0
    }
}
