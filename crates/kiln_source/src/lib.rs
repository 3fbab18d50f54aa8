//! Source handles for the kiln loader.
//!
//! This crate represents the inputs to compilation: where a source lives
//! ([`SourceLocation`]), the source itself ([`SourceUnit`]), the identity
//! under which a directly presented source is memoized ([`SourceIdentity`]),
//! and byte-range [`Span`]s for attributing diagnostics to source text.

#![warn(missing_docs)]

pub mod location;
pub mod span;
pub mod unit;

pub use location::SourceLocation;
pub use span::Span;
pub use unit::{SourceIdentity, SourceUnit};
