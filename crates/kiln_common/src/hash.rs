//! Content hashing for persisted-unit integrity validation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 content hash.
///
/// Two payloads with the same `ContentHash` are assumed identical. The unit
/// store records a hash of every persisted payload and refuses to serve
/// artifacts whose content no longer matches.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(u128);

impl ContentHash {
    /// Computes the XXH3-128 hash of a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data))
    }

    /// Returns the hash as a 32-character lowercase hex string.
    pub fn to_hex(self) -> String {
        format!("{:032x}", self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:08x}..)", (self.0 >> 96) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"unit payload");
        let b = ContentHash::from_bytes(b"unit payload");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = ContentHash::from_bytes(b"one");
        let b = ContentHash::from_bytes(b"two");
        assert_ne!(a, b);
    }

    #[test]
    fn hex_is_32_chars() {
        let h = ContentHash::from_bytes(b"anything");
        let hex = h.to_hex();
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hex, format!("{h}"));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::from_bytes(b"serde");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
