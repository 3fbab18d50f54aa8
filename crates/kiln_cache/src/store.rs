//! On-disk storage for persisted compiled units.
//!
//! When an output directory is configured, every unit realized by a
//! compilation pass is also written here as a binary artifact: a validated
//! header (magic bytes, format version, loader version, payload checksum,
//! unit metadata) followed by the opaque payload. Reads are fail-safe:
//! anything corrupt, truncated, or from an incompatible format is a miss.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use kiln_common::{ContentHash, SymbolicName};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::unit::BinaryUnit;

/// Magic bytes identifying a kiln unit artifact.
const UNIT_MAGIC: [u8; 4] = *b"KILN";

/// Current artifact format version. Increment on breaking changes to the
/// header or payload layout.
const UNIT_FORMAT_VERSION: u32 = 1;

/// File extension for persisted units.
const UNIT_EXT: &str = "unit";

/// Header prepended to every persisted unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnitHeader {
    /// Magic bytes: must be `b"KILN"`.
    magic: [u8; 4],
    /// Artifact format version.
    format_version: u32,
    /// Loader version that produced this artifact.
    loader_version: String,
    /// Content hash of the payload, for integrity checks.
    checksum: ContentHash,
    /// Origin timestamp as milliseconds since the Unix epoch, if recorded.
    origin_timestamp_ms: Option<u64>,
    /// Names of linked units.
    links: Vec<String>,
    /// Whether the unit was produced by the managed compiler.
    dynamic: bool,
}

/// A directory of persisted compiled units, one artifact per symbolic name.
pub struct UnitStore {
    dir: PathBuf,
    loader_version: String,
}

impl UnitStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(dir: &Path, loader_version: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            loader_version: loader_version.to_string(),
        }
    }

    /// Returns the artifact path for a symbolic name.
    pub fn unit_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{UNIT_EXT}"))
    }

    /// Persists a unit, overwriting any previous artifact for its name.
    pub fn write_unit(&self, unit: &BinaryUnit) -> Result<PathBuf, CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let header = UnitHeader {
            magic: UNIT_MAGIC,
            format_version: UNIT_FORMAT_VERSION,
            loader_version: self.loader_version.clone(),
            checksum: ContentHash::from_bytes(unit.payload()),
            origin_timestamp_ms: unit.origin_timestamp().and_then(timestamp_to_ms),
            links: unit.links().iter().map(|l| l.as_str().to_string()).collect(),
            dynamic: unit.is_dynamic(),
        };

        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;

        // Layout: 4-byte header length (little-endian) + header + payload
        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + unit.payload().len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(unit.payload());

        let path = self.unit_path(unit.name().as_str());
        std::fs::write(&path, &output).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;

        Ok(path)
    }

    /// Reads a persisted unit back, validating its header.
    ///
    /// Returns `None` if no artifact exists, the header is invalid, the
    /// format version does not match, or the checksum does not verify.
    pub fn read_unit(&self, name: &str) -> Option<BinaryUnit> {
        let path = self.unit_path(name);
        let raw = std::fs::read(&path).ok()?;

        if raw.len() < 4 {
            return None;
        }
        let header_len = u32::from_le_bytes(raw[..4].try_into().ok()?) as usize;
        if raw.len() < 4 + header_len {
            return None;
        }

        let header: UnitHeader =
            bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
                .ok()?
                .0;

        if header.magic != UNIT_MAGIC {
            return None;
        }
        if header.format_version != UNIT_FORMAT_VERSION {
            return None;
        }

        let payload = &raw[4 + header_len..];
        if ContentHash::from_bytes(payload) != header.checksum {
            return None;
        }

        let links = header
            .links
            .iter()
            .map(|l| SymbolicName::new(l))
            .collect();
        Some(BinaryUnit::from_parts(
            SymbolicName::new(name),
            payload.to_vec(),
            header.origin_timestamp_ms.map(ms_to_timestamp),
            links,
            header.dynamic,
        ))
    }
}

fn timestamp_to_ms(stamp: SystemTime) -> Option<u64> {
    stamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64)
}

fn ms_to_timestamp(ms: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, UnitStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = UnitStore::new(&dir.path().join("units"), "0.1.0");
        (dir, store)
    }

    fn stamp() -> SystemTime {
        // Millisecond precision survives the header round-trip.
        SystemTime::UNIX_EPOCH + Duration::from_millis(1_700_000_000_123)
    }

    #[test]
    fn write_and_read_roundtrip() {
        let (_dir, store) = make_store();
        let unit = BinaryUnit::compiled(
            SymbolicName::new("app.Greeter"),
            b"compiled image".to_vec(),
            stamp(),
            vec![SymbolicName::new("app.Base")],
        );

        store.write_unit(&unit).unwrap();
        let back = store.read_unit("app.Greeter").unwrap();

        assert_eq!(back.name().as_str(), "app.Greeter");
        assert_eq!(back.payload(), b"compiled image");
        assert_eq!(back.origin_timestamp(), Some(stamp()));
        assert_eq!(back.links().len(), 1);
        assert!(back.is_dynamic());
    }

    #[test]
    fn precompiled_roundtrip_keeps_missing_stamp() {
        let (_dir, store) = make_store();
        let unit = BinaryUnit::precompiled(SymbolicName::new("platform.Object"), vec![7], vec![]);
        store.write_unit(&unit).unwrap();

        let back = store.read_unit("platform.Object").unwrap();
        assert!(back.origin_timestamp().is_none());
        assert!(!back.is_dynamic());
    }

    #[test]
    fn read_missing_returns_none() {
        let (_dir, store) = make_store();
        assert!(store.read_unit("nonexistent.Unit").is_none());
    }

    #[test]
    fn read_corrupt_data_returns_none() {
        let (_dir, store) = make_store();
        std::fs::create_dir_all(store.unit_path("x").parent().unwrap()).unwrap();
        std::fs::write(store.unit_path("garbage.Unit"), b"not an artifact").unwrap();
        assert!(store.read_unit("garbage.Unit").is_none());
    }

    #[test]
    fn read_truncated_returns_none() {
        let (_dir, store) = make_store();
        std::fs::create_dir_all(store.unit_path("x").parent().unwrap()).unwrap();
        std::fs::write(store.unit_path("tiny.Unit"), b"AB").unwrap();
        assert!(store.read_unit("tiny.Unit").is_none());
    }

    #[test]
    fn tampered_payload_returns_none() {
        let (_dir, store) = make_store();
        let unit = BinaryUnit::compiled(SymbolicName::new("app.A"), b"payload".to_vec(), stamp(), vec![]);
        let path = store.write_unit(&unit).unwrap();

        // Flip the last payload byte; the checksum no longer verifies.
        let mut raw = std::fs::read(&path).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        std::fs::write(&path, &raw).unwrap();

        assert!(store.read_unit("app.A").is_none());
    }

    #[test]
    fn write_supersedes_previous_artifact() {
        let (_dir, store) = make_store();
        let old = BinaryUnit::compiled(SymbolicName::new("app.A"), b"old".to_vec(), stamp(), vec![]);
        let new = BinaryUnit::compiled(SymbolicName::new("app.A"), b"new".to_vec(), stamp(), vec![]);
        store.write_unit(&old).unwrap();
        store.write_unit(&new).unwrap();

        assert_eq!(store.read_unit("app.A").unwrap().payload(), b"new");
    }
}
