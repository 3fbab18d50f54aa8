//! Staleness decisions: is a cached unit outdated relative to its source?

use crate::unit::BinaryUnit;
use kiln_source::SourceLocation;
use std::time::{Duration, SystemTime};

/// Decides whether a candidate unit is outdated and must be regenerated.
///
/// The comparison is debounced: a source must be newer than the unit's
/// origin timestamp by more than a configurable minimum interval before the
/// unit counts as stale, so rapidly touched files do not cause compilation
/// thrashing.
#[derive(Debug, Clone)]
pub struct StalenessOracle {
    minimum_interval: Duration,
}

impl StalenessOracle {
    /// Creates an oracle with the given debounce interval.
    pub fn new(minimum_interval: Duration) -> Self {
        Self { minimum_interval }
    }

    /// Returns the configured debounce interval.
    pub fn minimum_interval(&self) -> Duration {
        self.minimum_interval
    }

    /// Returns `true` if `unit` is outdated with respect to the source at
    /// `location`.
    ///
    /// An absent unit is stale by definition. For local files the source
    /// modification time is the filesystem's own; locations that cannot
    /// report a reliable modification time never make a unit stale.
    pub fn is_stale(&self, unit: Option<&BinaryUnit>, location: &SourceLocation) -> bool {
        self.is_stale_at(unit, location.last_modified())
    }

    /// The timestamp comparison behind [`is_stale`](Self::is_stale), with
    /// the source modification instant supplied directly.
    ///
    /// A unit without an origin timestamp reports no meaningful age and is
    /// treated as never stale; that protects artifacts that were not
    /// produced by the managed compiler or that predate timestamp tracking.
    pub fn is_stale_at(
        &self,
        unit: Option<&BinaryUnit>,
        source_modified: Option<SystemTime>,
    ) -> bool {
        let Some(unit) = unit else {
            return true;
        };
        let Some(built) = unit.origin_timestamp() else {
            return false;
        };
        let Some(modified) = source_modified else {
            return false;
        };
        built + self.minimum_interval < modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_common::SymbolicName;

    fn unit_built_at(stamp: SystemTime) -> BinaryUnit {
        BinaryUnit::compiled(SymbolicName::new("a.B"), vec![], stamp, vec![])
    }

    fn oracle_ms(ms: u64) -> StalenessOracle {
        StalenessOracle::new(Duration::from_millis(ms))
    }

    #[test]
    fn absent_unit_is_stale() {
        let oracle = oracle_ms(0);
        assert!(oracle.is_stale_at(None, None));
        assert!(oracle.is_stale_at(None, Some(SystemTime::now())));
    }

    #[test]
    fn unit_without_timestamp_is_never_stale() {
        let oracle = oracle_ms(0);
        let unit = BinaryUnit::precompiled(SymbolicName::new("a.B"), vec![], vec![]);
        let far_future = SystemTime::now() + Duration::from_secs(3600);
        assert!(!oracle.is_stale_at(Some(&unit), Some(far_future)));
    }

    #[test]
    fn unknown_source_time_is_not_stale() {
        let oracle = oracle_ms(0);
        let unit = unit_built_at(SystemTime::UNIX_EPOCH);
        assert!(!oracle.is_stale_at(Some(&unit), None));
    }

    #[test]
    fn debounce_window_boundaries() {
        // Unit built at T, interval I: modified at T+I-eps is fresh,
        // at T+I is still fresh (strict comparison), at T+I+eps is stale.
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
        let interval = Duration::from_millis(500);
        let oracle = StalenessOracle::new(interval);
        let unit = unit_built_at(t);

        let just_inside = t + interval - Duration::from_millis(1);
        let exactly = t + interval;
        let just_outside = t + interval + Duration::from_millis(1);

        assert!(!oracle.is_stale_at(Some(&unit), Some(just_inside)));
        assert!(!oracle.is_stale_at(Some(&unit), Some(exactly)));
        assert!(oracle.is_stale_at(Some(&unit), Some(just_outside)));
    }

    #[test]
    fn older_source_is_not_stale() {
        let t = SystemTime::now();
        let oracle = oracle_ms(0);
        let unit = unit_built_at(t);
        assert!(!oracle.is_stale_at(Some(&unit), Some(t - Duration::from_secs(60))));
    }

    #[test]
    fn file_location_modification_drives_staleness() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("B.kn");
        std::fs::write(&path, "unit B").unwrap();
        let location = SourceLocation::File(path);

        let oracle = oracle_ms(0);
        // Built an hour ago: the file on disk is newer.
        let old_unit = unit_built_at(SystemTime::now() - Duration::from_secs(3600));
        assert!(oracle.is_stale(Some(&old_unit), &location));
        // Built an hour from now: nothing on disk can be newer.
        let fresh_unit = unit_built_at(SystemTime::now() + Duration::from_secs(3600));
        assert!(!oracle.is_stale(Some(&fresh_unit), &location));
    }

    #[test]
    fn memory_location_never_stale() {
        let oracle = oracle_ms(0);
        let unit = unit_built_at(SystemTime::UNIX_EPOCH);
        let location = SourceLocation::memory("snippet", "unit B");
        assert!(!oracle.is_stale(Some(&unit), &location));
    }
}
