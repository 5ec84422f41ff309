//! Bounded cache of loaded build reports.
//!
//! Hosts that persist reports (one file per build) re-read the same few
//! reports for every baseline and trend. The cache keeps the most recently
//! used ones in memory and evicts the rest, so memory stays bounded no
//! matter how long the build history grows.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::report::Report;

/// Default number of reports kept in memory.
pub const DEFAULT_CAPACITY: usize = 64;

/// Thread-safe LRU cache of reports keyed by build id.
///
/// # Examples
///
/// ```
/// use appd_regress::{Report, ReportCache};
///
/// let cache = ReportCache::new(2);
/// let report = cache.get_or_load(7, || Some(Report::new(0, 10, Vec::new())));
/// assert!(report.is_some());
/// // Served from memory, the loader is not called again.
/// assert!(cache.get_or_load(7, || None).is_some());
/// ```
#[derive(Debug)]
pub struct ReportCache {
    entries: Mutex<LruCache<u64, Arc<Report>>>,
}

impl ReportCache {
    /// Creates a cache holding at most `capacity` reports (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the cached report for `build_id`, marking it recently used.
    pub fn get(&self, build_id: u64) -> Option<Arc<Report>> {
        self.entries.lock().get(&build_id).cloned()
    }

    /// Stores a report, evicting the least recently used one if full.
    pub fn insert(&self, build_id: u64, report: Report) -> Arc<Report> {
        let report = Arc::new(report);
        self.entries.lock().put(build_id, Arc::clone(&report));
        report
    }

    /// Returns the cached report or loads and caches it.
    ///
    /// A loader returning `None` leaves the cache unchanged.
    pub fn get_or_load<F>(&self, build_id: u64, load: F) -> Option<Arc<Report>>
    where
        F: FnOnce() -> Option<Report>,
    {
        if let Some(report) = self.get(build_id) {
            return Some(report);
        }
        load().map(|report| self.insert(build_id, report))
    }

    /// Fallible variant of [`get_or_load`](Self::get_or_load).
    pub fn get_or_try_load<F, E>(&self, build_id: u64, load: F) -> Result<Option<Arc<Report>>, E>
    where
        F: FnOnce() -> Result<Option<Report>, E>,
    {
        if let Some(report) = self.get(build_id) {
            return Ok(Some(report));
        }
        Ok(load()?.map(|report| self.insert(build_id, report)))
    }

    /// Drops the entry for `build_id`, e.g. after the build was deleted.
    pub fn invalidate(&self, build_id: u64) {
        self.entries.lock().pop(&build_id);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report(timestamp_ms: i64) -> Report {
        Report::new(timestamp_ms, 10, Vec::new())
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = ReportCache::new(2);
        cache.insert(1, report(1));
        cache.insert(2, report(2));
        assert!(cache.get(1).is_some());
        cache.insert(3, report(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(2).is_none());
        assert!(cache.get(1).is_some());
        assert!(cache.get(3).is_some());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let cache = ReportCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache = ReportCache::default();
        let loaded: Result<_, String> = cache.get_or_try_load(4, || Err("io".to_string()));
        assert!(loaded.is_err());
        assert!(cache.is_empty());

        assert!(cache.get_or_load(4, || None).is_none());
        assert!(cache.is_empty());

        let loaded: Result<_, String> = cache.get_or_try_load(4, || Ok(Some(report(4))));
        assert_eq!(loaded.unwrap().map(|r| r.timestamp_ms()), Some(4));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let cache = ReportCache::new(4);
        cache.insert(9, report(9));
        cache.invalidate(9);
        assert!(cache.get(9).is_none());
    }
}
