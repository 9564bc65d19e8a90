use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::report::DayReport;

/// Cache key for one derived snapshot. The refresh epoch is bumped by the
/// refresh endpoint; every previous epoch's keys become unreachable, which
/// is what forces recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportKey {
    pub run_date: i32,
    pub refresh_epoch: u64,
}

struct CacheEntry {
    report: Arc<DayReport>,
    expires_at: Instant,
}

/// Short-TTL cache of day snapshots. Snapshots are immutable, so a hit
/// hands out a shared handle; a stale entry is dropped on read and the
/// caller recomputes.
pub struct ReportCache {
    ttl: Duration,
    entries: Mutex<HashMap<ReportKey, CacheEntry>>,
}

impl ReportCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: ReportKey) -> Option<Arc<DayReport>> {
        let mut entries = self.entries.lock().expect("report cache lock poisoned");
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.report.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: ReportKey, report: Arc<DayReport>) {
        let mut entries = self.entries.lock().expect("report cache lock poisoned");
        let now = Instant::now();
        // Expired entries from older epochs or other dates never get read
        // again; drop them while we hold the lock.
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key,
            CacheEntry {
                report,
                expires_at: now + self.ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(run_date: i32) -> Arc<DayReport> {
        Arc::new(DayReport {
            run_date,
            jobs: Vec::new(),
            orphaned_steps: 0,
            skipped_rows: 0,
        })
    }

    #[test]
    fn fresh_entry_is_returned() {
        let cache = ReportCache::new(Duration::from_secs(60));
        let key = ReportKey {
            run_date: 20251110,
            refresh_epoch: 0,
        };
        cache.insert(key, snapshot(20251110));
        let hit = cache.get(key).expect("fresh entry should hit");
        assert_eq!(hit.run_date, 20251110);
    }

    #[test]
    fn different_epoch_misses() {
        let cache = ReportCache::new(Duration::from_secs(60));
        cache.insert(
            ReportKey {
                run_date: 20251110,
                refresh_epoch: 0,
            },
            snapshot(20251110),
        );
        assert!(cache
            .get(ReportKey {
                run_date: 20251110,
                refresh_epoch: 1,
            })
            .is_none());
        assert!(cache
            .get(ReportKey {
                run_date: 20251111,
                refresh_epoch: 0,
            })
            .is_none());
    }

    #[test]
    fn expired_entry_is_dropped_on_read() {
        let cache = ReportCache::new(Duration::ZERO);
        let key = ReportKey {
            run_date: 20251110,
            refresh_epoch: 0,
        };
        cache.insert(key, snapshot(20251110));
        assert!(cache.get(key).is_none());
        // A second read still misses; the entry is gone, not just stale
        assert!(cache.get(key).is_none());
    }

    #[test]
    fn insert_prunes_expired_entries() {
        let cache = ReportCache::new(Duration::ZERO);
        for epoch in 0..10 {
            cache.insert(
                ReportKey {
                    run_date: 20251110,
                    refresh_epoch: epoch,
                },
                snapshot(20251110),
            );
        }
        let entries = cache.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn snapshots_are_shared_not_copied() {
        let cache = ReportCache::new(Duration::from_secs(60));
        let key = ReportKey {
            run_date: 20251110,
            refresh_epoch: 0,
        };
        let report = snapshot(20251110);
        cache.insert(key, report.clone());
        let hit = cache.get(key).unwrap();
        assert!(Arc::ptr_eq(&report, &hit));
    }
}
