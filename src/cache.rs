//! Time-boxed cache of cleaned tables, keyed by (source, tab).
//!
//! A fresh load replaces the stored table; callers holding an `Arc` to the
//! superseded table keep a consistent snapshot until they drop it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::data::model::CleanedTable;
use crate::data::source::SheetKey;
use crate::error::DashboardResult;

/// Default table time-to-live before a forced rebuild.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

struct CacheEntry {
    table: Arc<CleanedTable>,
    built_at: Instant,
}

/// Read-mostly cache with rebuild-on-miss. The lock is held across the
/// rebuild, so at most one rebuild runs at a time; rebuilds are idempotent
/// so this is a throughput concern only.
pub struct SheetCache {
    ttl: Duration,
    entries: Mutex<HashMap<SheetKey, CacheEntry>>,
}

impl Default for SheetCache {
    fn default() -> Self {
        SheetCache::new(DEFAULT_TTL)
    }
}

impl SheetCache {
    pub fn new(ttl: Duration) -> Self {
        SheetCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached table for `key`, or run `load` and cache its result
    /// when the entry is missing or older than the TTL. A failed load leaves
    /// the cache unchanged.
    pub fn get_or_load<F>(&self, key: &SheetKey, load: F) -> DashboardResult<Arc<CleanedTable>>
    where
        F: FnOnce() -> DashboardResult<CleanedTable>,
    {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(entry) = entries.get(key) {
            if entry.built_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&entry.table));
            }
        }

        let table = Arc::new(load()?);
        log::info!(
            "rebuilt table for {key}: {} records, {} dropped",
            table.len(),
            table.dropped_rows
        );
        entries.insert(
            key.clone(),
            CacheEntry {
                table: Arc::clone(&table),
                built_at: Instant::now(),
            },
        );
        Ok(table)
    }

    /// Drop the entry for `key`, forcing the next read to rebuild.
    pub fn invalidate(&self, key: &SheetKey) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn table_of(n: usize) -> CleanedTable {
        use crate::data::model::StockRecord;
        let records = (0..n)
            .map(|i| StockRecord {
                date: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                product_id: format!("{i}"),
                product_name: format!("Product {i}"),
                category: "Food".into(),
                qty_delta: 1.0,
                value_delta: 1.0,
            })
            .collect();
        CleanedTable::from_records(records, 0)
    }

    #[test]
    fn second_read_hits_the_cache() {
        let cache = SheetCache::default();
        let key = SheetKey::new("sheet://demo", "Sheet1");
        let loads = Cell::new(0);

        let first = cache
            .get_or_load(&key, || {
                loads.set(loads.get() + 1);
                Ok(table_of(3))
            })
            .unwrap();
        let second = cache
            .get_or_load(&key, || {
                loads.set(loads.get() + 1);
                Ok(table_of(99))
            })
            .unwrap();

        assert_eq!(loads.get(), 1);
        assert_eq!(first.len(), 3);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn distinct_keys_load_separately() {
        let cache = SheetCache::default();
        let a = cache
            .get_or_load(&SheetKey::new("sheet://demo", "A"), || Ok(table_of(1)))
            .unwrap();
        let b = cache
            .get_or_load(&SheetKey::new("sheet://demo", "B"), || Ok(table_of(2)))
            .unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn expired_entry_is_rebuilt() {
        let cache = SheetCache::new(Duration::ZERO);
        let key = SheetKey::new("sheet://demo", "Sheet1");
        let loads = Cell::new(0);

        for _ in 0..2 {
            cache
                .get_or_load(&key, || {
                    loads.set(loads.get() + 1);
                    Ok(table_of(1))
                })
                .unwrap();
        }
        assert_eq!(loads.get(), 2);
    }

    #[test]
    fn failed_load_leaves_cache_empty() {
        let cache = SheetCache::default();
        let key = SheetKey::new("sheet://demo", "Sheet1");

        let err = cache.get_or_load(&key, || {
            Err(crate::error::DashboardError::SourceUnavailable("down".into()))
        });
        assert!(err.is_err());

        // Next read loads again rather than serving a poisoned entry.
        let table = cache.get_or_load(&key, || Ok(table_of(4))).unwrap();
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn invalidate_forces_rebuild() {
        let cache = SheetCache::default();
        let key = SheetKey::new("sheet://demo", "Sheet1");
        let loads = Cell::new(0);

        let mut load = || {
            loads.set(loads.get() + 1);
            Ok(table_of(1))
        };
        cache.get_or_load(&key, &mut load).unwrap();
        cache.invalidate(&key);
        cache.get_or_load(&key, &mut load).unwrap();
        assert_eq!(loads.get(), 2);
    }
}
