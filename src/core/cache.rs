//! Caching utilities: an in-memory TTL-bounded LRU memo cache plus the
//! file-system helpers used to persist fetched league history.
//!
//! The memo cache is never a correctness dependency. Every value it holds can
//! be re-derived from the league history, so clearing it at any time only
//! costs recomputation.

use lru::LruCache;
use std::{
    fs,
    hash::Hash,
    io::{Read, Write},
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::cli::types::{LeagueId, Season, Week};

const CACHE_DIR_NAME: &str = "league-metrics";

fn cache_base() -> PathBuf {
    dirs::cache_dir().unwrap_or_else(|| {
        let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.push(".cache");
        home
    })
}

/// Path: ~/.cache/league-metrics/history_{league_id}.json
pub fn history_path(league_id: LeagueId) -> PathBuf {
    cache_base()
        .join(CACHE_DIR_NAME)
        .join(format!("history_{}.json", league_id.as_u64()))
}

/// Try to read a file into a String
pub fn try_read_to_string(path: &Path) -> Option<String> {
    let mut f = fs::File::open(path).ok()?;
    let mut s = String::new();

    f.read_to_string(&mut s).ok()?;

    Some(s)
}

/// Write a string to file
pub fn write_string(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut f = fs::File::create(path)?;
    f.write_all(contents.as_bytes())
}

/// Cache key for values derived from one season as of one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeasonWeekKey {
    pub season: Season,
    pub week: Week,
}

impl SeasonWeekKey {
    pub fn new(season: Season, week: Week) -> Self {
        Self { season, week }
    }
}

/// LRU cache whose entries also expire after a fixed time-to-live.
pub struct MemoCache<K, V>
where
    K: Hash + Eq,
{
    entries: Mutex<LruCache<K, (Instant, V)>>,
    capacity: usize,
    ttl: Duration,
}

impl<K, V> MemoCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries for `ttl` each.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            capacity: cap.get(),
            ttl,
        }
    }

    // A poisoned lock only means another caller panicked mid-insert; the
    // cache contents are still plain values, so keep using them.
    fn lock(&self) -> MutexGuard<'_, LruCache<K, (Instant, V)>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get a live entry; expired entries are evicted on access.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.lock();
        let expired = match cache.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => {
                return Some(value.clone())
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            cache.pop(key);
        }
        None
    }

    /// Insert or replace an entry, restarting its TTL.
    pub fn put(&self, key: K, value: V) {
        self.lock().put(key, (Instant::now(), value));
    }

    /// Return the cached value or compute, store and return it.
    ///
    /// The computation runs without the lock held, so two racing callers may
    /// both compute; the later insert wins. Values are pure, so either is fine.
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        let value = compute();
        self.put(key, value.clone());
        value
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// (entries held, capacity)
    pub fn stats(&self) -> (usize, usize) {
        (self.lock().len(), self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::tempdir;

    #[test]
    fn test_history_path() {
        let path = history_path(LeagueId::new(12345));
        let path_str = path.to_string_lossy();

        assert!(path_str.contains("league-metrics"));
        assert!(path_str.contains("history_12345.json"));
    }

    #[test]
    fn test_try_read_to_string_nonexistent_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nonexistent.txt");

        assert_eq!(try_read_to_string(&file_path), None);
    }

    #[test]
    fn test_write_string_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("subdir").join("output.txt");

        write_string(&file_path, "test content").unwrap();

        let content = try_read_to_string(&file_path);
        assert_eq!(content, Some("test content".to_string()));
    }

    #[test]
    fn test_memo_cache_hit_and_lru_eviction() {
        let cache: MemoCache<SeasonWeekKey, f64> = MemoCache::new(2, Duration::from_secs(30));
        let k1 = SeasonWeekKey::new(Season::new(2024), Week::new(1));
        let k2 = SeasonWeekKey::new(Season::new(2024), Week::new(2));
        let k3 = SeasonWeekKey::new(Season::new(2024), Week::new(3));

        cache.put(k1, 1.0);
        assert_eq!(cache.get(&k1), Some(1.0));

        cache.put(k2, 2.0);
        cache.put(k3, 3.0);

        assert_eq!(cache.stats(), (2, 2));
        assert_eq!(cache.get(&k1), None);
        assert_eq!(cache.get(&k3), Some(3.0));
    }

    #[test]
    fn test_memo_cache_expires_entries() {
        let cache: MemoCache<u32, u32> = MemoCache::new(4, Duration::ZERO);
        cache.put(1, 10);

        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.stats().0, 0);
    }

    #[test]
    fn test_get_or_insert_with_computes_once() {
        let cache: MemoCache<u32, u32> = MemoCache::new(4, Duration::from_secs(30));
        let calls = Cell::new(0);

        for _ in 0..3 {
            let v = cache.get_or_insert_with(7, || {
                calls.set(calls.get() + 1);
                49
            });
            assert_eq!(v, 49);
        }
        assert_eq!(calls.get(), 1);

        cache.clear();
        cache.get_or_insert_with(7, || {
            calls.set(calls.get() + 1);
            49
        });
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache: MemoCache<u32, u32> = MemoCache::new(0, Duration::from_secs(1));
        assert_eq!(cache.stats(), (0, 1));
    }
}
