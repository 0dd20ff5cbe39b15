//! Rendered-page cache keyed by request path.

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Cache of rendered responses that writers invalidate by path.
///
/// Readers take `generation()` before loading the data they render and hand
/// it back to `store`. A render that raced with `revalidate_path` is dropped
/// instead of resurrecting the stale page.
pub trait PageCache: Send + Sync {
    fn get(&self, path: &str) -> Option<String>;

    /// Current invalidation generation.
    fn generation(&self) -> u64;

    /// Cache `body` unless the cache was revalidated since `generation`.
    /// Returns whether the body was kept.
    fn store(&self, path: &str, generation: u64, body: String) -> bool;

    /// Mark `path` and everything below it as stale.
    fn revalidate_path(&self, path: &str);
}

#[derive(Debug, Clone)]
struct CachedPage {
    body: String,
    cached_utc: DateTime<Utc>,
}

/// In-process `PageCache`.
#[derive(Debug, Default)]
pub struct MemoryPageCache {
    pages: DashMap<String, CachedPage>,
    generation: AtomicU64,
}

impl MemoryPageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn is_under(candidate: &str, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    candidate == path
        || candidate
            .strip_prefix(path)
            .is_some_and(|rest| rest.starts_with('/'))
}

impl PageCache for MemoryPageCache {
    fn get(&self, path: &str) -> Option<String> {
        self.pages.get(path).map(|page| page.body.clone())
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn store(&self, path: &str, generation: u64, body: String) -> bool {
        // The generation is checked while the shard lock is held, so a
        // concurrent `revalidate_path` either is seen here or sweeps the
        // entry afterwards.
        let entry = self.pages.entry(path.to_string());
        if self.generation() != generation {
            debug!(path = %path, "Skipping cache store after revalidation");
            return false;
        }

        let page = CachedPage {
            body,
            cached_utc: Utc::now(),
        };
        match entry {
            Entry::Occupied(mut occupied) => {
                occupied.insert(page);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(page);
            }
        }
        true
    }

    fn revalidate_path(&self, path: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.pages.retain(|cached_path, page| {
            let stale = is_under(cached_path, path);
            if stale {
                debug!(path = %cached_path, cached_utc = %page.cached_utc, "Dropping cached page");
            }
            !stale
        });
    }
}
