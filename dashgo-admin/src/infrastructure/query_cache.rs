//! Client-side query cache with stale tracking and key invalidation
//!
//! Entries are addressed by a [`QueryKey`]: a root name such as `"users"`
//! plus positional parameters (page, page size). Invalidating a root marks
//! every entry under it stale; stale data stays readable so a view can keep
//! showing it while a refetch is in flight.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::RwLock;

/// Cache key: root name plus parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    root: Cow<'static, str>,
    params: Vec<String>,
}

impl QueryKey {
    pub const USERS: &'static str = "users";

    pub fn new(root: impl Into<Cow<'static, str>>) -> Self {
        Self {
            root: root.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: impl ToString) -> Self {
        self.params.push(param.to_string());
        self
    }

    /// Key for one page of the users listing
    pub fn users_page(page: u32, per_page: u32) -> Self {
        Self::new(Self::USERS).with_param(page).with_param(per_page)
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.root, self.params.join(","))
    }
}

/// Key-based invalidation, the only cache operation mutations need.
pub trait CacheInvalidator: Send + Sync {
    /// Mark every entry under `root` stale, returning how many were touched.
    fn invalidate(&self, root: &str) -> usize;
}

#[derive(Debug, Clone)]
struct CachedEntry<V> {
    data: V,
    cached_at: Instant,
    /// Root generation the data was fetched under
    generation: u64,
    invalidated: bool,
}

/// A cached value together with its freshness at read time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedQuery<V> {
    pub data: V,
    pub is_stale: bool,
}

/// Query results keyed by [`QueryKey`], plus an invalidation counter per
/// root so results fetched before an invalidation can be told apart from
/// those fetched after it.
#[derive(Debug)]
pub struct QueryCache<V> {
    entries: Arc<RwLock<HashMap<QueryKey, CachedEntry<V>>>>,
    generations: Arc<RwLock<HashMap<String, u64>>>,
    stale_time: Duration,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            generations: Arc::clone(&self.generations),
            stale_time: self.stale_time,
        }
    }
}

impl<V: Clone> QueryCache<V> {
    pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5);

    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            generations: Arc::new(RwLock::new(HashMap::new())),
            stale_time,
        }
    }

    /// Number of invalidations seen for `root`; capture it before fetching
    pub fn generation(&self, root: &str) -> u64 {
        self.generations.read().get(root).copied().unwrap_or(0)
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    pub fn get(&self, key: &QueryKey) -> Option<CachedQuery<V>> {
        let entries = self.entries.read();
        entries.get(key).map(|entry| CachedQuery {
            data: entry.data.clone(),
            is_stale: entry.invalidated
                || entry.cached_at.elapsed() >= self.stale_time,
        })
    }

    /// Store fresh data for `key`, clearing any invalidation mark
    pub fn insert(&self, key: QueryKey, data: V) {
        let generation = self.generation(key.root());
        self.insert_fetched(key, data, generation);
    }

    /// Store data fetched under `generation`.
    ///
    /// Data from before the latest invalidation is stored stale. Returns
    /// `false`, storing nothing, when the entry already holds data from a
    /// newer generation.
    pub fn insert_fetched(&self, key: QueryKey, data: V, generation: u64) -> bool {
        let current = self.generation(key.root());
        let mut entries = self.entries.write();
        if entries
            .get(&key)
            .is_some_and(|existing| existing.generation > generation)
        {
            debug!("[QueryCache] dropping outdated result for {}", key);
            return false;
        }

        let invalidated = generation < current;
        debug!("[QueryCache] storing {} (stale: {})", key, invalidated);
        entries.insert(
            key,
            CachedEntry {
                data,
                cached_at: Instant::now(),
                generation,
                invalidated,
            },
        );
        true
    }

    pub fn remove(&self, key: &QueryKey) -> Option<V> {
        self.entries.write().remove(key).map(|entry| entry.data)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl<V: Clone + Send + Sync> CacheInvalidator for QueryCache<V> {
    fn invalidate(&self, root: &str) -> usize {
        *self.generations.write().entry(root.to_string()).or_insert(0) += 1;

        let mut entries = self.entries.write();
        let mut touched = 0;
        for (key, entry) in entries.iter_mut() {
            if key.root() == root {
                entry.invalidated = true;
                touched += 1;
            }
        }
        debug!("[QueryCache] invalidated {} entries under '{}'", touched, root);
        touched
    }
}
