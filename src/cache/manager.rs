//! CacheManager: namespaced TTL store with LRU/memory eviction and
//! in-flight coalescing
//!
//! Lock order is `inflight` before any namespace lock. Neither lock is ever
//! held across an `.await`.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::entry::CacheEntry;
use super::stats::{CacheStats, Counters, NamespaceStats};
use crate::config::{CacheConfig, CacheNamespaceConfig};
use crate::error::{CacheError, EngineError};

/// Outcome of a regeneration broadcast to every coalesced waiter.
type Outcome = Option<Result<Vec<u8>, CacheError>>;

type InflightKey = (String, String);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Namespace {
    config: CacheNamespaceConfig,
    state: Mutex<NamespaceState>,
}

#[derive(Default)]
struct NamespaceState {
    entries: HashMap<String, CacheEntry>,
    memory_bytes: usize,
    counters: Counters,
}

impl NamespaceState {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.memory_bytes = self.memory_bytes.saturating_sub(entry.size_bytes());
        Some(entry)
    }

    /// Evict least-recently-used entries until within `max_entries`.
    fn enforce_entry_budget(&mut self, max_entries: usize, keep: &str) {
        while self.entries.len() > max_entries {
            let victim = self
                .entries
                .values()
                .filter(|e| e.key != keep)
                .min_by_key(|e| e.last_access)
                .map(|e| e.key.clone());
            let Some(victim) = victim else { break };
            self.remove(&victim);
            self.counters.evictions += 1;
        }
    }

    /// Evict oldest-by-creation entries until within `max_memory_bytes`.
    fn enforce_memory_budget(&mut self, max_memory_bytes: usize, keep: &str) {
        while self.memory_bytes > max_memory_bytes {
            let victim = self
                .entries
                .values()
                .filter(|e| e.key != keep)
                .min_by_key(|e| e.created_at)
                .map(|e| e.key.clone());
            let Some(victim) = victim else { break };
            self.remove(&victim);
            self.counters.evictions += 1;
        }
    }
}

/// Removes the in-flight marker when the leader finishes or is cancelled,
/// so waiters never block on a regeneration nobody is running.
struct InflightGuard<'a> {
    inflight: &'a Mutex<HashMap<InflightKey, watch::Receiver<Outcome>>>,
    key: InflightKey,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        lock(self.inflight).remove(&self.key);
    }
}

enum Role {
    Leader(watch::Sender<Outcome>),
    Follower(watch::Receiver<Outcome>),
}

/// Owned, namespace-registered cache shared by handle (`Arc<CacheManager>`).
pub struct CacheManager {
    namespaces: BTreeMap<String, Namespace>,
    inflight: Mutex<HashMap<InflightKey, watch::Receiver<Outcome>>>,
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("namespaces", &self.namespaces.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl CacheManager {
    /// Empty manager; namespaces must be registered before use.
    pub fn new() -> Self {
        Self {
            namespaces: BTreeMap::new(),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Manager with every namespace from the configuration registered.
    pub fn from_config(config: &CacheConfig) -> Self {
        let mut manager = Self::new();
        for (name, ns_config) in config.namespaces() {
            manager.register(name, ns_config);
        }
        manager
    }

    /// Register (or re-register) a namespace with its own budget.
    ///
    /// A zero entry budget is raised to one: the entry just written is never
    /// evicted by its own insert.
    pub fn register(&mut self, name: &str, mut config: CacheNamespaceConfig) {
        if config.max_entries == 0 {
            warn!(namespace = name, "Cache namespace max_entries is 0, using 1");
            config.max_entries = 1;
        }
        info!(
            namespace = name,
            max_entries = config.max_entries,
            ttl_secs = config.ttl_secs,
            max_memory_bytes = config.max_memory_bytes,
            "Cache namespace registered"
        );
        self.namespaces.insert(
            name.to_string(),
            Namespace {
                config,
                state: Mutex::new(NamespaceState::default()),
            },
        );
    }

    pub fn namespace_names(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    fn namespace(&self, name: &str) -> Result<&Namespace, CacheError> {
        self.namespaces
            .get(name)
            .ok_or_else(|| CacheError::UnknownNamespace(name.to_string()))
    }

    // ========================================================================
    // Core operations
    // ========================================================================

    /// Look up a value. Expired or corrupted entries are deleted and
    /// reported as a miss.
    pub fn get<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Result<Option<T>, CacheError> {
        let Some(bytes) = self.get_bytes(namespace, key)? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                self.evict_inconsistent(namespace, key, &format!("decode failed: {e}"));
                Ok(None)
            }
        }
    }

    fn get_bytes(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let ns = self.namespace(namespace)?;
        let now = Instant::now();
        let mut state = lock(&ns.state);

        let Some(entry) = state.entries.get_mut(key) else {
            state.counters.misses += 1;
            debug!(namespace, key, "Cache miss");
            return Ok(None);
        };

        if entry.is_expired(now) {
            state.remove(key);
            state.counters.expirations += 1;
            state.counters.misses += 1;
            debug!(namespace, key, "Cache entry expired");
            return Ok(None);
        }

        if !entry.is_intact() {
            state.remove(key);
            state.counters.inconsistencies += 1;
            state.counters.misses += 1;
            let err = EngineError::CacheInconsistency {
                namespace: namespace.to_string(),
                key: key.to_string(),
                reason: "digest mismatch".into(),
            };
            warn!(error = %err, "Evicting corrupted cache entry");
            return Ok(None);
        }

        entry.last_access = now;
        let value = entry.value.clone();
        state.counters.hits += 1;
        debug!(namespace, key, "Cache hit");
        Ok(Some(value))
    }

    fn evict_inconsistent(&self, namespace: &str, key: &str, reason: &str) {
        if let Ok(ns) = self.namespace(namespace) {
            let mut state = lock(&ns.state);
            state.remove(key);
            state.counters.inconsistencies += 1;
            // The lookup was counted as a hit before decoding failed
            state.counters.hits = state.counters.hits.saturating_sub(1);
            state.counters.misses += 1;
        }
        let err = EngineError::CacheInconsistency {
            namespace: namespace.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        };
        warn!(error = %err, "Evicting inconsistent cache entry");
    }

    /// Store a value. `ttl` of `None` uses the namespace default.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        namespace: &str,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value).map_err(|e| CacheError::Serialize {
            namespace: namespace.to_string(),
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.set_bytes(namespace, key, bytes, ttl)
    }

    fn set_bytes(&self, namespace: &str, key: &str, bytes: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheError> {
        let ns = self.namespace(namespace)?;
        let size = bytes.len();
        if size > ns.config.max_memory_bytes {
            return Err(CacheError::EntryTooLarge {
                namespace: namespace.to_string(),
                key: key.to_string(),
                size,
                budget: ns.config.max_memory_bytes,
            });
        }

        let entry = CacheEntry::new(namespace, key, bytes, ttl.unwrap_or_else(|| ns.config.ttl()), Instant::now());
        let mut state = lock(&ns.state);
        state.remove(key);
        state.entries.insert(key.to_string(), entry);
        state.memory_bytes += size;

        state.enforce_entry_budget(ns.config.max_entries, key);
        state.enforce_memory_budget(ns.config.max_memory_bytes, key);
        debug!(namespace, key, size, entries = state.entries.len(), "Cache set");
        Ok(())
    }

    /// Remove one entry. Returns whether it existed.
    pub fn invalidate(&self, namespace: &str, key: &str) -> Result<bool, CacheError> {
        let ns = self.namespace(namespace)?;
        Ok(lock(&ns.state).remove(key).is_some())
    }

    /// Drop every expired entry in every namespace. Returns the count removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        for (name, ns) in &self.namespaces {
            let mut state = lock(&ns.state);
            let expired: Vec<String> = state
                .entries
                .values()
                .filter(|e| e.is_expired(now))
                .map(|e| e.key.clone())
                .collect();
            for key in &expired {
                state.remove(key);
            }
            state.counters.expirations += expired.len() as u64;
            if !expired.is_empty() {
                debug!(namespace = %name, removed = expired.len(), "Swept expired entries");
            }
            removed += expired.len();
        }
        removed
    }

    /// Invalidate one namespace, or every namespace when `None`.
    pub fn clear(&self, namespace: Option<&str>) -> Result<usize, CacheError> {
        let targets: Vec<&Namespace> = match namespace {
            Some(name) => vec![self.namespace(name)?],
            None => self.namespaces.values().collect(),
        };
        let mut removed = 0;
        for ns in targets {
            let mut state = lock(&ns.state);
            removed += state.entries.len();
            state.entries.clear();
            state.memory_bytes = 0;
        }
        info!(namespace = namespace.unwrap_or("*"), removed, "Cache cleared");
        Ok(removed)
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let namespaces = self
            .namespaces
            .iter()
            .map(|(name, ns)| {
                let state = lock(&ns.state);
                let ages = state.entries.values().map(|e| e.age(now).as_secs());
                let (oldest, newest) = ages.fold((None, None), |(max, min): (Option<u64>, Option<u64>), age| {
                    (Some(max.map_or(age, |m| m.max(age))), Some(min.map_or(age, |m| m.min(age))))
                });
                let stats = NamespaceStats {
                    entries: state.entries.len(),
                    hits: state.counters.hits,
                    misses: state.counters.misses,
                    evictions: state.counters.evictions,
                    expirations: state.counters.expirations,
                    inconsistencies: state.counters.inconsistencies,
                    memory_bytes: state.memory_bytes,
                    max_entries: ns.config.max_entries,
                    max_memory_bytes: ns.config.max_memory_bytes,
                    ttl_secs: ns.config.ttl_secs,
                    oldest_entry_age_secs: oldest,
                    newest_entry_age_secs: newest,
                };
                (name.clone(), stats)
            })
            .collect();
        CacheStats {
            namespaces,
            inflight: lock(&self.inflight).len(),
        }
    }

    // ========================================================================
    // Coalesced regeneration
    // ========================================================================

    /// Return the cached value, or run `regenerate` once and cache its result.
    ///
    /// Concurrent misses on the same (namespace, key) share a single call to
    /// `regenerate`: one caller leads, the rest wait for its outcome. If the
    /// leader is cancelled the waiters retry and one of them takes over.
    pub async fn get_or_insert_with<T, F, Fut>(&self, namespace: &str, key: &str, regenerate: F) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        loop {
            if let Some(value) = self.get(namespace, key)? {
                return Ok(value);
            }

            let inflight_key = (namespace.to_string(), key.to_string());
            let role = {
                let mut inflight = lock(&self.inflight);
                if let Some(rx) = inflight.get(&inflight_key) {
                    Role::Follower(rx.clone())
                } else if let Some(value) = self.get(namespace, key)? {
                    // A leader finished between the first lookup and taking the lock
                    return Ok(value);
                } else {
                    let (tx, rx) = watch::channel(None);
                    inflight.insert(inflight_key.clone(), rx);
                    Role::Leader(tx)
                }
            };

            match role {
                Role::Follower(mut rx) => {
                    debug!(namespace, key, "Waiting on in-flight regeneration");
                    let outcome: Outcome = match rx.wait_for(Option::is_some).await {
                        Ok(outcome) => outcome.clone(),
                        // Leader dropped without publishing
                        Err(_) => continue,
                    };
                    match outcome {
                        Some(Ok(bytes)) => return self.decode(namespace, key, &bytes),
                        Some(Err(e)) => return Err(e),
                        None => continue,
                    }
                }
                Role::Leader(tx) => {
                    let _guard = InflightGuard {
                        inflight: &self.inflight,
                        key: inflight_key,
                    };
                    debug!(namespace, key, "Regenerating cache entry");

                    let result = match regenerate().await {
                        Ok(value) => serde_json::to_vec(&value)
                            .map(|bytes| (value, bytes))
                            .map_err(|e| CacheError::Serialize {
                                namespace: namespace.to_string(),
                                key: key.to_string(),
                                reason: e.to_string(),
                            }),
                        Err(e) => Err(CacheError::Regeneration {
                            namespace: namespace.to_string(),
                            key: key.to_string(),
                            reason: format!("{e:#}"),
                        }),
                    };

                    return match result {
                        Ok((value, bytes)) => {
                            if let Err(e) = self.set_bytes(namespace, key, bytes.clone(), None) {
                                warn!(error = %e, "Regenerated value not cached");
                            }
                            tx.send_replace(Some(Ok(bytes)));
                            Ok(value)
                        }
                        Err(e) => {
                            tx.send_replace(Some(Err(e.clone())));
                            Err(e)
                        }
                    };
                }
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, namespace: &str, key: &str, bytes: &[u8]) -> Result<T, CacheError> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::Serialize {
            namespace: namespace.to_string(),
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}
