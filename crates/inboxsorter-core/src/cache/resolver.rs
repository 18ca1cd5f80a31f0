//! Write-back address resolution cache.

use std::collections::HashMap;
use std::future::Future;

use tracing::{debug, error, info, warn};

use super::model::CacheEntry;
use super::repository::CacheStore;
use crate::error::ResolveError;

/// Number of new resolutions between automatic flushes.
pub const DEFAULT_CACHE_SAVE_INTERVAL: usize = 100;

/// Directory lookup used on a cache miss.
pub trait DirectoryResolver {
    /// Resolve an internal directory address to its canonical address.
    ///
    /// Returns `Ok(None)` when the directory has no canonical address.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    fn lookup_canonical_address(
        &self,
        internal_address: &str,
    ) -> impl Future<Output = Result<Option<String>, ResolveError>> + Send;
}

/// In-memory address map fronting a [`CacheStore`].
///
/// Misses are read through the [`DirectoryResolver`]. Successful lookups
/// are added to the map and counted; once `save_interval` of them are
/// pending the whole map is written back. Failed lookups are never cached.
pub struct AddressResolutionCache<S> {
    store: S,
    entries: HashMap<String, String>,
    pending_writes: usize,
    save_interval: usize,
}

impl<S: CacheStore> AddressResolutionCache<S> {
    /// Load the cache from `store`.
    ///
    /// A store that cannot be read yields an empty cache; the failure is
    /// logged and the run continues cold. A `save_interval` of zero is
    /// treated as one.
    pub async fn load(store: S, save_interval: usize) -> Self {
        let entries: HashMap<String, String> = match store.load_all().await {
            Ok(rows) => rows
                .into_iter()
                .map(|e| (e.internal_address.to_lowercase(), e.canonical_address))
                .collect(),
            Err(e) => {
                error!(error = %e, "Address cache unreadable, starting empty");
                HashMap::new()
            }
        };

        info!(entries = entries.len(), "Loaded address cache");

        Self {
            store,
            entries,
            pending_writes: 0,
            save_interval: save_interval.max(1),
        }
    }

    /// Resolve `internal_address` to its canonical address.
    ///
    /// Hits return immediately. A miss asks `resolver`; a successful answer
    /// is cached and may trigger a flush before returning.
    pub async fn resolve<R: DirectoryResolver>(
        &mut self,
        resolver: &R,
        internal_address: &str,
    ) -> Option<String> {
        let key = internal_address.to_lowercase();
        if let Some(canonical) = self.entries.get(&key) {
            return Some(canonical.clone());
        }

        let canonical = match resolver.lookup_canonical_address(internal_address).await {
            Ok(Some(address)) if !address.trim().is_empty() => address,
            Ok(_) => {
                debug!(address = %key, "Directory has no canonical address");
                return None;
            }
            Err(e) => {
                warn!(address = %key, error = %e, "Directory lookup failed");
                return None;
            }
        };

        self.entries.insert(key, canonical.clone());
        self.pending_writes += 1;

        if self.pending_writes >= self.save_interval {
            self.flush().await;
        }

        Some(canonical)
    }

    /// Write the whole map to the store, replacing its content.
    ///
    /// Returns `true` on success. On failure the error is logged, the
    /// in-memory map and pending counter are kept, and `false` is returned.
    pub async fn flush(&mut self) -> bool {
        let mut snapshot: Vec<CacheEntry> = self
            .entries
            .iter()
            .map(|(internal, canonical)| CacheEntry::new(internal, canonical))
            .collect();
        snapshot.sort_by(|a, b| a.internal_address.cmp(&b.internal_address));

        match self.store.replace_all(&snapshot).await {
            Ok(()) => {
                info!(
                    entries = snapshot.len(),
                    pending = self.pending_writes,
                    "Flushed address cache"
                );
                self.pending_writes = 0;
                true
            }
            Err(e) => {
                error!(
                    error = %e,
                    pending = self.pending_writes,
                    "Address cache flush failed, keeping in-memory entries"
                );
                false
            }
        }
    }

    /// Cached canonical address for `internal_address`, without a lookup.
    #[must_use]
    pub fn get(&self, internal_address: &str) -> Option<&str> {
        self.entries
            .get(&internal_address.to_lowercase())
            .map(String::as_str)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// New resolutions not yet flushed.
    #[must_use]
    pub const fn pending_writes(&self) -> usize {
        self.pending_writes
    }

    /// Flush threshold.
    #[must_use]
    pub const fn save_interval(&self) -> usize {
        self.save_interval
    }

    /// Iterate over `(internal, canonical)` pairs in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(internal, canonical)| (internal.as_str(), canonical.as_str()))
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}
