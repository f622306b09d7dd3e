/// Identity cache - bounded, time-expiring store for resolved identities
use crate::{
    error::BridgeResult,
    identity::{IdentityKind, IdentityRef},
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Cache behavior configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entry time-to-live; applies to entries inserted after it is set
    pub ttl: Duration,
    /// Maximum number of live entries
    pub max_size: usize,
}

impl CacheConfig {
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        Self { ttl, max_size }
    }
}

/// One cached identity keyed by DID
#[derive(Debug, Clone)]
struct CacheEntry {
    value: IdentityRef,
    /// Expiry computed at insertion; reconfiguration never rewrites it
    expires_at: Instant,
    /// Insertion sequence number, the deterministic eviction tie-break
    seq: u64,
}

#[derive(Debug)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    config: CacheConfig,
    next_seq: u64,
}

/// Bounded identity cache shared across all in-flight operations
///
/// Interior mutability via a standard mutex; the lock is never held across an
/// await point. Concurrent misses for the same identifier are not coalesced:
/// each caller fetches independently and the last insert wins, which is
/// harmless because every fetch returns an equivalent registered identity.
#[derive(Debug)]
pub struct IdentityCache {
    inner: Mutex<CacheInner>,
}

impl IdentityCache {
    /// Create a cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                config,
                next_seq: 0,
            }),
        }
    }

    /// Return the cached identity for `identifier`, or fetch and cache it
    ///
    /// A live (non-expired) entry short-circuits the fetch. On a miss the
    /// fetch runs without the lock held; its result is inserted keyed by the
    /// DID extracted from the result. Fetch failures propagate uncached.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        kind: IdentityKind,
        identifier: &str,
        fetch: F,
    ) -> BridgeResult<IdentityRef>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = BridgeResult<IdentityRef>>,
    {
        if let Some(hit) = self.get_live(identifier) {
            debug!(kind = %kind, did = %identifier, "identity cache hit");
            return Ok(hit);
        }

        debug!(kind = %kind, did = %identifier, "identity cache miss");
        let resolved = fetch().await?;
        self.insert(resolved.clone());
        Ok(resolved)
    }

    /// Look up a live entry, removing it lazily if it has expired
    fn get_live(&self, identifier: &str) -> Option<IdentityRef> {
        let mut inner = self.inner.lock().expect("identity cache lock poisoned");
        let expired = match inner.entries.get(identifier) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            inner.entries.remove(identifier);
        }
        None
    }

    /// Insert a resolved identity, evicting oldest-insertion-first past capacity
    fn insert(&self, value: IdentityRef) {
        let mut inner = self.inner.lock().expect("identity cache lock poisoned");
        let ttl = inner.config.ttl;
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let did = value.did.clone();
        // Duplicate insert from a racing miss: last write wins.
        inner.entries.insert(
            did,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
                seq,
            },
        );
        Self::evict_to_capacity(&mut inner);
    }

    fn evict_to_capacity(inner: &mut CacheInner) {
        while inner.entries.len() > inner.config.max_size {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.seq)
                .map(|(did, _)| did.clone());
            match oldest {
                Some(did) => {
                    warn!(did = %did, "evicting identity from cache (capacity)");
                    inner.entries.remove(&did);
                }
                None => break,
            }
        }
    }

    /// Replace TTL and capacity atomically
    ///
    /// Both values are validated before either is applied; a rejected request
    /// leaves the previous configuration untouched. The new TTL applies to
    /// subsequently inserted entries only; existing entries keep the expiry
    /// computed when they were inserted.
    pub fn reconfigure(&self, ttl: Duration, max_size: usize) -> BridgeResult<()> {
        if ttl < Duration::from_secs(1) {
            return Err(crate::error::BridgeError::InvalidArgument(
                "cache TTL must be at least 1 second".to_string(),
            ));
        }
        if max_size < 1 {
            return Err(crate::error::BridgeError::InvalidArgument(
                "cache size must be at least 1".to_string(),
            ));
        }

        let mut inner = self.inner.lock().expect("identity cache lock poisoned");
        inner.config = CacheConfig { ttl, max_size };
        Self::evict_to_capacity(&mut inner);
        Ok(())
    }

    /// Number of entries currently held (expired-but-unaccessed included)
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("identity cache lock poisoned")
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current configuration
    pub fn config(&self) -> CacheConfig {
        self.inner
            .lock()
            .expect("identity cache lock poisoned")
            .config
    }
}
