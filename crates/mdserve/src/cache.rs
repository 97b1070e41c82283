//! A bounded, thread-safe LRU cache mapping request messages to MD5 digests.
//!
//! Unlike a hash-indexed cache, lookups are a linear scan over the live slots.
//! This is a deliberate trade: the workload is dominated by the delay-simulated
//! miss path, so a scan over at most `capacity` entries costs nothing that
//! matters, and it avoids maintaining a secondary index under eviction.
//!
//! # Representation
//!
//! Live entries form a circular doubly-linked list ("recency ring") threaded
//! through a pre-allocated `Vec<CacheNode>` arena. Nodes reference each other
//! by `Option<usize>` index rather than by pointer or `Rc`, so the arena owns
//! every node outright and the ring carries no reference counting.
//!
//! # Thread safety
//!
//! All state (the arena, `head`, `used`) lives behind a single [`Mutex`]. Every
//! public method takes and releases the lock within the call; `get` copies the
//! digest into an owned `String` before returning so no borrow ever escapes the
//! critical section — this is also what makes [`LruCache::reset`] safe to call
//! while other threads hold references returned by an earlier `get`.

use std::sync::Mutex;

struct CacheNode {
    request: Option<String>,
    digest: Option<String>,
    prev: Option<usize>,
    next: Option<usize>,
}

impl CacheNode {
    fn empty() -> Self {
        Self {
            request: None,
            digest: None,
            prev: None,
            next: None,
        }
    }
}

struct Inner {
    pool: Vec<CacheNode>,
    head: Option<usize>,
    used: usize,
}

impl Inner {
    /// Unlinks `idx` from the ring and splices it in immediately before `head`,
    /// making it the new head (MRU position). `idx` must already be linked.
    fn move_to_front(&mut self, idx: usize) {
        let head = match self.head {
            Some(h) if h == idx => return,
            Some(h) => h,
            None => {
                self.head = Some(idx);
                return;
            }
        };

        let (prev, next) = (self.pool[idx].prev.unwrap(), self.pool[idx].next.unwrap());
        self.pool[prev].next = Some(next);
        self.pool[next].prev = Some(prev);

        let tail = self.pool[head].prev.unwrap();
        self.pool[idx].prev = Some(tail);
        self.pool[idx].next = Some(head);
        self.pool[tail].next = Some(idx);
        self.pool[head].prev = Some(idx);

        self.head = Some(idx);
    }

    /// Links a freshly-populated, previously-unlinked `idx` in at the head.
    fn link_new_head(&mut self, idx: usize) {
        match self.head {
            None => {
                self.pool[idx].prev = Some(idx);
                self.pool[idx].next = Some(idx);
            }
            Some(head) => {
                let tail = self.pool[head].prev.unwrap();
                self.pool[idx].prev = Some(tail);
                self.pool[idx].next = Some(head);
                self.pool[tail].next = Some(idx);
                self.pool[head].prev = Some(idx);
            }
        }
        self.head = Some(idx);
    }
}

/// A bounded LRU cache of `message -> digest`, safe to share across worker threads.
pub struct LruCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl LruCache {
    /// Creates a cache pre-allocated to hold exactly `capacity` entries.
    ///
    /// # Panics
    /// Panics if `capacity` is zero — callers must enforce `capacity > 0` at
    /// configuration time (see `ConfigError::ZeroCapacity`).
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "LruCache capacity must be > 0");
        let pool = (0..capacity).map(|_| CacheNode::empty()).collect();
        Self {
            inner: Mutex::new(Inner {
                pool,
                head: None,
                used: 0,
            }),
            capacity,
        }
    }

    /// Looks up `message`. On a hit, promotes the entry to most-recently-used
    /// and returns an owned copy of its digest; returns `None` on a miss.
    pub fn get(&self, message: &str) -> Option<String> {
        let mut inner = self.inner.lock().expect("LruCache mutex poisoned");
        let used = inner.used;
        let found = (0..used).find(|&i| inner.pool[i].request.as_deref() == Some(message));

        let idx = found?;
        inner.move_to_front(idx);
        inner.pool[idx].digest.clone()
    }

    /// Inserts `message -> digest`, evicting the least-recently-used entry if
    /// the cache is already at capacity.
    ///
    /// Does not check whether `message` is already present — callers must only
    /// call `put` following a `get` miss for the same key (see module docs on
    /// the duplicate-key race this implies under concurrent misses).
    pub fn put(&self, message: &str, digest: String) {
        let mut inner = self.inner.lock().expect("LruCache mutex poisoned");

        if inner.used < self.capacity {
            let idx = inner.used;
            inner.pool[idx].request = Some(message.to_owned());
            inner.pool[idx].digest = Some(digest);
            inner.link_new_head(idx);
            inner.used += 1;
        } else {
            let head = inner.head.expect("full cache must have a head");
            let lru = inner.pool[head].prev.expect("ring must be circular");
            inner.pool[lru].request = Some(message.to_owned());
            inner.pool[lru].digest = Some(digest);
            // `lru` already sits immediately before `head` in the ring, so
            // rotating `head` onto it makes it MRU without any relinking.
            inner.head = Some(lru);
        }
    }

    /// Drops every live entry, returning the cache to its freshly-constructed
    /// state while preserving `capacity`.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().expect("LruCache mutex poisoned");
        for slot in inner.pool.iter_mut() {
            slot.request = None;
            slot.digest = None;
            slot.prev = None;
            slot.next = None;
        }
        inner.head = None;
        inner.used = 0;
    }

    /// Returns every live entry in MRU→LRU order, for teardown diagnostics.
    pub fn dump(&self) -> Vec<(String, String)> {
        let inner = self.inner.lock().expect("LruCache mutex poisoned");
        let mut out = Vec::with_capacity(inner.used);
        let Some(head) = inner.head else {
            return out;
        };
        let mut idx = head;
        for _ in 0..inner.used {
            let node = &inner.pool[idx];
            out.push((
                node.request.clone().unwrap_or_default(),
                node.digest.clone().unwrap_or_default(),
            ));
            idx = node.next.expect("live node must be linked");
        }
        out
    }

    /// Returns the number of live entries currently cached.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("LruCache mutex poisoned").used
    }

    /// Returns `true` if the cache currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries this cache can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── get/put round-trip ────────────────────────────────────────────────────

    #[test]
    fn test_get_returns_none_on_miss() {
        let cache = LruCache::new(4);
        assert_eq!(cache.get("absent"), None);
    }

    #[test]
    fn test_put_then_get_returns_value() {
        let cache = LruCache::new(4);
        cache.put("hello", "5d41402abc4b2a76b9719d911017c592".to_string());
        assert_eq!(
            cache.get("hello"),
            Some("5d41402abc4b2a76b9719d911017c592".to_string())
        );
    }

    #[test]
    fn test_len_tracks_insertions() {
        let cache = LruCache::new(4);
        assert_eq!(cache.len(), 0);
        cache.put("a", "A".to_string());
        assert_eq!(cache.len(), 1);
        cache.put("b", "B".to_string());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_is_empty_on_fresh_cache() {
        let cache = LruCache::new(4);
        assert!(cache.is_empty());
        cache.put("x", "X".to_string());
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_capacity_returns_configured_value() {
        assert_eq!(LruCache::new(16).capacity(), 16);
    }

    // ── LRU eviction (§8 property tests) ──────────────────────────────────────

    #[test]
    fn test_cache_bound_never_exceeds_capacity() {
        let cache = LruCache::new(3);
        for i in 0..50 {
            cache.put(&format!("key{i}"), format!("digest{i}"));
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_lru_eviction_with_capacity_one() {
        let cache = LruCache::new(1);
        cache.put("a", "A".to_string());
        cache.put("b", "B".to_string());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), None, "a should have been evicted");
        assert_eq!(cache.get("b"), Some("B".to_string()));
    }

    #[test]
    fn test_lru_order_evicts_least_recently_used() {
        let cache = LruCache::new(3);
        cache.put("k1", "v1".to_string());
        cache.put("k2", "v2".to_string());
        cache.put("k3", "v3".to_string());
        cache.put("k4", "v4".to_string());

        assert_eq!(cache.get("k1"), None, "k1 is the LRU entry and must be evicted");
        assert!(cache.get("k2").is_some());
        assert!(cache.get("k3").is_some());
        assert!(cache.get("k4").is_some());
    }

    #[test]
    fn test_mru_on_hit_protects_from_next_eviction() {
        let cache = LruCache::new(2);
        cache.put("a", "A".to_string());
        cache.put("b", "B".to_string());
        // Touch "a" so "b" becomes the LRU entry.
        assert!(cache.get("a").is_some());
        cache.put("c", "C".to_string());

        assert_eq!(cache.get("b"), None, "b should be evicted, not a");
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_repeated_hits_keep_entry_alive_across_many_insertions() {
        let cache = LruCache::new(2);
        cache.put("keep", "K".to_string());
        cache.put("filler0", "F0".to_string());
        for i in 0..10 {
            assert!(cache.get("keep").is_some());
            cache.put(&format!("filler{}", i + 1), format!("F{}", i + 1));
        }
        assert!(cache.get("keep").is_some(), "repeatedly-touched entry must survive");
    }

    // ── Reset ────────────────────────────────────────────────────────────────

    #[test]
    fn test_reset_empties_cache() {
        let cache = LruCache::new(4);
        cache.put("a", "A".to_string());
        cache.put("b", "B".to_string());
        cache.reset();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_reset_then_put_works() {
        let cache = LruCache::new(2);
        cache.put("a", "A".to_string());
        cache.reset();
        cache.put("b", "B".to_string());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some("B".to_string()));
    }

    #[test]
    fn test_reset_on_empty_is_safe() {
        let cache = LruCache::new(4);
        cache.reset();
        assert_eq!(cache.len(), 0);
    }

    // ── Teardown dump ────────────────────────────────────────────────────────

    #[test]
    fn test_dump_is_mru_to_lru_order() {
        let cache = LruCache::new(3);
        cache.put("hello", "5d41402abc4b2a76b9719d911017c592".to_string());
        cache.put("world", "7d793037a0760186574b0282f2f435e7".to_string());

        let dump = cache.dump();
        assert_eq!(
            dump,
            vec![
                ("world".to_string(), "7d793037a0760186574b0282f2f435e7".to_string()),
                ("hello".to_string(), "5d41402abc4b2a76b9719d911017c592".to_string()),
            ]
        );
    }

    #[test]
    fn test_dump_on_empty_cache_is_empty() {
        assert!(LruCache::new(4).dump().is_empty());
    }

    #[test]
    fn test_dump_reflects_get_promotion() {
        let cache = LruCache::new(3);
        cache.put("a", "A".to_string());
        cache.put("b", "B".to_string());
        cache.put("c", "C".to_string());
        // Promote "a" to MRU.
        cache.get("a");

        let dump = cache.dump();
        assert_eq!(dump[0].0, "a");
        assert_eq!(dump.len(), 3);
    }

    // ── Overwrite (duplicate-key) behavior ───────────────────────────────────

    #[test]
    fn test_put_does_not_dedupe_existing_key() {
        let cache = LruCache::new(4);
        cache.put("dup", "first".to_string());
        cache.put("dup", "second".to_string());
        // Both slots are live; get() returns the first match in scan order.
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("dup"), Some("first".to_string()));
    }

    // ── Thread safety ────────────────────────────────────────────────────────

    #[test]
    fn test_concurrent_get_and_put_no_panic() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(LruCache::new(64));
        let handles: Vec<_> = (0_u32..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0_u32..100 {
                        let key = format!("t{t}-{i}");
                        if cache.get(&key).is_none() {
                            cache.put(&key, format!("digest-{t}-{i}"));
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread should not panic");
        }
        assert!(cache.len() <= cache.capacity());
    }
}
