use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::bridge::HubBridge;
use crate::error::{GlassFeedError, Result};
use crate::util;

/// Freshness window for cached listings and comment threads.
pub const DEFAULT_CACHE_TTL_MS: u64 = 60 * 60 * 1000;

/// Storage envelope: write timestamp plus the cached payload.
#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    ts: u64,
    data: T,
}

/// Best-effort time-bounded memo over the bridge's key-value storage.
///
/// Reads treat every failure mode the same way — missing entry, storage
/// error, parse failure, stale timestamp — and come back as a miss; an entry
/// exactly TTL old is already stale. Writes can fail; callers log the error
/// and carry on, since caching must never block the surrounding fetch flow.
#[derive(Debug, Clone, Copy)]
pub struct TtlCache {
    ttl_ms: u64,
}

impl TtlCache {
    pub fn new(ttl_ms: u64) -> Self {
        Self { ttl_ms }
    }

    pub fn get<T: DeserializeOwned>(&self, bridge: &mut dyn HubBridge, key: &str) -> Option<T> {
        self.get_at(bridge, key, util::now_ms())
    }

    /// Deterministic variant of [`get`](Self::get) with an explicit clock.
    pub fn get_at<T: DeserializeOwned>(
        &self,
        bridge: &mut dyn HubBridge,
        key: &str,
        now_ms: u64,
    ) -> Option<T> {
        let raw = bridge.get_local_storage(key).ok().flatten()?;
        let entry: CacheEntry<T> = serde_json::from_str(&raw).ok()?;
        if now_ms.saturating_sub(entry.ts) >= self.ttl_ms {
            return None;
        }
        Some(entry.data)
    }

    pub fn set<T: Serialize>(&self, bridge: &mut dyn HubBridge, key: &str, data: &T) -> Result<()> {
        self.set_at(bridge, key, data, util::now_ms())
    }

    /// Deterministic variant of [`set`](Self::set) with an explicit clock.
    pub fn set_at<T: Serialize>(
        &self,
        bridge: &mut dyn HubBridge,
        key: &str,
        data: &T,
        now_ms: u64,
    ) -> Result<()> {
        let entry = CacheEntry { ts: now_ms, data };
        let raw = serde_json::to_string(&entry).map_err(|e| GlassFeedError::Decode {
            message: format!("cache entry for {key}: {e}"),
        })?;
        bridge.set_local_storage(key, &raw)
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::PageSpec;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemBridge {
        storage: HashMap<String, String>,
        fail_reads: bool,
    }

    impl HubBridge for MemBridge {
        fn create_startup_page(&mut self, _spec: &PageSpec) -> Result<i32> {
            Ok(0)
        }

        fn rebuild_page(&mut self, _spec: &PageSpec) -> Result<()> {
            Ok(())
        }

        fn get_local_storage(&mut self, key: &str) -> Result<Option<String>> {
            if self.fail_reads {
                return Err(GlassFeedError::Bridge {
                    message: "storage offline".into(),
                });
            }
            Ok(self.storage.get(key).cloned())
        }

        fn set_local_storage(&mut self, key: &str, value: &str) -> Result<()> {
            self.storage.insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[test]
    fn fresh_entry_round_trips() {
        let mut bridge = MemBridge::default();
        let cache = TtlCache::new(1000);
        cache
            .set_at(&mut bridge, "k", &vec![1u32, 2, 3], 5_000)
            .unwrap();
        let hit: Option<Vec<u32>> = cache.get_at(&mut bridge, "k", 5_500);
        assert_eq!(hit, Some(vec![1, 2, 3]));
    }

    #[test]
    fn entry_exactly_ttl_old_is_a_miss() {
        let mut bridge = MemBridge::default();
        let cache = TtlCache::new(1000);
        cache.set_at(&mut bridge, "k", &"v", 5_000).unwrap();
        let at_boundary: Option<String> = cache.get_at(&mut bridge, "k", 6_000);
        assert_eq!(at_boundary, None);
        let just_inside: Option<String> = cache.get_at(&mut bridge, "k", 5_999);
        assert_eq!(just_inside, Some("v".to_string()));
    }

    #[test]
    fn missing_garbage_and_errors_all_read_as_miss() {
        let mut bridge = MemBridge::default();
        let cache = TtlCache::new(1000);

        let missing: Option<String> = cache.get_at(&mut bridge, "absent", 0);
        assert_eq!(missing, None);

        bridge
            .set_local_storage("broken", "not json at all")
            .unwrap();
        let garbage: Option<String> = cache.get_at(&mut bridge, "broken", 0);
        assert_eq!(garbage, None);

        cache.set_at(&mut bridge, "k", &"v", 0).unwrap();
        bridge.fail_reads = true;
        let errored: Option<String> = cache.get_at(&mut bridge, "k", 100);
        assert_eq!(errored, None);
    }
}
