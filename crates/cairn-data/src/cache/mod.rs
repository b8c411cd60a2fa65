// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The shared content cache.
//!
//! [`ContentCache`] is the single place that fetches payloads. Any number of
//! containers may request the same hash; the cache fetches it once, keeps the
//! decoded subtree behind a shared handle and broadcasts the hash to every
//! subscriber when the fetch completes, whether it succeeded or not.

mod fetcher;
mod queue;

pub use fetcher::{FetchError, FetchRequest, InMemoryFetcher, PayloadFetcher};

use std::sync::{Mutex, MutexGuard};

use ahash::{AHashMap, AHashSet};
use cairn_core::asset::{AssetHandle, AssetKind, ContentHash, LogicalPath};
use cairn_core::content::{AssetCache, CacheError, HashResolver, RequestStatus};
use cairn_core::event::{BroadcastHub, Subscription, SubscriptionId};
use cairn_core::scene::SceneNode;

use crate::assets::Assets;
use crate::config::CacheConfig;
use queue::FetchQueue;

/// Counters describing what the cache has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Accepted requests.
    pub requests: u64,
    /// Requests that joined a fetch already queued or running.
    pub deduplicated: u64,
    /// Fetches that produced a payload.
    pub fetched: u64,
    /// Fetches that failed.
    pub failed: u64,
}

struct CacheState {
    assets: Assets<SceneNode>,
    failures: AHashMap<ContentHash, FetchError>,
    in_flight: AHashSet<ContentHash>,
    queue: FetchQueue,
    stats: CacheStats,
}

/// Deduplicating, prioritised content cache with a completion broadcast.
///
/// Fetches only run inside [`ContentCache::pump`], which the owner calls once per
/// tick. A pump performs at most [`CacheConfig::max_fetches_per_pump`] fetches.
pub struct ContentCache {
    config: CacheConfig,
    fetcher: Box<dyn PayloadFetcher>,
    state: Mutex<CacheState>,
    completions: BroadcastHub<ContentHash>,
}

impl ContentCache {
    /// Creates a cache that fetches through `fetcher`.
    pub fn new(config: CacheConfig, fetcher: impl PayloadFetcher + 'static) -> Self {
        Self {
            config,
            fetcher: Box::new(fetcher),
            state: Mutex::new(CacheState {
                assets: Assets::new(),
                failures: AHashMap::new(),
                in_flight: AHashSet::new(),
                queue: FetchQueue::default(),
                stats: CacheStats::default(),
            }),
            completions: BroadcastHub::new(),
        }
    }

    /// Requests `path` with an explicit fetch priority (higher runs first).
    pub fn request_with_priority(
        &self,
        path: &LogicalPath,
        kind: AssetKind,
        mapping: &dyn HashResolver,
        priority: u32,
    ) -> Result<RequestStatus, CacheError> {
        let hash = mapping
            .resolve(path)
            .ok_or_else(|| CacheError::UnknownPath(path.clone()))?;
        if hash.is_empty() {
            return Err(CacheError::EmptyHash(path.clone()));
        }

        let mut state = self.lock();
        state.stats.requests += 1;

        if state.assets.contains(&hash) {
            log::trace!("Cache hit for '{path}' ({hash}).");
            return Ok(RequestStatus::Ready);
        }

        if state.in_flight.contains(&hash) {
            state.stats.deduplicated += 1;
            log::trace!("Joining in-flight fetch of {hash} for '{path}'.");
            return Ok(RequestStatus::Pending);
        }

        // A previous failure is retried by a fresh request.
        state.failures.remove(&hash);
        state.in_flight.insert(hash.clone());
        let url = mapping.url_for(&hash);
        log::debug!("Queueing fetch of {hash} for '{path}' (priority {priority}).");
        state.queue.push(FetchRequest { hash, url, kind }, priority);
        Ok(RequestStatus::Pending)
    }

    /// Runs up to `max_fetches_per_pump` queued fetches and broadcasts their hashes.
    ///
    /// Returns the number of fetches completed.
    pub fn pump(&self) -> usize {
        let mut completed = 0;
        while completed < self.config.max_fetches_per_pump {
            let Some(request) = self.lock().queue.pop() else {
                break;
            };

            let result = self.fetcher.fetch(&request);

            {
                let mut state = self.lock();
                state.in_flight.remove(&request.hash);
                match result {
                    Ok(payload) => {
                        state.stats.fetched += 1;
                        log::debug!("Fetched {}.", request.hash);
                        state
                            .assets
                            .insert(request.hash.clone(), AssetHandle::new(payload));
                    }
                    Err(err) => {
                        state.stats.failed += 1;
                        log::warn!("Fetch of {} failed: {err}", request.hash);
                        state.failures.insert(request.hash.clone(), err);
                    }
                }
            }

            let receivers = self.completions.publish(request.hash.clone());
            log::trace!("Broadcast {} to {receivers} subscriber(s).", request.hash);
            completed += 1;
        }
        completed
    }

    /// Runs [`ContentCache::pump`] until the queue is empty.
    pub fn pump_all(&self) -> usize {
        let mut total = 0;
        loop {
            let completed = self.pump();
            total += completed;
            if completed == 0 {
                return total;
            }
        }
    }

    /// The error of the last failed fetch of `hash`, if it failed.
    pub fn failure(&self, hash: &ContentHash) -> Option<FetchError> {
        self.lock().failures.get(hash).cloned()
    }

    /// Removes a stored payload. Containers that already cloned it are unaffected.
    pub fn evict(&self, hash: &ContentHash) -> bool {
        self.lock().assets.remove(hash).is_some()
    }

    /// Returns `true` if `hash` is queued or being fetched.
    pub fn is_in_flight(&self, hash: &ContentHash) -> bool {
        self.lock().in_flight.contains(hash)
    }

    /// Number of queued fetches.
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of stored payloads.
    pub fn stored(&self) -> usize {
        self.lock().assets.len()
    }

    /// Number of live completion subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.completions.subscriber_count()
    }

    /// A snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// The configuration the cache runs with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AssetCache for ContentCache {
    fn request(
        &self,
        path: &LogicalPath,
        kind: AssetKind,
        mapping: &dyn HashResolver,
    ) -> Result<RequestStatus, CacheError> {
        self.request_with_priority(path, kind, mapping, self.config.default_priority)
    }

    fn get(&self, hash: &ContentHash) -> Option<AssetHandle<SceneNode>> {
        self.lock().assets.get(hash).cloned()
    }

    fn subscribe(&self) -> Subscription<ContentHash> {
        self.completions.subscribe()
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.completions.unsubscribe(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentMapping;

    fn mapping() -> ContentMapping {
        let mut mapping = ContentMapping::new("https://cdn/");
        mapping.insert("model.glb", "abc123".into());
        mapping.insert("alias.glb", "abc123".into());
        mapping.insert("broken.glb", "dead00".into());
        mapping.insert("blank.glb", ContentHash::default());
        mapping
    }

    fn cache(max_fetches_per_pump: usize) -> ContentCache {
        let fetcher =
            InMemoryFetcher::new().with_payload("abc123", SceneNode::empty("model_root"));
        ContentCache::new(
            CacheConfig {
                max_fetches_per_pump,
                ..Default::default()
            },
            fetcher,
        )
    }

    #[test]
    fn first_request_is_pending_then_ready() {
        let cache = cache(4);
        let mapping = mapping();
        let path = LogicalPath::new("model.glb");

        assert_eq!(
            cache.request(&path, AssetKind::Gltf, &mapping),
            Ok(RequestStatus::Pending)
        );
        assert!(cache.is_in_flight(&"abc123".into()));
        assert!(cache.get(&"abc123".into()).is_none());

        assert_eq!(cache.pump(), 1);
        assert!(!cache.is_in_flight(&"abc123".into()));
        assert_eq!(
            cache.request(&path, AssetKind::Gltf, &mapping),
            Ok(RequestStatus::Ready)
        );
        assert_eq!(
            cache.get(&"abc123".into()).map(|root| root.name.clone()),
            Some("model_root".to_string())
        );
    }

    #[test]
    fn concurrent_requests_share_one_fetch() {
        let cache = cache(4);
        let mapping = mapping();
        let sub = cache.subscribe();

        for path in ["model.glb", "MODEL.GLB", "alias.glb"] {
            assert_eq!(
                cache.request(&path.into(), AssetKind::Gltf, &mapping),
                Ok(RequestStatus::Pending)
            );
        }
        assert_eq!(cache.queued(), 1);
        assert_eq!(cache.pump_all(), 1);

        let stats = cache.stats();
        assert_eq!(stats.requests, 3);
        assert_eq!(stats.deduplicated, 2);
        assert_eq!(stats.fetched, 1);
        assert_eq!(sub.drain(), vec![ContentHash::from("abc123")]);
    }

    #[test]
    fn failures_are_broadcast_and_retryable() {
        let cache = cache(4);
        let mapping = mapping();
        let sub = cache.subscribe();
        let path = LogicalPath::new("broken.glb");

        cache
            .request(&path, AssetKind::Gltf, &mapping)
            .expect("known path");
        cache.pump();

        assert_eq!(sub.drain(), vec![ContentHash::from("dead00")]);
        assert!(cache.get(&"dead00".into()).is_none());
        assert_eq!(
            cache.failure(&"dead00".into()),
            Some(FetchError::NotAvailable("dead00".into()))
        );
        assert_eq!(cache.stats().failed, 1);

        assert_eq!(
            cache.request(&path, AssetKind::Gltf, &mapping),
            Ok(RequestStatus::Pending)
        );
        assert!(cache.failure(&"dead00".into()).is_none());
    }

    #[test]
    fn unresolvable_requests_are_rejected() {
        let cache = cache(4);
        let mapping = mapping();
        assert_eq!(
            cache.request(&"ghost.glb".into(), AssetKind::Gltf, &mapping),
            Err(CacheError::UnknownPath("ghost.glb".into()))
        );
        assert_eq!(
            cache.request(&"blank.glb".into(), AssetKind::Gltf, &mapping),
            Err(CacheError::EmptyHash("blank.glb".into()))
        );
        assert_eq!(cache.stats().requests, 0);
    }

    #[test]
    fn pump_respects_budget_and_priority() {
        let fetcher = InMemoryFetcher::new()
            .with_payload("aaa", SceneNode::empty("a"))
            .with_payload("bbb", SceneNode::empty("b"))
            .with_payload("ccc", SceneNode::empty("c"));
        let cache = ContentCache::new(
            CacheConfig {
                max_fetches_per_pump: 2,
                default_priority: 1,
            },
            fetcher,
        );
        let mut mapping = ContentMapping::new("");
        mapping.insert("a.glb", "aaa".into());
        mapping.insert("b.glb", "bbb".into());
        mapping.insert("c.glb", "ccc".into());

        let sub = cache.subscribe();
        cache
            .request_with_priority(&"a.glb".into(), AssetKind::Gltf, &mapping, 0)
            .expect("known");
        cache
            .request(&"b.glb".into(), AssetKind::Gltf, &mapping)
            .expect("known");
        cache
            .request_with_priority(&"c.glb".into(), AssetKind::Gltf, &mapping, 9)
            .expect("known");

        assert_eq!(cache.pump(), 2);
        assert_eq!(
            sub.drain(),
            vec![ContentHash::from("ccc"), ContentHash::from("bbb")]
        );
        assert_eq!(cache.queued(), 1);
        assert_eq!(cache.pump(), 1);
        assert_eq!(sub.drain(), vec![ContentHash::from("aaa")]);
    }

    #[test]
    fn evicted_payload_is_fetched_again() {
        let cache = cache(4);
        let mapping = mapping();
        let path = LogicalPath::new("model.glb");
        cache
            .request(&path, AssetKind::Gltf, &mapping)
            .expect("known");
        cache.pump();
        let held = cache.get(&"abc123".into()).expect("stored");

        assert!(cache.evict(&"abc123".into()));
        assert_eq!(cache.stored(), 0);
        assert_eq!(held.name, "model_root");
        assert_eq!(
            cache.request(&path, AssetKind::Gltf, &mapping),
            Ok(RequestStatus::Pending)
        );
    }

    #[test]
    fn unsubscribe_releases_the_listener() {
        let cache = cache(4);
        let sub = cache.subscribe();
        assert_eq!(cache.subscriber_count(), 1);
        cache.unsubscribe(sub.id());
        assert_eq!(cache.subscriber_count(), 0);
    }
}
