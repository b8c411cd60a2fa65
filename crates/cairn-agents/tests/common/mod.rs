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

//! Fixtures shared by the container tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cairn_agents::asset_container::{AssetContainer, ContainerServices};
use cairn_core::asset::{AssetHandle, AssetKind, ContentHash, LogicalPath};
use cairn_core::content::{AssetCache, CacheError, HashResolver, RequestStatus};
use cairn_core::ecs::EntityId;
use cairn_core::event::{Subscription, SubscriptionId};
use cairn_core::math::Vec3;
use cairn_core::physics::CollisionMasks;
use cairn_core::scene::{MeshData, SceneHost, SceneNode};
use cairn_data::cache::{ContentCache, InMemoryFetcher};
use cairn_data::config::CacheConfig;
use cairn_data::content::ContentMapping;

pub const MODEL_HASH: &str = "abc123";
pub const OTHER_HASH: &str = "def456";
pub const BROKEN_HASH: &str = "dead00";

pub fn quad() -> MeshData {
    MeshData::new(
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}

/// One visible mesh ("hull") and one hidden mesh ("ghost").
pub fn two_mesh_model() -> SceneNode {
    SceneNode::empty("model")
        .with_child(SceneNode::mesh("hull", quad(), true))
        .with_child(SceneNode::mesh("ghost", quad(), false))
}

pub fn other_model() -> SceneNode {
    SceneNode::empty("other").with_child(SceneNode::mesh("crate", quad(), true))
}

/// The layer of the collision body under mesh `name`, if it has one.
pub fn layer_of(subtree: &SceneNode, name: &str) -> Option<u32> {
    subtree
        .find(name)
        .and_then(SceneNode::collision_body_child)
        .map(|body| body.layer)
}

/// `model.glb` and `other.glb` have payloads; `broken.glb` resolves to a hash
/// the fetcher cannot serve; `empty.glb` resolves to an empty hash.
pub fn mapping() -> ContentMapping {
    let mut mapping = ContentMapping::new("https://cdn.example/contents/");
    mapping.insert("model.glb", ContentHash::from(MODEL_HASH));
    mapping.insert("other.glb", ContentHash::from(OTHER_HASH));
    mapping.insert("broken.glb", ContentHash::from(BROKEN_HASH));
    mapping.insert("empty.glb", ContentHash::default());
    mapping
}

pub fn fetcher() -> InMemoryFetcher {
    InMemoryFetcher::new()
        .with_payload(MODEL_HASH, two_mesh_model())
        .with_payload(OTHER_HASH, other_model())
}

pub fn cache_with(config: CacheConfig) -> Arc<ContentCache> {
    Arc::new(ContentCache::new(config, fetcher()))
}

pub fn cache() -> Arc<ContentCache> {
    cache_with(CacheConfig::default())
}

/// Wraps a [`ContentCache`] and counts the calls made through the trait.
pub struct CountingCache {
    pub inner: Arc<ContentCache>,
    requests: AtomicUsize,
    subscriptions: AtomicUsize,
}

impl CountingCache {
    pub fn new(inner: Arc<ContentCache>) -> Self {
        Self {
            inner,
            requests: AtomicUsize::new(0),
            subscriptions: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }
}

impl AssetCache for CountingCache {
    fn request(
        &self,
        path: &LogicalPath,
        kind: AssetKind,
        mapping: &dyn HashResolver,
    ) -> Result<RequestStatus, CacheError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.inner.request(path, kind, mapping)
    }

    fn get(&self, hash: &ContentHash) -> Option<AssetHandle<SceneNode>> {
        self.inner.get(hash)
    }

    fn subscribe(&self) -> Subscription<ContentHash> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        self.inner.subscribe()
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.unsubscribe(id);
    }
}

pub fn services(cache: Arc<dyn AssetCache>) -> ContainerServices {
    ContainerServices::new(Arc::new(mapping()), cache)
}

pub fn container(
    index: u32,
    path: &str,
    masks: CollisionMasks,
    cache: Arc<dyn AssetCache>,
) -> AssetContainer {
    AssetContainer::new(EntityId::new(index, 0), path, masks, services(cache))
}

/// Ticks `container`, pumping `cache` after each tick, until it reaches a terminal
/// state and has nothing left to do, or `max_ticks` runs out.
pub fn run_until_settled(
    container: &mut AssetContainer,
    cache: &ContentCache,
    host: &mut dyn SceneHost,
    max_ticks: usize,
) -> usize {
    for tick in 1..=max_ticks {
        container.tick(host);
        cache.pump();
        if container.state().is_terminal() && container.pending_tasks() == 0 {
            return tick;
        }
    }
    max_ticks
}
