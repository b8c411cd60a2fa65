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

//! The per-entity load state machine.

use std::sync::Arc;

use cairn_core::asset::{AssetKind, ContentHash, LoadState, LogicalPath};
use cairn_core::content::{AssetCache, HashResolver, RequestStatus};
use cairn_core::ecs::EntityId;
use cairn_core::event::Subscription;
use cairn_core::lane::Lane;
use cairn_core::physics::CollisionMasks;
use cairn_core::scene::{SceneHost, SceneNode};
use cairn_core::scheduler::DeferredQueue;
use cairn_lanes::collision_lane::{CollisionLane, MaskAssignmentLane};

/// The collaborators a container works with, injected at construction.
#[derive(Clone)]
pub struct ContainerServices {
    /// Maps logical paths to content hashes.
    pub resolver: Arc<dyn HashResolver>,
    /// The shared content cache.
    pub cache: Arc<dyn AssetCache>,
    /// The strategy used to configure colliders on loaded subtrees.
    pub lane: Arc<dyn CollisionLane>,
}

impl ContainerServices {
    /// Bundles a resolver and a cache with the default [`MaskAssignmentLane`].
    pub fn new(resolver: Arc<dyn HashResolver>, cache: Arc<dyn AssetCache>) -> Self {
        Self {
            resolver,
            cache,
            lane: Arc::new(MaskAssignmentLane::new()),
        }
    }

    /// Replaces the collision strategy.
    pub fn with_lane(mut self, lane: Arc<dyn CollisionLane>) -> Self {
        self.lane = lane;
        self
    }
}

/// What [`AssetContainer::change_asset`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Path and masks were already current.
    Unchanged,
    /// Only the masks differed; the existing subtree was reconfigured in place.
    MasksUpdated,
    /// The path differed; the old subtree was discarded and a reload is queued.
    Reloading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ContainerTask {
    BeginLoad,
    AssetReady(ContentHash),
    Attach,
}

/// Loads one content-addressed asset under an owner entity.
///
/// The container resolves its logical path, requests the payload from the shared
/// cache, waits for the completion broadcast and finally attaches a deep clone of
/// the payload, with colliders configured, to the scene. All of this happens over
/// several calls to [`tick`](Self::tick); no method blocks.
///
/// Invariants kept between ticks:
/// - an owned subtree exists only in [`LoadState::Finished`];
/// - at most one completion subscription is live;
/// - `content_hash` is meaningful only in `Loading`, `Finished` and
///   `FinishedWithError`.
pub struct AssetContainer {
    owner: EntityId,
    logical_path: LogicalPath,
    content_hash: ContentHash,
    masks: CollisionMasks,
    kind: AssetKind,
    state: LoadState,
    owned_subtree: Option<SceneNode>,
    attached: bool,
    subscription: Option<Subscription<ContentHash>>,
    tasks: DeferredQueue<ContainerTask>,
    transitions: usize,
    services: ContainerServices,
}

impl AssetContainer {
    /// Creates a container for `path` and queues its first load for the next tick.
    pub fn new(
        owner: EntityId,
        path: impl Into<LogicalPath>,
        masks: CollisionMasks,
        services: ContainerServices,
    ) -> Self {
        let mut tasks = DeferredQueue::new();
        tasks.defer(ContainerTask::BeginLoad);

        Self {
            owner,
            logical_path: path.into(),
            content_hash: ContentHash::default(),
            masks,
            kind: AssetKind::Gltf,
            state: LoadState::Unknown,
            owned_subtree: None,
            attached: false,
            subscription: None,
            tasks,
            transitions: 0,
            services,
        }
    }

    /// Resolves the path and starts the fetch.
    ///
    /// Normally run from the task queued by [`new`](Self::new) or by a path change;
    /// calling it directly restarts the load cycle immediately.
    pub fn begin_load(&mut self) {
        self.release_subscription();

        let Some(hash) = self.services.resolver.resolve(&self.logical_path) else {
            log::warn!(
                "Entity {}: no content hash for '{}'.",
                self.owner,
                self.logical_path
            );
            self.content_hash = ContentHash::default();
            self.set_state(LoadState::NotFound);
            return;
        };

        self.content_hash = hash;
        self.set_state(LoadState::Loading);

        // Listen before asking so a completion published in between is not lost.
        let subscription = self.services.cache.subscribe();
        let status = self.services.cache.request(
            &self.logical_path,
            self.kind,
            self.services.resolver.as_ref(),
        );

        match status {
            Ok(RequestStatus::Pending) => {
                log::trace!(
                    "Entity {}: waiting for {} on {}.",
                    self.owner,
                    self.content_hash,
                    subscription.id()
                );
                self.subscription = Some(subscription);
            }
            Ok(RequestStatus::Ready) => {
                self.services.cache.unsubscribe(subscription.id());
                self.tasks
                    .defer(ContainerTask::AssetReady(self.content_hash.clone()));
            }
            Err(err) => {
                self.services.cache.unsubscribe(subscription.id());
                log::error!("Entity {}: cache rejected the request: {err}", self.owner);
                self.set_state(LoadState::FinishedWithError);
            }
        }
    }

    /// Handles a completion for `hash`.
    ///
    /// Completions for any other hash than the current one are ignored, as are
    /// repeated completions once the cycle has left `Loading`.
    pub fn on_asset_ready(&mut self, hash: &ContentHash) {
        if *hash != self.content_hash {
            log::trace!(
                "Entity {}: ignoring completion of {hash} (waiting for {}).",
                self.owner,
                self.content_hash
            );
            return;
        }

        self.release_subscription();

        if self.state != LoadState::Loading {
            return;
        }

        let Some(payload) = self.services.cache.get(hash) else {
            log::warn!(
                "Entity {}: fetch of {hash} for '{}' produced no payload.",
                self.owner,
                self.logical_path
            );
            self.set_state(LoadState::FinishedWithError);
            return;
        };

        let mut subtree = payload.to_owned_asset();
        let report = self.services.lane.assign_masks(&mut subtree, self.masks);
        log::debug!(
            "Entity {}: '{}' configured by {} ({report:?}).",
            self.owner,
            self.logical_path,
            self.services.lane.strategy_name()
        );

        self.owned_subtree = Some(subtree);
        self.set_state(LoadState::Finished);
        self.tasks.defer(ContainerTask::Attach);
    }

    /// Advances the container by one frame.
    ///
    /// Runs the tasks queued before this call and feeds every completion received
    /// since the last tick to [`on_asset_ready`](Self::on_asset_ready). Anything
    /// either of them queues waits for the next tick.
    pub fn tick(&mut self, host: &mut dyn SceneHost) {
        let due = self.tasks.take_due();

        let completions = self
            .subscription
            .as_ref()
            .map(Subscription::drain)
            .unwrap_or_default();
        for hash in completions {
            if self.subscription.is_none() {
                break;
            }
            self.on_asset_ready(&hash);
        }

        for task in due {
            match task {
                ContainerTask::BeginLoad => self.begin_load(),
                ContainerTask::AssetReady(hash) => self.on_asset_ready(&hash),
                ContainerTask::Attach => self.attach(host),
            }
        }
    }

    /// Points the container at another asset or other collision masks.
    ///
    /// A different path discards the current subtree and reloads from scratch on
    /// the next tick. The same path with different masks reconfigures the existing
    /// subtree in place and, once attached, hands the new collider configuration to
    /// `host`. The same path never re-attempts resolution, even after `NotFound`.
    pub fn change_asset(
        &mut self,
        path: impl Into<LogicalPath>,
        visible_mask: u32,
        invisible_mask: u32,
        host: &mut dyn SceneHost,
    ) -> ChangeOutcome {
        let path = path.into();
        let masks = CollisionMasks::new(visible_mask, invisible_mask);

        if path != self.logical_path {
            log::info!(
                "Entity {}: switching '{}' -> '{path}'.",
                self.owner,
                self.logical_path
            );
            self.release_subtree(host);
            self.release_subscription();
            self.tasks.clear();
            self.logical_path = path;
            self.masks = masks;
            self.content_hash = ContentHash::default();
            self.set_state(LoadState::Unknown);
            self.tasks.defer(ContainerTask::BeginLoad);
            return ChangeOutcome::Reloading;
        }

        if masks == self.masks {
            return ChangeOutcome::Unchanged;
        }

        self.masks = masks;
        if let Some(subtree) = self.owned_subtree.as_mut() {
            let report = self.services.lane.assign_masks(subtree, masks);
            log::debug!("Entity {}: masks reapplied ({report:?}).", self.owner);
            if self.attached {
                host.update_colliders(self.owner, subtree);
            }
        }
        ChangeOutcome::MasksUpdated
    }

    /// Releases everything the container holds: the subscription, the subtree
    /// (handed to `host` for deferred destruction) and pending tasks.
    pub fn teardown(&mut self, host: &mut dyn SceneHost) {
        self.release_subscription();
        self.release_subtree(host);
        self.tasks.clear();
        log::debug!("Entity {}: container torn down.", self.owner);
    }

    /// The entity the subtree is attached under.
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// The current logical path.
    pub fn logical_path(&self) -> &LogicalPath {
        &self.logical_path
    }

    /// The hash resolved for the current path; empty before resolution and after
    /// `NotFound`.
    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    /// The collision masks applied to loaded subtrees.
    pub fn masks(&self) -> CollisionMasks {
        self.masks
    }

    /// The current load state.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The owned subtree, present only once `Finished`.
    pub fn subtree(&self) -> Option<&SceneNode> {
        self.owned_subtree.as_ref()
    }

    /// Returns `true` once the subtree has been attached to the scene.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Returns `true` while waiting on the completion broadcast.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Number of tasks waiting for the next tick.
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// How many state transitions the container has gone through.
    pub fn state_transitions(&self) -> usize {
        self.transitions
    }

    fn attach(&mut self, host: &mut dyn SceneHost) {
        if self.state != LoadState::Finished || self.attached {
            return;
        }
        if let Some(subtree) = self.owned_subtree.as_ref() {
            host.attach(self.owner, subtree);
            self.attached = true;
            log::info!(
                "Entity {}: '{}' attached ({} nodes).",
                self.owner,
                self.logical_path,
                subtree.node_count()
            );
        }
    }

    fn release_subtree(&mut self, host: &mut dyn SceneHost) {
        if let Some(subtree) = self.owned_subtree.take() {
            host.detach(self.owner, subtree);
        }
        self.attached = false;
    }

    fn release_subscription(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.services.cache.unsubscribe(subscription.id());
        }
    }

    fn set_state(&mut self, state: LoadState) {
        if self.state == state {
            return;
        }
        log::debug!("Entity {}: {} -> {}.", self.owner, self.state, state);
        self.state = state;
        self.transitions += 1;
    }
}

impl Drop for AssetContainer {
    fn drop(&mut self) {
        self.release_subscription();
    }
}

impl std::fmt::Debug for AssetContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetContainer")
            .field("owner", &self.owner)
            .field("logical_path", &self.logical_path)
            .field("content_hash", &self.content_hash)
            .field("masks", &self.masks)
            .field("state", &self.state)
            .field("attached", &self.attached)
            .field("pending_tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}
