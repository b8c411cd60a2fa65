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

//! The agent owning every asset container of a scene.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use cairn_core::asset::{LoadState, LogicalPath};
use cairn_core::ecs::EntityId;
use cairn_core::physics::CollisionMasks;
use cairn_core::scene::SceneHost;

use super::container::{AssetContainer, ChangeOutcome, ContainerServices};

/// A snapshot of the containers an agent drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentStatus {
    /// Ticks run so far.
    pub frame: u64,
    /// Live containers.
    pub containers: usize,
    /// Containers that have not reached a terminal state yet.
    pub loading: usize,
    /// Containers holding a configured subtree.
    pub finished: usize,
    /// Containers in `NotFound` or `FinishedWithError`.
    pub failed: usize,
}

/// Owns one [`AssetContainer`] per entity and ticks them once per frame.
pub struct ContainerAgent {
    services: ContainerServices,
    containers: BTreeMap<EntityId, AssetContainer>,
    frame_count: u64,
}

impl ContainerAgent {
    /// Creates an agent whose containers share `services`.
    pub fn new(services: ContainerServices) -> Self {
        Self {
            services,
            containers: BTreeMap::new(),
            frame_count: 0,
        }
    }

    /// Creates a container for `entity`. Its load starts on the next tick.
    pub fn spawn(
        &mut self,
        entity: EntityId,
        path: impl Into<LogicalPath>,
        masks: CollisionMasks,
    ) -> Result<()> {
        if self.containers.contains_key(&entity) {
            return Err(anyhow!("Entity {entity} already owns an asset container"));
        }
        let container = AssetContainer::new(entity, path, masks, self.services.clone());
        log::info!(
            "ContainerAgent: spawned container for entity {entity} ('{}').",
            container.logical_path()
        );
        self.containers.insert(entity, container);
        Ok(())
    }

    /// Tears down and removes the container of `entity`.
    ///
    /// Returns `false` if the entity had no container.
    pub fn despawn(&mut self, entity: EntityId, host: &mut dyn SceneHost) -> bool {
        match self.containers.remove(&entity) {
            Some(mut container) => {
                container.teardown(host);
                log::info!("ContainerAgent: despawned container for entity {entity}.");
                true
            }
            None => false,
        }
    }

    /// Forwards a path or mask change to the container of `entity`.
    pub fn change_asset(
        &mut self,
        entity: EntityId,
        path: impl Into<LogicalPath>,
        visible_mask: u32,
        invisible_mask: u32,
        host: &mut dyn SceneHost,
    ) -> Result<ChangeOutcome> {
        let container = self
            .containers
            .get_mut(&entity)
            .ok_or_else(|| anyhow!("Entity {entity} has no asset container"))?;
        Ok(container.change_asset(path, visible_mask, invisible_mask, host))
    }

    /// Ticks every container once, in entity order.
    pub fn tick(&mut self, host: &mut dyn SceneHost) {
        self.frame_count += 1;
        for container in self.containers.values_mut() {
            container.tick(host);
        }
    }

    /// The load state of `entity`'s container.
    pub fn state(&self, entity: EntityId) -> Option<LoadState> {
        self.containers.get(&entity).map(AssetContainer::state)
    }

    /// The container of `entity`.
    pub fn container(&self, entity: EntityId) -> Option<&AssetContainer> {
        self.containers.get(&entity)
    }

    /// Iterates over all containers in entity order.
    pub fn containers(&self) -> impl Iterator<Item = &AssetContainer> {
        self.containers.values()
    }

    /// Returns `true` once every container has reached a terminal state.
    pub fn is_settled(&self) -> bool {
        self.containers.values().all(|c| c.state().is_terminal())
    }

    /// Summarises the containers and logs the summary.
    pub fn report_status(&self) -> AgentStatus {
        let mut status = AgentStatus {
            frame: self.frame_count,
            containers: self.containers.len(),
            ..AgentStatus::default()
        };
        for container in self.containers.values() {
            match container.state() {
                LoadState::Finished => status.finished += 1,
                LoadState::NotFound | LoadState::FinishedWithError => status.failed += 1,
                LoadState::Unknown | LoadState::Loading => status.loading += 1,
            }
        }
        log::debug!(
            "ContainerAgent: frame={} containers={} loading={} finished={} failed={}",
            status.frame,
            status.containers,
            status.loading,
            status.finished,
            status.failed
        );
        status
    }
}
