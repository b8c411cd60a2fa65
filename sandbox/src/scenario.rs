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

//! Wires the reference collaborators together and runs the scripted frames.

use std::sync::Arc;

use anyhow::{Context, Result};
use cairn_agents::asset_container::{AgentStatus, ContainerAgent, ContainerServices};
use cairn_core::ecs::EntityId;
use cairn_data::cache::{ContentCache, InMemoryFetcher};
use cairn_data::content::ContentMapping;
use cairn_data::scene::SceneGraph;

use crate::config::{SandboxConfig, ScheduledChange};

pub struct Scenario {
    cache: Arc<ContentCache>,
    agent: ContainerAgent,
    scene: SceneGraph,
    changes: Vec<ScheduledChange>,
    ticks: u32,
    settled_at: Option<u32>,
}

impl Scenario {
    pub fn new(config: SandboxConfig) -> Result<Self> {
        let mapping = ContentMapping::from_entries(config.base_url, config.mapping);
        log::info!("Content mapping ready: {} entries.", mapping.len());

        let fetcher = InMemoryFetcher::new();
        for payload in config.payloads {
            fetcher.insert(payload.hash, payload.root);
        }
        let cache = Arc::new(ContentCache::new(config.cache, fetcher));

        let services = ContainerServices::new(Arc::new(mapping), cache.clone());
        let mut agent = ContainerAgent::new(services);
        for spawn in config.entities {
            agent
                .spawn(EntityId::new(spawn.entity, 0), spawn.path, spawn.masks)
                .with_context(|| format!("Failed to spawn entity {}", spawn.entity))?;
        }

        Ok(Self {
            cache,
            agent,
            scene: SceneGraph::new(),
            changes: config.changes,
            ticks: config.ticks,
            settled_at: None,
        })
    }

    /// Overrides the number of frames to run.
    pub fn with_ticks(mut self, ticks: u32) -> Self {
        self.ticks = ticks;
        self
    }

    /// Runs every frame: scheduled changes, container tick, cache pump, scene flush.
    pub fn run(&mut self) -> Result<AgentStatus> {
        let mut settled_at = None;
        for frame in 1..=self.ticks {
            for change in self.changes.iter().filter(|change| change.tick == frame) {
                let outcome = self
                    .agent
                    .change_asset(
                        EntityId::new(change.entity, 0),
                        change.path.clone(),
                        change.visible_mask,
                        change.invisible_mask,
                        &mut self.scene,
                    )
                    .with_context(|| format!("Scheduled change at tick {frame} failed"))?;
                log::info!("Tick {frame}: entity {} change -> {outcome:?}.", change.entity);
            }

            self.agent.tick(&mut self.scene);
            let fetched = self.cache.pump();
            let freed = self.scene.flush();
            log::trace!("Tick {frame}: {fetched} fetch(es), {freed} subtree(s) freed.");

            match (settled_at, self.agent.is_settled()) {
                (None, true) => {
                    log::info!("Tick {frame}: every container reached a terminal state.");
                    settled_at = Some(frame);
                }
                (Some(_), false) => settled_at = None,
                _ => {}
            }
        }
        self.settled_at = settled_at;

        for container in self.agent.containers() {
            log::info!(
                "Entity {}: '{}' is {} (hash '{}', attached: {}).",
                container.owner(),
                container.logical_path(),
                container.state(),
                container.content_hash(),
                container.is_attached()
            );
        }
        let stats = self.cache.stats();
        log::info!(
            "Cache: {} requests, {} deduplicated, {} fetched, {} failed.",
            stats.requests,
            stats.deduplicated,
            stats.fetched,
            stats.failed
        );

        Ok(self.agent.report_status())
    }

    /// The tick after which every container has stayed terminal, if the last run
    /// got there.
    pub fn settled_at(&self) -> Option<u32> {
        self.settled_at
    }

    /// Despawns every container and frees their subtrees. Returns how many subtrees
    /// the scene freed over the whole run.
    pub fn shutdown(mut self) -> usize {
        let owners: Vec<EntityId> = self.agent.containers().map(|c| c.owner()).collect();
        for owner in owners {
            self.agent.despawn(owner, &mut self.scene);
        }
        self.scene.flush();
        log::info!(
            "Shutdown complete: {} subtree(s) freed, {} cache subscriber(s) left.",
            self.scene.freed_count(),
            self.cache.subscriber_count()
        );
        self.scene.freed_count()
    }
}
