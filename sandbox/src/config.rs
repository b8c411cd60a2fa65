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

//! Scenario description loaded from RON.

use cairn_core::asset::{ContentHash, LogicalPath};
use cairn_core::physics::CollisionMasks;
use cairn_core::scene::SceneNode;
use cairn_data::config::CacheConfig;
use cairn_data::content::MappingEntry;
use serde::Deserialize;

/// A decoded payload served by the in-memory fetcher.
#[derive(Debug, Clone, Deserialize)]
pub struct PayloadDefinition {
    pub hash: ContentHash,
    pub root: SceneNode,
}

/// An entity created with an asset container at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct EntitySpawn {
    pub entity: u32,
    pub path: LogicalPath,
    #[serde(default)]
    pub masks: CollisionMasks,
}

/// A `change_asset` call issued before the given tick runs.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledChange {
    pub tick: u32,
    pub entity: u32,
    pub path: LogicalPath,
    pub visible_mask: u32,
    pub invisible_mask: u32,
}

/// Everything the sandbox needs to run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub cache: CacheConfig,
    pub base_url: String,
    pub mapping: Vec<MappingEntry>,
    pub payloads: Vec<PayloadDefinition>,
    pub entities: Vec<EntitySpawn>,
    pub changes: Vec<ScheduledChange>,
    pub ticks: u32,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            base_url: String::new(),
            mapping: Vec::new(),
            payloads: Vec::new(),
            entities: Vec::new(),
            changes: Vec::new(),
            ticks: 8,
        }
    }
}
