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

//! Acts as the **[A]gent** for content-addressed scene assets.
//!
//! An asset container turns a logical path into an owned, collision-configured
//! subtree under its entity:
//!
//! 1. resolve the path to a content hash;
//! 2. ask the shared cache for the payload, then wait on the completion
//!    broadcast (filtered by hash) or, on a cache hit, continue next tick;
//! 3. clone the shared payload, configure its colliders through a
//!    [`CollisionLane`](cairn_lanes::collision_lane::CollisionLane) and attach it
//!    on the following tick.
//!
//! Nothing here blocks: every step that waits is a task on a per-container
//! deferred queue, drained by [`AssetContainer::tick`].

mod agent;
mod container;

pub use agent::{AgentStatus, ContainerAgent};
pub use container::{AssetContainer, ChangeOutcome, ContainerServices};
