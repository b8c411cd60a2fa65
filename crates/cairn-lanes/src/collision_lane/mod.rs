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

//! Collision Lane
//!
//! Configures the collision bodies of a decoded asset subtree: which meshes get a
//! body, and which layer bits each body carries.

mod mask_assignment_lane;

pub use mask_assignment_lane::*;

use cairn_core::lane::Lane;
use cairn_core::physics::CollisionMasks;
use cairn_core::scene::SceneNode;

/// What a collision pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaskAssignmentReport {
    /// Mesh nodes reached by the walk.
    pub meshes_visited: usize,
    /// Collision bodies created during this pass.
    pub bodies_generated: usize,
    /// Collision bodies whose layer was written.
    pub layers_written: usize,
}

/// A strategy that configures the colliders of a subtree in place.
pub trait CollisionLane: Lane {
    /// Walks `root` and applies `masks` to the colliders of every mesh.
    fn assign_masks(
        &self,
        root: &mut SceneNode,
        masks: CollisionMasks,
    ) -> MaskAssignmentReport;
}
