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

//! Collision primitives attached to scene nodes.
//!
//! The container never talks to a physics engine directly: it only creates
//! [`CollisionBody`] nodes and writes their layer bits. A host scene turns those
//! into real colliders when the subtree is attached.

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Shape of a collision body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Box with half-extents.
    Box(Vec3),
    /// Sphere with radius.
    Sphere(f32),
    /// Capsule with half-height and radius.
    Capsule(f32, f32),
    /// Triangle mesh generated from render geometry.
    TriMesh {
        /// Vertex positions.
        vertices: Vec<Vec3>,
        /// Triangle list indices into `vertices`.
        indices: Vec<u32>,
    },
}

/// A static collision body living as a direct child of a mesh node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionBody {
    /// Shape of the collider.
    pub shape: ColliderShape,
    /// Collision layer bits. `0` disables collisions without removing the body.
    pub layer: u32,
}

impl CollisionBody {
    /// Creates a body with the given shape on layer `0`.
    pub fn new(shape: ColliderShape) -> Self {
        Self { shape, layer: 0 }
    }
}

/// The pair of layer masks a container applies to the colliders of its subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionMasks {
    /// Layer bits for colliders of visible meshes.
    pub visible: u32,
    /// Layer bits for colliders of hidden meshes.
    pub invisible: u32,
}

impl CollisionMasks {
    /// Creates a new mask pair.
    pub const fn new(visible: u32, invisible: u32) -> Self {
        Self { visible, invisible }
    }

    /// Selects the mask for a mesh with the given visibility flag.
    #[inline]
    pub fn for_visibility(&self, visible: bool) -> u32 {
        if visible {
            self.visible
        } else {
            self.invisible
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_follows_visibility() {
        let masks = CollisionMasks::new(1, 2);
        assert_eq!(masks.for_visibility(true), 1);
        assert_eq!(masks.for_visibility(false), 2);
    }
}
