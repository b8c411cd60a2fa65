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

//! The abstract node tree an asset decodes into, and the host capability that
//! displays it.
//!
//! A [`SceneNode`] tree is plain owned data: `Clone` produces a structurally
//! independent copy, which is how a container takes exclusive ownership of a
//! payload the cache shares between many requesters.

mod host;

pub use host::SceneHost;

use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::math::{Aabb, Vec3};
use crate::physics::{ColliderShape, CollisionBody};

/// Render geometry of a mesh node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    /// Vertex positions in node space.
    pub positions: Vec<Vec3>,
    /// Triangle list indices. Empty for non-indexed meshes.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Creates mesh data from positions and triangle indices.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    /// Derives a collider from the render geometry.
    ///
    /// Indexed meshes become a triangle mesh in node space. Non-indexed meshes fall
    /// back to their bounding box, offset to the box center. Returns `None` for a
    /// mesh without positions.
    pub fn generate_collider(&self) -> Option<GeneratedCollider> {
        let bounds = Aabb::from_points(&self.positions)?;
        if self.indices.len() >= 3 {
            Some(GeneratedCollider {
                shape: ColliderShape::TriMesh {
                    vertices: self.positions.clone(),
                    indices: self.indices.clone(),
                },
                offset: Vec3::ZERO,
            })
        } else {
            Some(GeneratedCollider {
                shape: ColliderShape::Box(bounds.half_extents()),
                offset: bounds.center(),
            })
        }
    }
}

/// A collider derived from a mesh, with its placement relative to the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCollider {
    /// The collision geometry.
    pub shape: ColliderShape,
    /// Translation of the collision body relative to the mesh node.
    pub offset: Vec3,
}

/// What a node represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A grouping node that only carries a transform.
    Empty,
    /// A renderable mesh.
    Mesh(MeshData),
    /// A collision body. Always a direct child of the mesh it was built from.
    CollisionBody(CollisionBody),
}

/// A node of a decoded asset subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Node name, unique among siblings by convention only.
    pub name: String,
    /// What the node represents.
    pub kind: NodeKind,
    /// Visibility flag. Selects the collision mask of mesh nodes.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Translation relative to the parent.
    #[serde(default)]
    pub translation: Vec3,
    /// Child nodes.
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

fn default_visible() -> bool {
    true
}

impl Asset for SceneNode {}

impl SceneNode {
    /// Creates a visible grouping node.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Empty,
            visible: true,
            translation: Vec3::ZERO,
            children: Vec::new(),
        }
    }

    /// Creates a mesh node.
    pub fn mesh(name: impl Into<String>, mesh: MeshData, visible: bool) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Mesh(mesh),
            visible,
            translation: Vec3::ZERO,
            children: Vec::new(),
        }
    }

    /// Creates a collision body node.
    pub fn collision_body(name: impl Into<String>, body: CollisionBody) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::CollisionBody(body),
            visible: true,
            translation: Vec3::ZERO,
            children: Vec::new(),
        }
    }

    /// Builder-style helper appending a child.
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the mesh data if this is a mesh node.
    pub fn as_mesh(&self) -> Option<&MeshData> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Returns the collision body if this is a collision body node.
    pub fn as_collision_body(&self) -> Option<&CollisionBody> {
        match &self.kind {
            NodeKind::CollisionBody(body) => Some(body),
            _ => None,
        }
    }

    /// Finds the first direct child that is a collision body.
    pub fn collision_body_child_mut(&mut self) -> Option<&mut CollisionBody> {
        self.children.iter_mut().find_map(|child| match &mut child.kind {
            NodeKind::CollisionBody(body) => Some(body),
            _ => None,
        })
    }

    /// Finds the first direct child that is a collision body.
    pub fn collision_body_child(&self) -> Option<&CollisionBody> {
        self.children.iter().find_map(SceneNode::as_collision_body)
    }

    /// Visits this node and all of its descendants, depth first, parents first.
    pub fn visit(&self, visitor: &mut impl FnMut(&SceneNode)) {
        visitor(self);
        for child in &self.children {
            child.visit(visitor);
        }
    }

    /// Finds a node by name anywhere in the subtree.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Counts this node and all of its descendants.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_| count += 1);
        count
    }

    /// Counts the collision bodies in the subtree.
    pub fn collision_body_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |node| {
            if node.as_collision_body().is_some() {
                count += 1;
            }
        });
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData::new(
            vec![
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(-1.0, 0.0, 1.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn indexed_mesh_generates_trimesh() {
        let collider = quad().generate_collider().expect("mesh has positions");
        assert_eq!(collider.offset, Vec3::ZERO);
        match collider.shape {
            ColliderShape::TriMesh { vertices, indices } => {
                assert_eq!(vertices.len(), 4);
                assert_eq!(indices.len(), 6);
            }
            other => panic!("expected a trimesh, got {other:?}"),
        }
    }

    #[test]
    fn point_cloud_falls_back_to_centered_box() {
        let mesh = MeshData::new(
            vec![Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 0.0)],
            vec![],
        );
        let collider = mesh.generate_collider().expect("mesh has positions");
        match collider.shape {
            ColliderShape::Box(half) => assert!(half.approx_eq(Vec3::new(2.0, 0.5, 0.0))),
            other => panic!("expected a box, got {other:?}"),
        }
        assert!(collider.offset.approx_eq(Vec3::new(0.0, 0.5, 0.0)));
    }

    #[test]
    fn empty_mesh_generates_nothing() {
        assert!(MeshData::default().generate_collider().is_none());
    }

    #[test]
    fn clone_is_structurally_independent() {
        let original =
            SceneNode::empty("root").with_child(SceneNode::mesh("quad", quad(), true));
        let mut copy = original.clone();
        copy.children[0].visible = false;
        copy.children[0].children.push(SceneNode::collision_body(
            "quad_col",
            CollisionBody::new(ColliderShape::Sphere(1.0)),
        ));

        assert!(original.children[0].visible);
        assert_eq!(original.collision_body_count(), 0);
        assert_eq!(copy.collision_body_count(), 1);
    }

    #[test]
    fn find_and_count() {
        let tree = SceneNode::empty("root").with_child(
            SceneNode::empty("group").with_child(SceneNode::mesh("leaf", quad(), false)),
        );
        assert_eq!(tree.node_count(), 3);
        assert!(tree.find("leaf").is_some_and(|n| !n.visible));
        assert!(tree.find("missing").is_none());
    }
}
