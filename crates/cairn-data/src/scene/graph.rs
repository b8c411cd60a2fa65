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

use std::collections::BTreeMap;

use cairn_core::ecs::EntityId;
use cairn_core::scene::{SceneHost, SceneNode};

/// What the scene knows about a subtree attached under an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedSubtree {
    /// Name of the subtree root.
    pub root_name: String,
    /// Number of nodes in the subtree.
    pub node_count: usize,
    /// Number of collision bodies in the subtree.
    pub collider_count: usize,
    /// Layer of every collision body, in depth-first order.
    pub collider_layers: Vec<u32>,
}

impl AttachedSubtree {
    fn of(subtree: &SceneNode) -> Self {
        let mut collider_layers = Vec::new();
        subtree.visit(&mut |node| {
            if let Some(body) = node.as_collision_body() {
                collider_layers.push(body.layer);
            }
        });
        Self {
            root_name: subtree.name.clone(),
            node_count: subtree.node_count(),
            collider_count: collider_layers.len(),
            collider_layers,
        }
    }
}

/// A minimal host scene that tracks attached subtrees per owner entity.
///
/// Detached subtrees are not dropped immediately: they wait in a free queue until
/// the next [`SceneGraph::flush`], the way a host engine frees nodes at the end
/// of the frame.
#[derive(Debug, Default)]
pub struct SceneGraph {
    attached: BTreeMap<EntityId, AttachedSubtree>,
    pending_free: Vec<(EntityId, SceneNode)>,
    mutations: usize,
    collider_updates: usize,
    freed: usize,
}

impl SceneGraph {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroys every subtree detached since the last flush. Returns how many.
    pub fn flush(&mut self) -> usize {
        let count = self.pending_free.len();
        for (owner, subtree) in self.pending_free.drain(..) {
            log::trace!(
                "Freeing subtree '{}' ({} nodes) of entity {owner}.",
                subtree.name,
                subtree.node_count()
            );
        }
        self.freed += count;
        count
    }

    /// The subtree attached under `owner`, if any.
    pub fn attached(&self, owner: EntityId) -> Option<&AttachedSubtree> {
        self.attached.get(&owner)
    }

    /// Returns `true` if `owner` has a subtree attached.
    pub fn is_attached(&self, owner: EntityId) -> bool {
        self.attached.contains_key(&owner)
    }

    /// Number of entities with an attached subtree.
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Number of detached subtrees waiting to be freed.
    pub fn pending_free_count(&self) -> usize {
        self.pending_free.len()
    }

    /// Number of structural mutations (attach or detach) performed so far.
    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    /// Number of in-place collider refreshes performed so far.
    pub fn collider_update_count(&self) -> usize {
        self.collider_updates
    }

    /// Number of subtrees destroyed so far.
    pub fn freed_count(&self) -> usize {
        self.freed
    }
}

impl SceneHost for SceneGraph {
    fn attach(&mut self, owner: EntityId, subtree: &SceneNode) {
        let record = AttachedSubtree::of(subtree);
        log::debug!(
            "Attaching '{}' under entity {owner} ({} nodes, {} colliders).",
            record.root_name,
            record.node_count,
            record.collider_count
        );
        if self.attached.insert(owner, record).is_some() {
            log::warn!("Entity {owner} already had a subtree attached; replacing it.");
        }
        self.mutations += 1;
    }

    fn detach(&mut self, owner: EntityId, subtree: SceneNode) {
        if self.attached.remove(&owner).is_none() {
            log::trace!("Entity {owner} released a subtree that was never attached.");
        }
        self.pending_free.push((owner, subtree));
        self.mutations += 1;
    }

    fn update_colliders(&mut self, owner: EntityId, subtree: &SceneNode) {
        match self.attached.get_mut(&owner) {
            Some(record) => {
                *record = AttachedSubtree::of(subtree);
                self.collider_updates += 1;
                log::debug!(
                    "Entity {owner}: colliders refreshed ({} colliders).",
                    record.collider_count
                );
            }
            None => {
                log::warn!("Entity {owner} updated colliders without an attached subtree.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::physics::{ColliderShape, CollisionBody};

    fn subtree() -> SceneNode {
        SceneNode::empty("root").with_child(SceneNode::collision_body(
            "col",
            CollisionBody::new(ColliderShape::Sphere(1.0)),
        ))
    }

    #[test]
    fn attach_records_the_subtree() {
        let mut scene = SceneGraph::new();
        let owner = EntityId::new(1, 0);
        scene.attach(owner, &subtree());

        assert_eq!(
            scene.attached(owner),
            Some(&AttachedSubtree {
                root_name: "root".into(),
                node_count: 2,
                collider_count: 1,
                collider_layers: vec![0],
            })
        );
        assert_eq!(scene.mutation_count(), 1);
    }

    #[test]
    fn collider_updates_are_not_structural() {
        let mut scene = SceneGraph::new();
        let owner = EntityId::new(1, 0);
        let mut tree = subtree();
        scene.attach(owner, &tree);

        if let Some(body) = tree.collision_body_child_mut() {
            body.layer = 6;
        }
        scene.update_colliders(owner, &tree);

        assert_eq!(scene.attached(owner).unwrap().collider_layers, vec![6]);
        assert_eq!(scene.collider_update_count(), 1);
        assert_eq!(scene.mutation_count(), 1);
    }

    #[test]
    fn collider_update_without_attachment_is_ignored() {
        let mut scene = SceneGraph::new();
        scene.update_colliders(EntityId::new(3, 0), &subtree());

        assert!(!scene.is_attached(EntityId::new(3, 0)));
        assert_eq!(scene.collider_update_count(), 0);
        assert_eq!(scene.mutation_count(), 0);
    }

    #[test]
    fn detached_subtrees_are_freed_on_flush() {
        let mut scene = SceneGraph::new();
        let owner = EntityId::new(1, 0);
        let tree = subtree();
        scene.attach(owner, &tree);
        scene.detach(owner, tree);

        assert!(!scene.is_attached(owner));
        assert_eq!(scene.pending_free_count(), 1);
        assert_eq!(scene.freed_count(), 0);

        assert_eq!(scene.flush(), 1);
        assert_eq!(scene.pending_free_count(), 0);
        assert_eq!(scene.freed_count(), 1);
        assert_eq!(scene.mutation_count(), 2);
    }
}
