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

use cairn_core::lane::{Lane, LaneKind};
use cairn_core::physics::{CollisionBody, CollisionMasks};
use cairn_core::scene::{NodeKind, SceneNode};

use super::{CollisionLane, MaskAssignmentReport};

/// Suffix appended to a mesh name to name its generated collision body.
pub const GENERATED_BODY_SUFFIX: &str = "_col";

/// The standard collider configuration pass.
///
/// For every mesh node, anywhere in the subtree:
/// - the mask is chosen by the mesh visibility flag;
/// - a collision body is generated only when the mesh has none and the mask is
///   non-zero;
/// - the layer of the (existing or generated) body is set to the mask, including
///   `0`, which keeps the body but disables its collisions.
///
/// Running the pass twice with the same masks changes nothing the second time.
#[derive(Debug, Default)]
pub struct MaskAssignmentLane;

impl MaskAssignmentLane {
    /// Creates a new `MaskAssignmentLane`.
    pub fn new() -> Self {
        Self
    }

    fn visit(
        &self,
        node: &mut SceneNode,
        masks: CollisionMasks,
        report: &mut MaskAssignmentReport,
    ) {
        if let NodeKind::Mesh(mesh) = &node.kind {
            report.meshes_visited += 1;
            let mask = masks.for_visibility(node.visible);

            if mask > 0 && node.collision_body_child().is_none() {
                match mesh.generate_collider() {
                    Some(collider) => {
                        let name = format!("{}{GENERATED_BODY_SUFFIX}", node.name);
                        let mut body =
                            SceneNode::collision_body(name, CollisionBody::new(collider.shape));
                        body.translation = collider.offset;
                        node.children.push(body);
                        report.bodies_generated += 1;
                    }
                    None => log::trace!("Mesh '{}' has no geometry to collide with.", node.name),
                }
            }

            if let Some(body) = node.collision_body_child_mut() {
                body.layer = mask;
                report.layers_written += 1;
            }
        }

        for child in &mut node.children {
            self.visit(child, masks, report);
        }
    }
}

impl Lane for MaskAssignmentLane {
    fn strategy_name(&self) -> &'static str {
        "CAIRN_MASK_ASSIGNMENT"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Collision
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl CollisionLane for MaskAssignmentLane {
    fn assign_masks(
        &self,
        root: &mut SceneNode,
        masks: CollisionMasks,
    ) -> MaskAssignmentReport {
        let mut report = MaskAssignmentReport::default();
        self.visit(root, masks, &mut report);
        log::trace!(
            "Mask assignment on '{}': {} meshes, {} bodies generated, {} layers written.",
            root.name,
            report.meshes_visited,
            report.bodies_generated,
            report.layers_written
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::math::Vec3;
    use cairn_core::physics::ColliderShape;
    use cairn_core::scene::MeshData;

    fn triangle() -> MeshData {
        MeshData::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
        )
    }

    fn layer_of(root: &SceneNode, mesh: &str) -> Option<u32> {
        root.find(mesh)?.collision_body_child().map(|body| body.layer)
    }

    fn two_mesh_tree() -> SceneNode {
        SceneNode::empty("root")
            .with_child(SceneNode::mesh("shown", triangle(), true))
            .with_child(SceneNode::mesh("hidden", triangle(), false))
    }

    #[test]
    fn layers_follow_visibility() {
        let lane = MaskAssignmentLane::new();
        let mut root = two_mesh_tree();

        let report = lane.assign_masks(&mut root, CollisionMasks::new(1, 2));

        assert_eq!(layer_of(&root, "shown"), Some(1));
        assert_eq!(layer_of(&root, "hidden"), Some(2));
        assert_eq!(
            report,
            MaskAssignmentReport {
                meshes_visited: 2,
                bodies_generated: 2,
                layers_written: 2,
            }
        );
        assert!(root.find("shown_col").is_some());
    }

    #[test]
    fn second_pass_is_idempotent() {
        let lane = MaskAssignmentLane::new();
        let mut root = two_mesh_tree();
        let masks = CollisionMasks::new(1, 2);

        lane.assign_masks(&mut root, masks);
        let after_first = root.clone();
        let report = lane.assign_masks(&mut root, masks);

        assert_eq!(root, after_first);
        assert_eq!(report.bodies_generated, 0);
        assert_eq!(root.collision_body_count(), 2);
    }

    #[test]
    fn zero_mask_never_generates_geometry() {
        let lane = MaskAssignmentLane::new();
        let mut root = two_mesh_tree();

        let report = lane.assign_masks(&mut root, CollisionMasks::new(4, 0));

        assert_eq!(layer_of(&root, "shown"), Some(4));
        assert_eq!(layer_of(&root, "hidden"), None);
        assert_eq!(report.bodies_generated, 1);
        assert_eq!(root.collision_body_count(), 1);
    }

    #[test]
    fn zero_mask_disables_an_existing_body() {
        let lane = MaskAssignmentLane::new();
        let mut root = two_mesh_tree();
        lane.assign_masks(&mut root, CollisionMasks::new(1, 2));

        lane.assign_masks(&mut root, CollisionMasks::new(0, 0));

        assert_eq!(layer_of(&root, "shown"), Some(0));
        assert_eq!(layer_of(&root, "hidden"), Some(0));
        assert_eq!(root.collision_body_count(), 2);
    }

    #[test]
    fn authored_bodies_are_reused() {
        let lane = MaskAssignmentLane::new();
        let authored = CollisionBody::new(ColliderShape::Box(Vec3::ONE));
        let mut root = SceneNode::mesh("crate", triangle(), true)
            .with_child(SceneNode::collision_body("crate_authored", authored));

        let report = lane.assign_masks(&mut root, CollisionMasks::new(8, 0));

        assert_eq!(report.bodies_generated, 0);
        assert_eq!(root.collision_body_count(), 1);
        match &root.children[0].kind {
            NodeKind::CollisionBody(body) => {
                assert_eq!(body.layer, 8);
                assert_eq!(body.shape, ColliderShape::Box(Vec3::ONE));
            }
            other => panic!("expected the authored body, got {other:?}"),
        }
    }

    #[test]
    fn nested_meshes_are_reached() {
        let lane = MaskAssignmentLane::new();
        let mut root = SceneNode::empty("root").with_child(
            SceneNode::mesh("outer", triangle(), true)
                .with_child(SceneNode::empty("pivot").with_child(SceneNode::mesh(
                    "inner",
                    triangle(),
                    false,
                ))),
        );

        let report = lane.assign_masks(&mut root, CollisionMasks::new(1, 2));

        assert_eq!(report.meshes_visited, 2);
        assert_eq!(layer_of(&root, "outer"), Some(1));
        assert_eq!(layer_of(&root, "inner"), Some(2));
    }

    #[test]
    fn empty_mesh_gets_no_body() {
        let lane = MaskAssignmentLane::new();
        let mut root = SceneNode::mesh("degenerate", MeshData::default(), true);

        let report = lane.assign_masks(&mut root, CollisionMasks::new(1, 1));

        assert_eq!(report.bodies_generated, 0);
        assert_eq!(report.layers_written, 0);
        assert!(root.children.is_empty());
    }

    #[test]
    fn generated_box_sits_on_the_mesh_bounds() {
        let lane = MaskAssignmentLane::new();
        let cloud = MeshData::new(
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0)],
            vec![],
        );
        let mut root = SceneNode::mesh("crate", cloud, true);

        lane.assign_masks(&mut root, CollisionMasks::new(1, 0));

        let body = root.find("crate_col").expect("generated body");
        assert!(body.translation.approx_eq(Vec3::new(1.0, 1.0, 1.0)));
        match &body.as_collision_body().expect("collision body").shape {
            ColliderShape::Box(half) => assert!(half.approx_eq(Vec3::ONE)),
            other => panic!("expected a box, got {other:?}"),
        }
    }

    #[test]
    fn generated_trimesh_stays_in_mesh_space() {
        let lane = MaskAssignmentLane::new();
        let mut root = SceneNode::mesh("tri", triangle(), true);

        lane.assign_masks(&mut root, CollisionMasks::new(1, 0));

        let body = root.find("tri_col").expect("generated body");
        assert_eq!(body.translation, Vec3::ZERO);
    }

    #[test]
    fn lane_identity() {
        let lane = MaskAssignmentLane::new();
        assert_eq!(lane.lane_kind(), LaneKind::Collision);
        assert_eq!(lane.strategy_name(), "CAIRN_MASK_ASSIGNMENT");
        assert!(lane.as_any().downcast_ref::<MaskAssignmentLane>().is_some());
    }
}
