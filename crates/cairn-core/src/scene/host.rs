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

use crate::ecs::EntityId;

use super::SceneNode;

/// The host scene capability a container attaches its subtree to.
///
/// `attach` and `detach` are structural scene mutations; containers only issue
/// them from a deferred task, never from inside a cache notification.
pub trait SceneHost {
    /// Makes `subtree` visible in the scene as a child of `owner`.
    fn attach(&mut self, owner: EntityId, subtree: &SceneNode);

    /// Removes the subtree of `owner` from the scene and takes ownership of it.
    ///
    /// Destruction may be deferred but must eventually happen.
    fn detach(&mut self, owner: EntityId, subtree: SceneNode);

    /// Refreshes the collider configuration of the subtree attached under `owner`
    /// after its layers changed in place. Not a structural mutation.
    fn update_colliders(&mut self, owner: EntityId, subtree: &SceneNode);
}
