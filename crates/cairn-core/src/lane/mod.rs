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

//! # Lane Abstraction
//!
//! A **Lane** is a reusable, swappable processing strategy executed by an agent.
//! Each lane encapsulates one algorithmic approach to a domain task, and agents
//! pick the lane they run without depending on its concrete type.
//!
//! The hierarchy has two levels:
//!
//! 1. **`Lane`** (this trait): identity and classification shared by all lanes.
//! 2. **Domain traits** extending `Lane` with their execution method, for example
//!    `CollisionLane: Lane` for collider configuration strategies.

use std::any::Any;
use std::fmt;

/// Classification of lane types, used for routing and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// Collider generation and layer assignment.
    Collision,
    /// Asset fetching and processing.
    Asset,
    /// Scene structure maintenance.
    Scene,
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKind::Collision => write!(f, "Collision"),
            LaneKind::Asset => write!(f, "Asset"),
            LaneKind::Scene => write!(f, "Scene"),
        }
    }
}

/// The unified base trait for all lanes.
pub trait Lane: Send + Sync {
    /// A stable, human-readable name for the strategy (used in logs).
    fn strategy_name(&self) -> &'static str;

    /// The domain this lane belongs to.
    fn lane_kind(&self) -> LaneKind;

    /// Allows downcasting to the concrete lane type.
    fn as_any(&self) -> &dyn Any;
}
