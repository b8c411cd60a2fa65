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

//! Provides the foundational traits and primitive types for Cairn's asset system.
//!
//! This module defines the "common language" shared by the asset container, the
//! content cache and the content mapping:
//! - The [`Asset`] marker trait and the shared [`AssetHandle`].
//! - Content-addressing identifiers: [`LogicalPath`] and [`ContentHash`].
//! - The [`LoadState`] a container reports to observers.

mod handle;
mod hash;

pub use handle::*;
pub use hash::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A marker trait for types that can be managed by the asset system.
///
/// The supertraits allow decoded payloads to be shared between every container
/// that references the same content hash.
///
/// # Examples
///
/// ```
/// use cairn_core::asset::Asset;
///
/// struct Texture {
///     // ... fields
/// }
///
/// impl Asset for Texture {}
/// ```
pub trait Asset: Send + Sync + 'static {}

/// The kind of payload a container asks the cache for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AssetKind {
    /// A glTF scene, decoded into a node tree.
    #[default]
    Gltf,
    /// A standalone texture.
    Texture,
    /// An audio clip.
    Audio,
}

/// The load lifecycle of an asset container.
///
/// `NotFound`, `FinishedWithError` and `Finished` are terminal for a load cycle; a
/// source change starts a fresh cycle from `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoadState {
    /// No load has been attempted for the current path.
    #[default]
    Unknown,
    /// The hash is resolved and the payload is being fetched.
    Loading,
    /// The logical path has no entry in the content mapping.
    NotFound,
    /// The fetch completed but no decoded payload could be retrieved.
    FinishedWithError,
    /// The payload is instantiated and owned by the container.
    Finished,
}

impl LoadState {
    /// Returns `true` if no further transition happens without a new load request.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LoadState::NotFound | LoadState::FinishedWithError | LoadState::Finished
        )
    }

    /// Returns `true` if the container's content hash is meaningful in this state.
    pub fn has_trusted_hash(self) -> bool {
        matches!(
            self,
            LoadState::Loading | LoadState::Finished | LoadState::FinishedWithError
        )
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::Unknown => "unknown",
            LoadState::Loading => "loading",
            LoadState::NotFound => "not-found",
            LoadState::FinishedWithError => "finished-with-error",
            LoadState::Finished => "finished",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!LoadState::Unknown.is_terminal());
        assert!(!LoadState::Loading.is_terminal());
        assert!(LoadState::NotFound.is_terminal());
        assert!(LoadState::FinishedWithError.is_terminal());
        assert!(LoadState::Finished.is_terminal());
    }

    #[test]
    fn hash_is_only_trusted_once_resolved() {
        assert!(!LoadState::Unknown.has_trusted_hash());
        assert!(!LoadState::NotFound.has_trusted_hash());
        assert!(LoadState::Loading.has_trusted_hash());
        assert!(LoadState::FinishedWithError.has_trusted_hash());
        assert!(LoadState::Finished.has_trusted_hash());
    }
}
