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

use ahash::AHashMap;
use cairn_core::asset::{Asset, AssetHandle, ContentHash};

/// Decoded assets of one type, keyed by content hash.
///
/// Payloads are stored behind [`AssetHandle`]s: every requester of a hash gets the
/// same immutable allocation.
pub struct Assets<A: Asset> {
    storage: AHashMap<ContentHash, AssetHandle<A>>,
}

impl<A: Asset> Default for Assets<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Asset> Clone for Assets<A> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<A: Asset> Assets<A> {
    /// Creates a new, empty asset storage.
    pub fn new() -> Self {
        Self {
            storage: AHashMap::new(),
        }
    }

    /// Inserts an asset handle, replacing any previous handle for the same hash.
    pub fn insert(&mut self, hash: ContentHash, handle: AssetHandle<A>) {
        self.storage.insert(hash, handle);
    }

    /// Retrieves the handle stored for `hash`.
    pub fn get(&self, hash: &ContentHash) -> Option<&AssetHandle<A>> {
        self.storage.get(hash)
    }

    /// Checks if an asset with the specified hash exists in the storage.
    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.storage.contains_key(hash)
    }

    /// Removes the handle for `hash`. Outstanding clones keep the data alive.
    pub fn remove(&mut self, hash: &ContentHash) -> Option<AssetHandle<A>> {
        self.storage.remove(hash)
    }

    /// Number of stored assets.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}
