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

//! Contracts of the two collaborators an asset container depends on.
//!
//! - [`HashResolver`] turns a [`LogicalPath`] into the [`ContentHash`] of its bytes.
//! - [`AssetCache`] fetches payloads by hash, deduplicates concurrent requests,
//!   stores decoded subtrees and broadcasts every completed hash.
//!
//! Containers receive both as shared references at construction and hold them for
//! their whole lifetime.

use thiserror::Error;

use crate::asset::{AssetHandle, AssetKind, ContentHash, LogicalPath};
use crate::event::{Subscription, SubscriptionId};
use crate::scene::SceneNode;

/// Pure lookup from logical path to content hash.
pub trait HashResolver: Send + Sync {
    /// Returns the hash of the content behind `path`, or `None` if the mapping does
    /// not know the path.
    fn resolve(&self, path: &LogicalPath) -> Option<ContentHash>;

    /// Returns the location the content with `hash` is fetched from, if the resolver
    /// knows one.
    fn url_for(&self, hash: &ContentHash) -> Option<String> {
        let _ = hash;
        None
    }
}

/// Outcome of [`AssetCache::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// The decoded payload is already stored; no notification will be sent for
    /// this request.
    Ready,
    /// A fetch is queued or running; its hash will be broadcast on completion.
    Pending,
}

/// Errors a cache reports when it cannot even start a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The mapping passed with the request does not know the path.
    #[error("logical path '{0}' is not part of the content mapping")]
    UnknownPath(LogicalPath),
    /// The mapping resolved the path to an empty hash.
    #[error("logical path '{0}' resolved to an empty content hash")]
    EmptyHash(LogicalPath),
}

/// The shared content cache and loader.
pub trait AssetCache: Send + Sync {
    /// Ensures the payload for `path` is available or being fetched.
    ///
    /// Idempotent: concurrent requests for the same hash are deduplicated here.
    fn request(
        &self,
        path: &LogicalPath,
        kind: AssetKind,
        mapping: &dyn HashResolver,
    ) -> Result<RequestStatus, CacheError>;

    /// Returns the decoded payload for `hash`, if the fetch succeeded.
    fn get(&self, hash: &ContentHash) -> Option<AssetHandle<SceneNode>>;

    /// Registers a listener on the completion broadcast.
    fn subscribe(&self) -> Subscription<ContentHash>;

    /// Releases a listener. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}
