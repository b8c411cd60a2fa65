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

use std::sync::{Mutex, RwLock};

use ahash::AHashMap;
use cairn_core::asset::{AssetKind, ContentHash};
use cairn_core::scene::SceneNode;
use thiserror::Error;

/// Everything a fetcher needs to produce one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Hash of the content to fetch.
    pub hash: ContentHash,
    /// Location reported by the content mapping, if any.
    pub url: Option<String>,
    /// Kind of payload requested.
    pub kind: AssetKind,
}

/// Errors a fetcher reports for a single payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The backend has no content for the hash.
    #[error("no content available for hash {0}")]
    NotAvailable(ContentHash),
    /// The backend cannot produce payloads of this kind.
    #[error("payload kind {0:?} is not supported by this fetcher")]
    UnsupportedKind(AssetKind),
    /// Transport or decode failure reported by the backend.
    #[error("fetch failed: {0}")]
    Backend(String),
}

/// Fetches and decodes the payload of a content hash.
///
/// Decoding the binary asset format is the fetcher's business; the cache only
/// stores the resulting node tree.
pub trait PayloadFetcher: Send + Sync {
    /// Produces the decoded subtree for `request`.
    fn fetch(&self, request: &FetchRequest) -> Result<SceneNode, FetchError>;
}

/// A fetcher serving pre-decoded payloads from memory.
#[derive(Debug, Default)]
pub struct InMemoryFetcher {
    payloads: RwLock<AHashMap<ContentHash, SceneNode>>,
    fetched: Mutex<Vec<ContentHash>>,
}

impl InMemoryFetcher {
    /// Creates a fetcher with no payloads.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `payload` available under `hash`.
    pub fn insert(&self, hash: impl Into<ContentHash>, payload: SceneNode) {
        self.payloads
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(hash.into(), payload);
    }

    /// Builder-style variant of [`InMemoryFetcher::insert`].
    pub fn with_payload(self, hash: impl Into<ContentHash>, payload: SceneNode) -> Self {
        self.insert(hash, payload);
        self
    }

    /// Number of times `hash` was fetched.
    pub fn fetch_count(&self, hash: &ContentHash) -> usize {
        self.fetched
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|fetched| *fetched == hash)
            .count()
    }

    /// Every fetched hash, in fetch order.
    pub fn fetch_log(&self) -> Vec<ContentHash> {
        self.fetched
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl PayloadFetcher for InMemoryFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<SceneNode, FetchError> {
        self.fetched
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.hash.clone());

        if request.kind != AssetKind::Gltf {
            return Err(FetchError::UnsupportedKind(request.kind));
        }

        self.payloads
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&request.hash)
            .cloned()
            .ok_or_else(|| FetchError::NotAvailable(request.hash.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

impl From<&str> for FetchRequest {
    fn from(hash: &str) -> Self {
        Self {
            hash: ContentHash::from(hash),
            url: None,
            kind: AssetKind::Gltf,
        }
    }
}

    #[test]
    fn serves_known_payloads_and_logs_fetches() {
        let fetcher = InMemoryFetcher::new().with_payload("abc123", SceneNode::empty("root"));

        let node = fetcher.fetch(&"abc123".into()).expect("known payload");
        assert_eq!(node.name, "root");
        assert_eq!(
            fetcher.fetch(&"zzz".into()),
            Err(FetchError::NotAvailable("zzz".into()))
        );
        assert_eq!(fetcher.fetch_count(&"abc123".into()), 1);
        assert_eq!(fetcher.fetch_log().len(), 2);
    }

    #[test]
    fn rejects_non_scene_kinds() {
        let fetcher = InMemoryFetcher::new().with_payload("abc123", SceneNode::empty("root"));
        let request = FetchRequest {
            kind: AssetKind::Audio,
            ..FetchRequest::from("abc123")
        };
        assert_eq!(
            fetcher.fetch(&request),
            Err(FetchError::UnsupportedKind(AssetKind::Audio))
        );
    }
}
