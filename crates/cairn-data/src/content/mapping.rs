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
use cairn_core::asset::{ContentHash, LogicalPath};
use cairn_core::content::HashResolver;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One `path -> hash` pair of a scene's content manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Logical path as written in the scene (normalized on load).
    pub file: LogicalPath,
    /// Hash of the content behind the path.
    pub hash: ContentHash,
}

/// Serializable form of a [`ContentMapping`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingDefinition {
    /// Prefix joined with a hash to build its fetch URL.
    #[serde(default)]
    pub base_url: String,
    /// The manifest entries.
    #[serde(default)]
    pub content: Vec<MappingEntry>,
}

/// Errors raised while loading or storing a mapping.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The compact index is not a valid bincode-encoded mapping.
    #[error("failed to decode mapping index: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    /// The mapping could not be encoded into the compact index.
    #[error("failed to encode mapping index: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    /// The RON text is not a valid mapping definition.
    #[error("failed to parse mapping definition: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Resolves logical paths to content hashes for one scene.
///
/// Keys are normalized on insertion, so lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct ContentMapping {
    base_url: String,
    index: AHashMap<LogicalPath, ContentHash>,
}

impl ContentMapping {
    /// Creates an empty mapping whose fetch URLs start with `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            index: AHashMap::new(),
        }
    }

    /// Builds a mapping from manifest entries.
    pub fn from_entries(
        base_url: impl Into<String>,
        entries: impl IntoIterator<Item = MappingEntry>,
    ) -> Self {
        let mut mapping = Self::new(base_url);
        for entry in entries {
            mapping.insert(entry.file, entry.hash);
        }
        mapping
    }

    /// Builds a mapping from its serializable definition.
    pub fn from_definition(definition: MappingDefinition) -> Self {
        Self::from_entries(definition.base_url, definition.content)
    }

    /// Parses a RON [`MappingDefinition`].
    pub fn from_ron_str(text: &str) -> Result<Self, MappingError> {
        let definition: MappingDefinition = ron::from_str(text)?;
        Ok(Self::from_definition(definition))
    }

    /// Decodes the compact bincode index produced by [`ContentMapping::to_index_bytes`].
    pub fn from_index_bytes(index_bytes: &[u8]) -> Result<Self, MappingError> {
        let config = bincode::config::standard();
        let (definition, _): (MappingDefinition, _) =
            bincode::serde::decode_from_slice(index_bytes, config)?;
        Ok(Self::from_definition(definition))
    }

    /// Encodes the mapping into a compact bincode index.
    pub fn to_index_bytes(&self) -> Result<Vec<u8>, MappingError> {
        let config = bincode::config::standard();
        Ok(bincode::serde::encode_to_vec(&self.to_definition(), config)?)
    }

    /// Returns the serializable form, entries sorted by path.
    pub fn to_definition(&self) -> MappingDefinition {
        let mut content: Vec<MappingEntry> = self
            .index
            .iter()
            .map(|(file, hash)| MappingEntry {
                file: file.clone(),
                hash: hash.clone(),
            })
            .collect();
        content.sort_by(|a, b| a.file.cmp(&b.file));
        MappingDefinition {
            base_url: self.base_url.clone(),
            content,
        }
    }

    /// Adds or replaces the hash of a path.
    pub fn insert(&mut self, path: impl Into<LogicalPath>, hash: ContentHash) {
        self.index.insert(path.into(), hash);
    }

    /// Adds a path whose hash is derived from its raw content.
    pub fn insert_content(&mut self, path: impl Into<LogicalPath>, bytes: &[u8]) -> ContentHash {
        let hash = ContentHash::of_bytes(bytes);
        self.insert(path, hash.clone());
        hash
    }

    /// The URL prefix of this mapping.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of mapped paths.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no path is mapped.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl HashResolver for ContentMapping {
    fn resolve(&self, path: &LogicalPath) -> Option<ContentHash> {
        self.index.get(path).cloned()
    }

    fn url_for(&self, hash: &ContentHash) -> Option<String> {
        if self.base_url.is_empty() {
            None
        } else {
            Some(format!("{}{}", self.base_url, hash))
        }
    }
}
