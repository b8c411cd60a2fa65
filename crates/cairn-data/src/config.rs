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

//! Configuration of the data layer, loadable from RON files.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Tuning of the [`ContentCache`](crate::cache::ContentCache).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How many queued fetches a single `pump` performs.
    pub max_fetches_per_pump: usize,
    /// Priority given to requests that do not specify one.
    pub default_priority: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_fetches_per_pump: 4,
            default_priority: 0,
        }
    }
}

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid RON for the expected type.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Reads and deserializes a RON configuration file.
pub fn load_ron<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let value = ron::from_str(&text)?;
    log::debug!("Loaded configuration from '{}'.", path.as_ref().display());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_fields_use_defaults() {
        let config: CacheConfig = ron::from_str("(max_fetches_per_pump: 1)").expect("valid ron");
        assert_eq!(config.max_fetches_per_pump, 1);
        assert_eq!(config.default_priority, 0);
    }

    #[test]
    fn load_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("cache.ron");
        std::fs::write(&path, "(max_fetches_per_pump: 8, default_priority: 3)")?;

        let config: CacheConfig = load_ron(&path)?;
        assert_eq!(
            config,
            CacheConfig {
                max_fetches_per_pump: 8,
                default_priority: 3,
            }
        );
        Ok(())
    }

    #[test]
    fn load_reports_missing_file_and_bad_syntax() {
        let dir = tempdir().expect("temp dir");
        let missing = load_ron::<CacheConfig>(dir.path().join("nope.ron"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));

        let bad = dir.path().join("bad.ron");
        std::fs::write(&bad, "(max_fetches_per_pump: \"many\")").expect("write");
        assert!(matches!(load_ron::<CacheConfig>(&bad), Err(ConfigError::Parse(_))));
    }
}
