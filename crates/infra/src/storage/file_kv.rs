//! File-backed key/value store
//!
//! A small TOML map on disk, used to cache the OAuth token and its expiry
//! across sessions. Values are written owner-only on unix since the file
//! contains a bearer token.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use echodue_common::auth::KeyValueStore;
use echodue_domain::{EchoDueError, Result};

use crate::errors::InfraError;

/// Durable [`KeyValueStore`] backed by a TOML file.
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform's config location
    /// (`<config dir>/echodue/tokens.toml`).
    ///
    /// # Errors
    /// Returns `Config` when the platform reports no config directory.
    pub fn open_default() -> Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            InfraError(EchoDueError::Config("no config directory on this platform".to_string()))
        })?;

        Ok(Self::new(base.join("echodue").join("tokens.toml")))
    }

    fn load(&self) -> std::result::Result<BTreeMap<String, String>, String> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| format!("failed to read {}: {e}", self.path.display()))?;

        toml::from_str(&contents)
            .map_err(|e| format!("failed to parse {}: {e}", self.path.display()))
    }

    fn save(&self, map: &BTreeMap<String, String>) -> std::result::Result<(), String> {
        let contents =
            toml::to_string_pretty(map).map_err(|e| format!("failed to serialize store: {e}"))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
        }

        std::fs::write(&self.path, contents)
            .map_err(|e| format!("failed to write {}: {e}", self.path.display()))?;

        // Owner-only since the file contains OAuth tokens:
        #[cfg(unix)]
        set_owner_only(&self.path)?;

        Ok(())
    }
}

#[cfg(unix)]
fn set_owner_only(path: &std::path::Path) -> std::result::Result<(), String> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| format!("failed to set permissions on {}: {e}", path.display()))
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, String> {
        Ok(self.load()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), String> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }

    async fn remove(&self, key: &str) -> std::result::Result<(), String> {
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }
}
