//! TOML file-backed settings store.
//!
//! One table per community:
//!
//! ```toml
//! [communities.123456789]
//! enabled = true
//! target_roles = [42]
//! approval_channel = 777
//! positive_threshold = 3
//! ```
//!
//! The whole file is held in memory and rewritten on every save.

use crate::{ConfigStore, PlatformError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use votegate_types::{CommunityId, VoteConfig};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct CommunitiesFile {
    /// TOML table keys are strings, so community ids are stored in decimal.
    #[serde(default)]
    communities: BTreeMap<String, VoteConfig>,
}

pub struct TomlConfigStore {
    path: PathBuf,
    file: RwLock<CommunitiesFile>,
}

impl TomlConfigStore {
    /// Open a settings file. A missing file is treated as empty and created on
    /// the first save.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PlatformError> {
        let path = path.as_ref().to_path_buf();
        let file = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => toml::from_str(&contents).map_err(|e| {
                PlatformError::Storage(format!("failed to parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("settings file {} not found, starting empty", path.display());
                CommunitiesFile::default()
            }
            Err(e) => {
                return Err(PlatformError::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        Ok(Self {
            path,
            file: RwLock::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Communities that have a stored table.
    pub async fn communities(&self) -> Vec<CommunityId> {
        self.file
            .read()
            .await
            .communities
            .keys()
            .filter_map(|k| k.parse::<u64>().ok())
            .map(CommunityId::new)
            .collect()
    }
}

#[async_trait]
impl ConfigStore for TomlConfigStore {
    async fn load_config(&self, community: CommunityId) -> Result<VoteConfig, PlatformError> {
        Ok(self
            .file
            .read()
            .await
            .communities
            .get(&community.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn save_config(
        &self,
        community: CommunityId,
        config: &VoteConfig,
    ) -> Result<(), PlatformError> {
        // The write lock is held until the file is on disk so saves land in order.
        // Loads keep seeing the old settings unless the file write succeeds.
        let mut file = self.file.write().await;
        let mut staged = file.clone();
        staged
            .communities
            .insert(community.to_string(), config.clone());
        let contents = toml::to_string_pretty(&staged)
            .map_err(|e| PlatformError::Storage(format!("failed to serialize settings: {e}")))?;
        tokio::fs::write(&self.path, contents).await.map_err(|e| {
            PlatformError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })?;
        *file = staged;
        tracing::debug!(%community, "saved settings to {}", self.path.display());
        Ok(())
    }
}
