//! Nullable settings store: thread-safe in-memory settings for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use votegate_platform::{ConfigStore, PlatformError};
use votegate_types::{CommunityId, VoteConfig};

/// An in-memory settings store.
pub struct NullConfigStore {
    configs: Mutex<HashMap<CommunityId, VoteConfig>>,
    fail_loads: AtomicBool,
}

impl NullConfigStore {
    pub fn new() -> Self {
        Self {
            configs: Mutex::new(HashMap::new()),
            fail_loads: AtomicBool::new(false),
        }
    }

    /// Builder-style seeding.
    pub fn with(self, community: CommunityId, config: VoteConfig) -> Self {
        self.set(community, config);
        self
    }

    /// Replace a community's settings without going through the trait.
    pub fn set(&self, community: CommunityId, config: VoteConfig) {
        self.configs.lock().unwrap().insert(community, config);
    }

    /// Current settings for assertions (defaults if never stored).
    pub fn get(&self, community: CommunityId) -> VoteConfig {
        self.configs
            .lock()
            .unwrap()
            .get(&community)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every subsequent load fail with a storage error.
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }
}

impl Default for NullConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for NullConfigStore {
    async fn load_config(&self, community: CommunityId) -> Result<VoteConfig, PlatformError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(PlatformError::Storage("settings store offline".into()));
        }
        Ok(self.get(community))
    }

    async fn save_config(
        &self,
        community: CommunityId,
        config: &VoteConfig,
    ) -> Result<(), PlatformError> {
        self.set(community, config.clone());
        Ok(())
    }
}
