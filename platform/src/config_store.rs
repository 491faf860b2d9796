//! Settings storage trait.

use crate::PlatformError;
use async_trait::async_trait;
use votegate_types::{CommunityId, VoteConfig};

/// Persistent per-community settings.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load a community's settings. A community that was never configured
    /// yields [`VoteConfig::default`].
    async fn load_config(&self, community: CommunityId) -> Result<VoteConfig, PlatformError>;

    /// Replace a community's settings.
    async fn save_config(
        &self,
        community: CommunityId,
        config: &VoteConfig,
    ) -> Result<(), PlatformError>;
}
