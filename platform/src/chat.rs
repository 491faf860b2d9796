//! Chat platform trait.

use crate::PlatformError;
use async_trait::async_trait;
use votegate_types::{AccountId, ChannelId, CommunityId, MessageId, RoleId};

/// Outbound operations the vote core needs from the chat platform.
///
/// Every call is request/response: it either succeeds or returns a
/// [`PlatformError`]. Timeouts are the implementation's concern.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// The account the service itself runs as. Its own reactions are ignored.
    fn bot_account(&self) -> AccountId;

    /// Whether the service holds the "manage roles" capability in a community.
    async fn can_manage_roles(&self, community: CommunityId) -> Result<bool, PlatformError>;

    /// Post a plain-text message and return its id.
    async fn post_message(&self, channel: ChannelId, text: &str)
        -> Result<MessageId, PlatformError>;

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), PlatformError>;

    /// Remove every reaction of `symbol` from a message.
    async fn clear_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), PlatformError>;

    async fn grant_roles(
        &self,
        community: CommunityId,
        account: AccountId,
        roles: &[RoleId],
        reason: &str,
    ) -> Result<(), PlatformError>;

    /// Mention markup for a current member, or `None` if the account is no
    /// longer part of the community.
    async fn member_mention(&self, community: CommunityId, account: AccountId) -> Option<String>;

    /// Human-readable names of the roles that still exist, in community order.
    async fn role_names(&self, community: CommunityId, roles: &[RoleId]) -> Vec<String>;

    /// Send a notice to whoever operates the service for this community.
    async fn notify_operators(&self, community: CommunityId, text: &str)
        -> Result<(), PlatformError>;

    /// Mention markup for an account, falling back to the raw mention when the
    /// member has left.
    async fn resolve_mention(&self, community: CommunityId, account: AccountId) -> String {
        self.member_mention(community, account)
            .await
            .unwrap_or_else(|| account.mention())
    }
}
