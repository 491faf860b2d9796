//! A chat platform that performs nothing and logs every outbound action.
//!
//! Used by `replay` to dry-run recorded gateway events against real settings.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use votegate_platform::{ChatPlatform, PlatformError};
use votegate_types::{AccountId, ChannelId, CommunityId, MessageId, RoleId};

/// Id of the first message the console platform "posts". Recorded reaction
/// events refer to approval posts by these ids.
pub const FIRST_MESSAGE_ID: u64 = 1;

pub struct ConsolePlatform {
    bot: AccountId,
    next_message: AtomicU64,
}

impl ConsolePlatform {
    pub fn new(bot: AccountId) -> Self {
        Self {
            bot,
            next_message: AtomicU64::new(FIRST_MESSAGE_ID),
        }
    }
}

#[async_trait]
impl ChatPlatform for ConsolePlatform {
    fn bot_account(&self) -> AccountId {
        self.bot
    }

    async fn can_manage_roles(&self, _community: CommunityId) -> Result<bool, PlatformError> {
        Ok(true)
    }

    async fn post_message(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> Result<MessageId, PlatformError> {
        let id = MessageId::new(self.next_message.fetch_add(1, Ordering::Relaxed));
        tracing::info!(%channel, message = %id, "post: {text}");
        Ok(id)
    }

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), PlatformError> {
        tracing::info!(%channel, %message, symbol, "add reaction");
        Ok(())
    }

    async fn clear_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), PlatformError> {
        tracing::info!(%channel, %message, symbol, "clear reaction");
        Ok(())
    }

    async fn grant_roles(
        &self,
        community: CommunityId,
        account: AccountId,
        roles: &[RoleId],
        reason: &str,
    ) -> Result<(), PlatformError> {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        tracing::info!(%community, %account, roles = %roles.join(","), reason, "grant roles");
        Ok(())
    }

    async fn member_mention(&self, _community: CommunityId, account: AccountId) -> Option<String> {
        Some(account.mention())
    }

    async fn role_names(&self, _community: CommunityId, roles: &[RoleId]) -> Vec<String> {
        roles.iter().map(|r| r.mention()).collect()
    }

    async fn notify_operators(
        &self,
        community: CommunityId,
        text: &str,
    ) -> Result<(), PlatformError> {
        tracing::warn!(%community, "operator notice: {text}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn message_ids_are_sequential() {
        let platform = ConsolePlatform::new(AccountId::new(7));
        let first = platform.post_message(ChannelId::new(1), "a").await.unwrap();
        let second = platform.post_message(ChannelId::new(1), "b").await.unwrap();
        assert_eq!(first, MessageId::new(FIRST_MESSAGE_ID));
        assert_eq!(second, MessageId::new(FIRST_MESSAGE_ID + 1));
        assert_eq!(platform.bot_account(), AccountId::new(7));
    }

    #[tokio::test]
    async fn names_render_as_mentions() {
        let platform = ConsolePlatform::new(AccountId::new(7));
        let community = CommunityId::new(1);
        assert_eq!(
            platform.role_names(community, &[RoleId::new(42)]).await,
            vec!["<@&42>".to_string()]
        );
        assert_eq!(
            platform.resolve_mention(community, AccountId::new(9)).await,
            "<@9>"
        );
    }
}
