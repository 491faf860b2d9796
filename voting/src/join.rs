//! Join handling: auto-grant or open a vote for each new member.

use crate::error::VoteError;
use crate::notice::report_missing_permission;
use crate::record::VoteRecord;
use crate::registry::VoteRegistry;
use crate::template::{render_or_fallback, TemplateVars};
use std::sync::Arc;
use votegate_platform::{ChatPlatform, ConfigStore, PlatformError};
use votegate_types::config::DEFAULT_APPROVAL_MESSAGE;
use votegate_types::{
    AccountId, ChannelId, CommunityId, ConfigError, MessageId, RoleId, VoteConfig,
};

/// Audit-log reason attached to roles granted without a vote.
pub const AUTO_GRANT_REASON: &str = "Joined the server";

/// What a member join led to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Votemember is switched off for the community.
    Disabled,
    /// No approval channel: the roles were granted immediately.
    AutoGranted { roles: Vec<RoleId> },
    /// An approval post went up and a vote is now open on it.
    VoteOpened {
        message: MessageId,
        channel: ChannelId,
    },
}

pub struct JoinHandler {
    configs: Arc<dyn ConfigStore>,
    platform: Arc<dyn ChatPlatform>,
    registry: Arc<VoteRegistry>,
}

impl JoinHandler {
    pub fn new(
        configs: Arc<dyn ConfigStore>,
        platform: Arc<dyn ChatPlatform>,
        registry: Arc<VoteRegistry>,
    ) -> Self {
        Self {
            configs,
            platform,
            registry,
        }
    }

    /// Handle a member joining a community.
    ///
    /// On error nothing has been registered; a failed approval post leaves no
    /// vote behind.
    pub async fn on_member_joined(
        &self,
        community: CommunityId,
        account: AccountId,
    ) -> Result<JoinOutcome, VoteError> {
        let config = self.configs.load_config(community).await?;
        if !config.enabled {
            tracing::debug!(%community, "votemember disabled, ignoring join");
            return Ok(JoinOutcome::Disabled);
        }

        match config.approval_channel {
            None => self.auto_grant(community, account, &config).await,
            Some(channel) => self.open_vote(community, account, channel, &config).await,
        }
    }

    async fn auto_grant(
        &self,
        community: CommunityId,
        account: AccountId,
        config: &VoteConfig,
    ) -> Result<JoinOutcome, VoteError> {
        if config.target_roles.is_empty() {
            return Err(ConfigError::NoTargetRoles.into());
        }
        if !self.platform.can_manage_roles(community).await? {
            report_missing_permission(self.platform.as_ref(), community).await;
            return Err(VoteError::MissingPermission("manage roles".into()));
        }

        let roles = config.roles();
        match self
            .platform
            .grant_roles(community, account, &roles, AUTO_GRANT_REASON)
            .await
        {
            Ok(()) => {}
            Err(PlatformError::MissingPermission(msg)) => {
                report_missing_permission(self.platform.as_ref(), community).await;
                return Err(VoteError::MissingPermission(msg));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(%community, %account, roles = roles.len(), "roles granted on join");
        Ok(JoinOutcome::AutoGranted { roles })
    }

    async fn open_vote(
        &self,
        community: CommunityId,
        account: AccountId,
        channel: ChannelId,
        config: &VoteConfig,
    ) -> Result<JoinOutcome, VoteError> {
        config.validate()?;

        let mention = self.platform.resolve_mention(community, account).await;
        let roles = self
            .platform
            .role_names(community, &config.roles())
            .await
            .join(", ");
        let text = render_or_fallback(
            &config.approval_message,
            DEFAULT_APPROVAL_MESSAGE,
            &TemplateVars {
                mention: &mention,
                roles: &roles,
                people: None,
            },
        );

        let message = self.platform.post_message(channel, &text).await?;

        let mut symbols = vec![config.positive_symbol.as_str()];
        if config.veto_enabled() {
            symbols.push(config.negative_symbol.as_str());
        }
        for symbol in symbols {
            if let Err(e) = self.platform.add_reaction(channel, message, symbol).await {
                tracing::warn!(
                    %community, %message, symbol, error = %e,
                    "could not attach vote reaction, approval post left untracked"
                );
                return Err(e.into());
            }
        }

        self.registry
            .open(VoteRecord::new(message, channel, community, account))
            .await;
        tracing::info!(%community, %account, %message, "vote opened");
        Ok(JoinOutcome::VoteOpened { message, channel })
    }
}
