//! Administrator settings operations.
//!
//! Each operation loads the community's settings, checks its preconditions,
//! saves the change and returns the confirmation to show the administrator.
//! Parsing the administrator's command is the caller's business.

use crate::error::VoteError;
use std::sync::Arc;
use votegate_platform::{ChatPlatform, ConfigStore};
use votegate_types::config::{
    DEFAULT_APPROVAL_MESSAGE, DEFAULT_CANCEL_MESSAGE, DEFAULT_NEGATIVE_SYMBOL,
    DEFAULT_POSITIVE_SYMBOL, DEFAULT_SUCCESS_MESSAGE,
};
use votegate_types::{ChannelId, CommunityId, ConfigError, RoleId, VoteConfig};

/// Everything `setup` configures in one go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteSetup {
    pub channel: ChannelId,
    pub positive_symbol: String,
    pub positive_threshold: u32,
    pub negative_symbol: String,
    pub negative_threshold: u32,
    pub approval_message: String,
}

impl VoteSetup {
    /// Setup defaults: three approvals, one veto.
    pub fn new(channel: ChannelId) -> Self {
        Self {
            channel,
            positive_symbol: DEFAULT_POSITIVE_SYMBOL.to_string(),
            positive_threshold: 3,
            negative_symbol: DEFAULT_NEGATIVE_SYMBOL.to_string(),
            negative_threshold: 1,
            approval_message: DEFAULT_APPROVAL_MESSAGE.to_string(),
        }
    }
}

pub struct SettingsEditor {
    configs: Arc<dyn ConfigStore>,
    platform: Arc<dyn ChatPlatform>,
}

impl SettingsEditor {
    pub fn new(configs: Arc<dyn ConfigStore>, platform: Arc<dyn ChatPlatform>) -> Self {
        Self { configs, platform }
    }

    /// Switch votemember on or off. Switching on requires at least one role.
    pub async fn toggle(&self, community: CommunityId) -> Result<String, VoteError> {
        let mut config = self.configs.load_config(community).await?;
        if !config.enabled && config.target_roles.is_empty() {
            return Err(ConfigError::NoTargetRoles.into());
        }
        config.enabled = !config.enabled;
        self.configs.save_config(community, &config).await?;
        Ok(if config.enabled {
            "Votemember is now enabled.".to_string()
        } else {
            "Votemember is now disabled.".to_string()
        })
    }

    pub async fn add_role(
        &self,
        community: CommunityId,
        role: RoleId,
    ) -> Result<String, VoteError> {
        let mut config = self.configs.load_config(community).await?;
        if !config.target_roles.insert(role) {
            return Err(ConfigError::RoleAlreadyListed(role).into());
        }
        self.configs.save_config(community, &config).await?;
        Ok(format!("{} role added to the votemember.", self.role_name(community, role).await))
    }

    pub async fn remove_role(
        &self,
        community: CommunityId,
        role: RoleId,
    ) -> Result<String, VoteError> {
        let mut config = self.configs.load_config(community).await?;
        if !config.target_roles.remove(&role) {
            return Err(ConfigError::RoleNotListed(role).into());
        }
        self.configs.save_config(community, &config).await?;
        Ok(format!(
            "{} role removed from the votemember.",
            self.role_name(community, role).await
        ))
    }

    /// Set the approval channel, or clear it to switch to auto-grant.
    pub async fn set_channel(
        &self,
        community: CommunityId,
        channel: Option<ChannelId>,
    ) -> Result<String, VoteError> {
        let mut config = self.editable(community).await?;
        config.approval_channel = channel;
        self.configs.save_config(community, &config).await?;
        Ok(match channel {
            Some(channel) => format!("Agreement channel set to {}", channel.mention()),
            None => "Agreement channel cleared".to_string(),
        })
    }

    /// Set the approval post template, or restore the default.
    pub async fn set_approval_message(
        &self,
        community: CommunityId,
        message: Option<String>,
    ) -> Result<String, VoteError> {
        let mut config = self.editable(community).await?;
        let reply = match &message {
            Some(m) => format!("Agreement message set to {m}"),
            None => "Agreement message cleared".to_string(),
        };
        config.approval_message = message.unwrap_or_else(|| DEFAULT_APPROVAL_MESSAGE.to_string());
        self.configs.save_config(community, &config).await?;
        Ok(reply)
    }

    /// Configure the whole vote at once, or with `None` reset everything but
    /// the target roles and disable votemember.
    pub async fn setup(
        &self,
        community: CommunityId,
        setup: Option<VoteSetup>,
    ) -> Result<String, VoteError> {
        let config = self.editable(community).await?;
        let Some(setup) = setup else {
            let reset = VoteConfig {
                target_roles: config.target_roles,
                ..Default::default()
            };
            self.configs.save_config(community, &reset).await?;
            return Ok("Settings cleared and votemember disabled".to_string());
        };

        if setup.positive_threshold == 0 {
            return Err(ConfigError::ZeroPositiveThreshold.into());
        }
        let updated = VoteConfig {
            approval_channel: Some(setup.channel),
            approval_message: setup.approval_message,
            positive_symbol: setup.positive_symbol,
            positive_threshold: setup.positive_threshold,
            negative_symbol: setup.negative_symbol,
            negative_threshold: setup.negative_threshold,
            ..config
        };
        self.configs.save_config(community, &updated).await?;
        Ok(format!("Agreement channel set to {}", setup.channel.mention()))
    }

    pub async fn set_success_message(
        &self,
        community: CommunityId,
        message: Option<String>,
    ) -> Result<String, VoteError> {
        let mut config = self.configs.load_config(community).await?;
        config.success_message = message.unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string());
        self.configs.save_config(community, &config).await?;
        Ok(format!("Succeeded message set to {}", config.success_message))
    }

    pub async fn set_cancel_message(
        &self,
        community: CommunityId,
        message: Option<String>,
    ) -> Result<String, VoteError> {
        let mut config = self.configs.load_config(community).await?;
        config.cancel_message = message.unwrap_or_else(|| DEFAULT_CANCEL_MESSAGE.to_string());
        self.configs.save_config(community, &config).await?;
        Ok(format!("Cancelled message set to {}", config.cancel_message))
    }

    /// Plain-text description of the current settings.
    pub async fn summary(&self, community: CommunityId) -> Result<String, VoteError> {
        let config = self.configs.load_config(community).await?;
        let roles = self
            .platform
            .role_names(community, &config.roles())
            .await
            .join(", ");
        let roles = if roles.is_empty() { "None".to_string() } else { roles };
        let channel = config
            .approval_channel
            .map(|c| c.mention())
            .unwrap_or_else(|| "None".to_string());

        Ok(format!(
            "Current votemember state: {}\n\
             Current Roles: {}\n\
             Agreement message: {}\n\
             Positive react: {}\n\
             Positive needed: {}\n\
             Negative react: {}\n\
             Negative needed: {}\n\
             Agreement channel: {}\n\
             Succeeded msg: {}\n\
             Cancelled msg: {}",
            config.enabled,
            roles,
            config.approval_message,
            config.positive_symbol,
            config.positive_threshold,
            config.negative_symbol,
            config.negative_threshold,
            channel,
            config.success_message,
            config.cancel_message,
        ))
    }

    /// Settings for the operations that only make sense on an enabled,
    /// role-bearing configuration.
    async fn editable(&self, community: CommunityId) -> Result<VoteConfig, VoteError> {
        let config = self.configs.load_config(community).await?;
        if config.target_roles.is_empty() {
            return Err(ConfigError::NoTargetRoles.into());
        }
        if !config.enabled {
            return Err(ConfigError::Disabled.into());
        }
        Ok(config)
    }

    async fn role_name(&self, community: CommunityId, role: RoleId) -> String {
        self.platform
            .role_names(community, &[role])
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| role.mention())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votegate_nullables::{NullConfigStore, NullPlatform};

    const COMMUNITY: CommunityId = CommunityId::new(1);
    const ROLE: RoleId = RoleId::new(42);

    fn editor() -> (Arc<NullConfigStore>, SettingsEditor) {
        let store = Arc::new(NullConfigStore::new());
        let platform = Arc::new(NullPlatform::default());
        platform.name_role(ROLE, "@Members");
        let editor = SettingsEditor::new(store.clone(), platform);
        (store, editor)
    }

    #[tokio::test]
    async fn enabling_requires_a_role() {
        let (store, editor) = editor();
        let err = editor.toggle(COMMUNITY).await.unwrap_err();
        assert_eq!(err.to_string(), "No roles have been set for votemember.");
        assert!(!store.get(COMMUNITY).enabled);

        editor.add_role(COMMUNITY, ROLE).await.unwrap();
        assert_eq!(editor.toggle(COMMUNITY).await.unwrap(), "Votemember is now enabled.");
        assert_eq!(editor.toggle(COMMUNITY).await.unwrap(), "Votemember is now disabled.");
    }

    #[tokio::test]
    async fn roles_are_added_once_and_removed_once() {
        let (store, editor) = editor();
        assert_eq!(
            editor.add_role(COMMUNITY, ROLE).await.unwrap(),
            "@Members role added to the votemember."
        );
        assert!(matches!(
            editor.add_role(COMMUNITY, ROLE).await,
            Err(VoteError::Config(ConfigError::RoleAlreadyListed(_)))
        ));
        editor.remove_role(COMMUNITY, ROLE).await.unwrap();
        assert!(store.get(COMMUNITY).target_roles.is_empty());
        assert!(matches!(
            editor.remove_role(COMMUNITY, ROLE).await,
            Err(VoteError::Config(ConfigError::RoleNotListed(_)))
        ));
    }

    #[tokio::test]
    async fn channel_requires_enabled_votemember() {
        let (store, editor) = editor();
        editor.add_role(COMMUNITY, ROLE).await.unwrap();
        assert!(matches!(
            editor.set_channel(COMMUNITY, Some(ChannelId::new(9))).await,
            Err(VoteError::Config(ConfigError::Disabled))
        ));

        editor.toggle(COMMUNITY).await.unwrap();
        editor
            .set_channel(COMMUNITY, Some(ChannelId::new(9)))
            .await
            .unwrap();
        assert_eq!(store.get(COMMUNITY).approval_channel, Some(ChannelId::new(9)));

        assert_eq!(
            editor.set_channel(COMMUNITY, None).await.unwrap(),
            "Agreement channel cleared"
        );
        assert_eq!(store.get(COMMUNITY).approval_channel, None);
    }

    #[tokio::test]
    async fn setup_applies_defaults_and_reset_keeps_roles() {
        let (store, editor) = editor();
        editor.add_role(COMMUNITY, ROLE).await.unwrap();
        editor.toggle(COMMUNITY).await.unwrap();

        editor
            .setup(COMMUNITY, Some(VoteSetup::new(ChannelId::new(9))))
            .await
            .unwrap();
        let config = store.get(COMMUNITY);
        assert_eq!(config.positive_threshold, 3);
        assert_eq!(config.negative_threshold, 1);
        assert!(config.enabled);

        editor.setup(COMMUNITY, None).await.unwrap();
        let config = store.get(COMMUNITY);
        assert!(!config.enabled);
        assert_eq!(config.approval_channel, None);
        assert!(config.target_roles.contains(&ROLE));
    }

    #[tokio::test]
    async fn setup_rejects_zero_threshold() {
        let (_, editor) = editor();
        editor.add_role(COMMUNITY, ROLE).await.unwrap();
        editor.toggle(COMMUNITY).await.unwrap();
        let setup = VoteSetup {
            positive_threshold: 0,
            ..VoteSetup::new(ChannelId::new(9))
        };
        assert!(matches!(
            editor.setup(COMMUNITY, Some(setup)).await,
            Err(VoteError::Config(ConfigError::ZeroPositiveThreshold))
        ));
    }

    #[tokio::test]
    async fn outcome_messages_reset_to_defaults() {
        let (store, editor) = editor();
        editor
            .set_success_message(COMMUNITY, Some("yay {mention}".into()))
            .await
            .unwrap();
        assert_eq!(store.get(COMMUNITY).success_message, "yay {mention}");
        editor.set_success_message(COMMUNITY, None).await.unwrap();
        assert_eq!(store.get(COMMUNITY).success_message, DEFAULT_SUCCESS_MESSAGE);

        editor
            .set_cancel_message(COMMUNITY, Some("nay {mention}".into()))
            .await
            .unwrap();
        assert_eq!(store.get(COMMUNITY).cancel_message, "nay {mention}");
    }

    #[tokio::test]
    async fn summary_lists_settings() {
        let (_, editor) = editor();
        let text = editor.summary(COMMUNITY).await.unwrap();
        assert!(text.contains("Current votemember state: false"));
        assert!(text.contains("Current Roles: None"));
        assert!(text.contains("Agreement channel: None"));

        editor.add_role(COMMUNITY, ROLE).await.unwrap();
        let text = editor.summary(COMMUNITY).await.unwrap();
        assert!(text.contains("Current Roles: @Members"));
    }
}
