//! Per-community vote settings.
//!
//! The settings live in an external store and are re-read on every event, so
//! an administrator can retune thresholds while votes are still open.

use crate::error::ConfigError;
use crate::{ChannelId, RoleId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_APPROVAL_MESSAGE: &str = "{mention} wants to join the {roles} party";
pub const DEFAULT_SUCCESS_MESSAGE: &str =
    "Voting successful, user {mention} was awarded role {roles} by users {people}";
pub const DEFAULT_CANCEL_MESSAGE: &str = "Voting of {mention} cancelled by users {people}";
pub const DEFAULT_POSITIVE_SYMBOL: &str = "✅";
pub const DEFAULT_NEGATIVE_SYMBOL: &str = "❌";

/// Vote-to-join settings for one community.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteConfig {
    /// Master switch. When off, joins are ignored entirely.
    #[serde(default)]
    pub enabled: bool,

    /// Roles granted on approval (or immediately, without an approval channel).
    #[serde(default)]
    pub target_roles: BTreeSet<RoleId>,

    /// Channel that receives approval posts. Unset means auto-grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_channel: Option<ChannelId>,

    /// Approval post template. Placeholders: `{mention}`, `{roles}`.
    #[serde(default = "default_approval_message")]
    pub approval_message: String,

    #[serde(default = "default_positive_symbol")]
    pub positive_symbol: String,

    /// Positive reactions needed to approve. Must be at least 1.
    #[serde(default = "default_positive_threshold")]
    pub positive_threshold: u32,

    #[serde(default = "default_negative_symbol")]
    pub negative_symbol: String,

    /// Negative reactions needed to cancel. 0 disables the veto.
    #[serde(default)]
    pub negative_threshold: u32,

    /// Posted on approval. Placeholders: `{mention}`, `{roles}`, `{people}`.
    #[serde(default = "default_success_message")]
    pub success_message: String,

    /// Posted on cancellation. Placeholders: `{mention}`, `{roles}`, `{people}`.
    #[serde(default = "default_cancel_message")]
    pub cancel_message: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_approval_message() -> String {
    DEFAULT_APPROVAL_MESSAGE.to_string()
}

fn default_positive_symbol() -> String {
    DEFAULT_POSITIVE_SYMBOL.to_string()
}

fn default_positive_threshold() -> u32 {
    1
}

fn default_negative_symbol() -> String {
    DEFAULT_NEGATIVE_SYMBOL.to_string()
}

fn default_success_message() -> String {
    DEFAULT_SUCCESS_MESSAGE.to_string()
}

fn default_cancel_message() -> String {
    DEFAULT_CANCEL_MESSAGE.to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl VoteConfig {
    /// Whether negative reactions count at all.
    pub fn veto_enabled(&self) -> bool {
        self.negative_threshold > 0
    }

    /// Check the invariants the core relies on.
    ///
    /// Settings operations keep a stored config consistent, but the core may
    /// still observe a half-edited one and must refuse it rather than panic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.positive_threshold == 0 {
            return Err(ConfigError::ZeroPositiveThreshold);
        }
        if self.approval_channel.is_some() && self.target_roles.is_empty() {
            return Err(ConfigError::NoTargetRoles);
        }
        Ok(())
    }

    /// Target roles in ascending id order.
    pub fn roles(&self) -> Vec<RoleId> {
        self.target_roles.iter().copied().collect()
    }
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            target_roles: BTreeSet::new(),
            approval_channel: None,
            approval_message: default_approval_message(),
            positive_symbol: default_positive_symbol(),
            positive_threshold: default_positive_threshold(),
            negative_symbol: default_negative_symbol(),
            negative_threshold: 0,
            success_message: default_success_message(),
            cancel_message: default_cancel_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_fresh_community() {
        let config = VoteConfig::default();
        assert!(!config.enabled);
        assert!(config.target_roles.is_empty());
        assert_eq!(config.approval_channel, None);
        assert_eq!(config.positive_symbol, "✅");
        assert_eq!(config.positive_threshold, 1);
        assert_eq!(config.negative_symbol, "❌");
        assert_eq!(config.negative_threshold, 0);
        assert!(!config.veto_enabled());
    }

    #[test]
    fn empty_toml_table_yields_defaults() {
        let config: VoteConfig = toml::from_str("").unwrap();
        assert_eq!(config, VoteConfig::default());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: VoteConfig = toml::from_str(
            r#"
            enabled = true
            target_roles = [11, 12]
            approval_channel = 500
            positive_threshold = 3
            negative_threshold = 1
            "#,
        )
        .unwrap();
        assert!(config.enabled);
        assert_eq!(config.roles(), vec![RoleId::new(11), RoleId::new(12)]);
        assert_eq!(config.approval_channel, Some(ChannelId::new(500)));
        assert!(config.veto_enabled());
        assert_eq!(config.approval_message, DEFAULT_APPROVAL_MESSAGE);
    }

    #[test]
    fn zero_positive_threshold_is_invalid() {
        let config = VoteConfig {
            positive_threshold: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPositiveThreshold));
    }

    #[test]
    fn approval_channel_without_roles_is_invalid() {
        let config = VoteConfig {
            approval_channel: Some(ChannelId::new(1)),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoTargetRoles));
    }

    #[test]
    fn auto_grant_config_without_channel_is_valid() {
        let mut config = VoteConfig::default();
        config.target_roles.insert(RoleId::new(3));
        assert_eq!(config.validate(), Ok(()));
    }
}
