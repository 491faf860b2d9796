//! Vote resolution: act on a decided vote and retire it.
//!
//! Resolution is terminal. Every step is attempted, failures are logged and
//! swallowed, and the record always leaves the registry at the end, so a
//! vote can never get stuck half-resolved.

use crate::notice::report_missing_permission;
use crate::record::{Outcome, VoteRecord};
use crate::registry::{RetireReason, VoteRegistry};
use crate::spans::resolve_span;
use crate::template::{render_or_fallback, TemplateVars};
use std::sync::Arc;
use tracing::Instrument;
use votegate_platform::{ChatPlatform, ConfigStore, PlatformError};
use votegate_types::config::{DEFAULT_CANCEL_MESSAGE, DEFAULT_SUCCESS_MESSAGE};
use votegate_types::{AccountId, MessageId, VoteConfig};

/// Shown in place of the voter list when none of the voters are still members.
pub const UNKNOWN_VOTERS: &str = "unknown";

/// What resolving a vote actually achieved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub message: MessageId,
    pub candidate: AccountId,
    pub outcome: Outcome,
    /// The target roles were granted to the candidate.
    pub roles_granted: bool,
    /// The outcome message was posted.
    pub announced: bool,
}

pub struct VoteResolver {
    configs: Arc<dyn ConfigStore>,
    platform: Arc<dyn ChatPlatform>,
    registry: Arc<VoteRegistry>,
}

impl VoteResolver {
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

    /// Resolve a vote the caller has already taken out of its slot.
    pub async fn resolve(&self, record: VoteRecord, outcome: Outcome) -> Resolution {
        let span = resolve_span(record.message(), outcome);
        async move {
            let mut resolution = Resolution {
                message: record.message(),
                candidate: record.candidate(),
                outcome,
                roles_granted: false,
                announced: false,
            };

            match self.configs.load_config(record.community()).await {
                Ok(config) => self.carry_out(&record, &config, &mut resolution).await,
                Err(e) => tracing::warn!(
                    error = %e,
                    "settings unavailable, retiring vote without acting on it"
                ),
            }

            let reason = if resolution.announced {
                RetireReason::Resolved(outcome)
            } else {
                RetireReason::Abandoned
            };
            self.registry.retire(record.message(), reason).await;
            tracing::info!(
                candidate = %resolution.candidate,
                roles_granted = resolution.roles_granted,
                announced = resolution.announced,
                "vote resolved"
            );
            resolution
        }
        .instrument(span)
        .await
    }

    async fn carry_out(
        &self,
        record: &VoteRecord,
        config: &VoteConfig,
        resolution: &mut Resolution,
    ) {
        let community = record.community();
        let channel = record.channel();
        let message = record.message();

        for symbol in [&config.positive_symbol, &config.negative_symbol] {
            if let Err(e) = self.platform.clear_reaction(channel, message, symbol).await {
                tracing::debug!(symbol = %symbol, error = %e, "could not clear vote reaction");
            }
        }

        let people = self.deciding_voters(record, resolution.outcome).await;

        if resolution.outcome == Outcome::Succeeded {
            resolution.roles_granted = self.grant(record, config, &people).await;
        }

        let mention = self
            .platform
            .resolve_mention(community, record.candidate())
            .await;
        let roles = self
            .platform
            .role_names(community, &config.roles())
            .await
            .join(", ");
        let (template, fallback) = match resolution.outcome {
            Outcome::Succeeded => (&config.success_message, DEFAULT_SUCCESS_MESSAGE),
            Outcome::Cancelled => (&config.cancel_message, DEFAULT_CANCEL_MESSAGE),
        };
        let text = render_or_fallback(
            template,
            fallback,
            &TemplateVars {
                mention: &mention,
                roles: &roles,
                people: Some(&people),
            },
        );

        match self.platform.post_message(channel, &text).await {
            Ok(_) => resolution.announced = true,
            Err(e) => tracing::warn!(%channel, error = %e, "could not post vote outcome"),
        }
    }

    /// Grant the target roles. Returns whether the grant went through.
    async fn grant(&self, record: &VoteRecord, config: &VoteConfig, people: &str) -> bool {
        let community = record.community();
        let roles = config.roles();
        if roles.is_empty() {
            tracing::warn!(%community, "vote succeeded but no target roles are configured");
            return false;
        }

        match self.platform.can_manage_roles(community).await {
            Ok(true) => {}
            Ok(false) => {
                report_missing_permission(self.platform.as_ref(), community).await;
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not check role permissions");
                return false;
            }
        }

        let reason = format!("Voted in by {people}");
        match self
            .platform
            .grant_roles(community, record.candidate(), &roles, &reason)
            .await
        {
            Ok(()) => true,
            Err(PlatformError::MissingPermission(_)) => {
                report_missing_permission(self.platform.as_ref(), community).await;
                false
            }
            Err(e) => {
                tracing::warn!(candidate = %record.candidate(), error = %e, "role grant failed");
                false
            }
        }
    }

    /// Mentions of the deciding voters who are still members, or
    /// [`UNKNOWN_VOTERS`] if none are.
    async fn deciding_voters(&self, record: &VoteRecord, outcome: Outcome) -> String {
        let mut mentions = Vec::new();
        for voter in record.deciding_voters(outcome) {
            if let Some(mention) = self.platform.member_mention(record.community(), *voter).await
            {
                mentions.push(mention);
            }
        }
        if mentions.is_empty() {
            UNKNOWN_VOTERS.to_string()
        } else {
            mentions.join(", ")
        }
    }
}
