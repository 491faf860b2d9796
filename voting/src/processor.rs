//! Reaction processing: tally reactions on approval posts and detect
//! threshold crossings.
//!
//! Thresholds are evaluated on every add; nothing is polled. The
//! whole read-modify-check-resolve sequence for one vote runs under that
//! vote's slot lock, and the record is taken out of the slot before it is
//! resolved, so a vote resolves at most once no matter how events race.

use crate::error::VoteError;
use crate::record::{Tally, VoteRecord};
use crate::registry::VoteRegistry;
use crate::resolver::{Resolution, VoteResolver};
use std::sync::Arc;
use votegate_platform::{ChatPlatform, ConfigStore};
use votegate_types::ReactionEvent;

/// Why a reaction event had no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The bot's own reaction (e.g. the ones it attaches to approval posts).
    OwnReaction,
    /// The message carries no open vote.
    Untracked,
    /// The vote was resolved while this event waited for it.
    Retired,
}

/// What a reaction event led to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReactionOutcome {
    Ignored(IgnoreReason),
    /// The vote is still open; current counts.
    Counted(Tally),
    Resolved(Resolution),
}

pub struct ReactionEventProcessor {
    configs: Arc<dyn ConfigStore>,
    platform: Arc<dyn ChatPlatform>,
    registry: Arc<VoteRegistry>,
    resolver: VoteResolver,
}

impl ReactionEventProcessor {
    pub fn new(
        configs: Arc<dyn ConfigStore>,
        platform: Arc<dyn ChatPlatform>,
        registry: Arc<VoteRegistry>,
    ) -> Self {
        let resolver = VoteResolver::new(configs.clone(), platform.clone(), registry.clone());
        Self {
            configs,
            platform,
            registry,
            resolver,
        }
    }

    /// Handle a reaction being added.
    ///
    /// Errors (settings unavailable or invalid) abort only this event; the
    /// vote stays open and untouched.
    pub async fn on_reaction_added(
        &self,
        event: &ReactionEvent,
    ) -> Result<ReactionOutcome, VoteError> {
        if event.account == self.platform.bot_account() {
            return Ok(ReactionOutcome::Ignored(IgnoreReason::OwnReaction));
        }
        let Some(slot) = self.registry.get(event.message).await else {
            return Ok(ReactionOutcome::Ignored(IgnoreReason::Untracked));
        };

        let mut guard = slot.lock().await;
        let Some(record) = guard.as_mut() else {
            return Ok(ReactionOutcome::Ignored(IgnoreReason::Retired));
        };

        // Live settings: thresholds may have been retuned since the vote opened.
        let config = self.configs.load_config(event.community).await?;
        config.validate()?;

        // Any add re-checks the live thresholds, even one that casts nothing.
        match VoteRecord::ballot_for(&config, &event.symbol) {
            Some(ballot) => {
                if !record.cast(ballot, event.account) {
                    tracing::debug!(
                        account = %event.account,
                        "duplicate reaction, already counted"
                    );
                }
            }
            None => tracing::debug!(symbol = %event.symbol, "reaction is not a ballot"),
        }

        let Some(outcome) = record.evaluate(&config) else {
            let tally = record.tally();
            tracing::debug!(positive = tally.positive, negative = tally.negative, "vote counted");
            return Ok(ReactionOutcome::Counted(tally));
        };

        // Retire under the lock: anyone queued on this slot now finds it empty.
        let Some(record) = guard.take() else {
            return Ok(ReactionOutcome::Ignored(IgnoreReason::Retired));
        };
        let resolution = self.resolver.resolve(record, outcome).await;
        Ok(ReactionOutcome::Resolved(resolution))
    }

    /// Handle a reaction being removed. Never resolves a vote.
    pub async fn on_reaction_removed(
        &self,
        event: &ReactionEvent,
    ) -> Result<ReactionOutcome, VoteError> {
        if event.account == self.platform.bot_account() {
            return Ok(ReactionOutcome::Ignored(IgnoreReason::OwnReaction));
        }
        let Some(slot) = self.registry.get(event.message).await else {
            return Ok(ReactionOutcome::Ignored(IgnoreReason::Untracked));
        };

        let mut guard = slot.lock().await;
        let Some(record) = guard.as_mut() else {
            return Ok(ReactionOutcome::Ignored(IgnoreReason::Retired));
        };

        let config = self.configs.load_config(event.community).await?;
        if !record.retract(&config, &event.symbol, event.account) {
            tracing::debug!(account = %event.account, "reaction removal changed nothing");
        }
        Ok(ReactionOutcome::Counted(record.tally()))
    }
}
