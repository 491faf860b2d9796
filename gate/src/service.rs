//! Gateway event dispatch.
//!
//! Each inbound [`GatewayEvent`] is handled on its own task, bounded by a
//! semaphore. Reactions on the same vote serialize on that vote's slot in the
//! registry; everything else runs freely in parallel.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::Instrument;

use votegate_platform::{ChatPlatform, ConfigStore};
use votegate_types::GatewayEvent;
use votegate_utils::StatsCounter;

use crate::StopReceiver;
use votegate_voting::spans::{join_span, reaction_span};
use votegate_voting::{
    JoinHandler, JoinOutcome, Outcome, ReactionEventProcessor, ReactionOutcome, VoteError,
    VoteRegistry,
};

/// Counter names tracked by [`GateService::stats`].
pub const STAT_NAMES: &[&str] = &[
    "joins",
    "votes_opened",
    "auto_grants",
    "votes_approved",
    "votes_cancelled",
    "reactions_counted",
    "events_ignored",
    "events_failed",
];

/// Result of handling one gateway event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Join(JoinOutcome),
    Reaction(ReactionOutcome),
}

pub struct GateService {
    joins: JoinHandler,
    reactions: ReactionEventProcessor,
    registry: Arc<VoteRegistry>,
    semaphore: Arc<Semaphore>,
    stats: StatsCounter,
}

impl GateService {
    pub fn new(
        configs: Arc<dyn ConfigStore>,
        platform: Arc<dyn ChatPlatform>,
        max_concurrent_events: usize,
    ) -> Self {
        let registry = Arc::new(VoteRegistry::new());
        Self {
            joins: JoinHandler::new(configs.clone(), platform.clone(), registry.clone()),
            reactions: ReactionEventProcessor::new(configs, platform, registry.clone()),
            registry,
            semaphore: Arc::new(Semaphore::new(max_concurrent_events.max(1))),
            stats: StatsCounter::new(STAT_NAMES),
        }
    }

    pub fn registry(&self) -> &Arc<VoteRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> &StatsCounter {
        &self.stats
    }

    /// Handle a single event to completion.
    ///
    /// Failures are logged and counted here; callers that only need the side
    /// effects can drop the result.
    pub async fn handle(&self, event: &GatewayEvent) -> Result<EventOutcome, VoteError> {
        let result = match event {
            GatewayEvent::MemberJoined { community, account } => {
                self.stats.increment("joins");
                self.joins
                    .on_member_joined(*community, *account)
                    .instrument(join_span(*community, *account))
                    .await
                    .map(EventOutcome::Join)
            }
            GatewayEvent::ReactionAdded(reaction) => self
                .reactions
                .on_reaction_added(reaction)
                .instrument(reaction_span("added", reaction.message, reaction.account))
                .await
                .map(EventOutcome::Reaction),
            GatewayEvent::ReactionRemoved(reaction) => self
                .reactions
                .on_reaction_removed(reaction)
                .instrument(reaction_span("removed", reaction.message, reaction.account))
                .await
                .map(EventOutcome::Reaction),
        };

        match &result {
            Ok(outcome) => self.record(outcome),
            Err(e) => {
                self.stats.increment("events_failed");
                log_failure(event, e);
            }
        }
        result
    }

    fn record(&self, outcome: &EventOutcome) {
        let name = match outcome {
            EventOutcome::Join(JoinOutcome::Disabled) => "events_ignored",
            EventOutcome::Join(JoinOutcome::AutoGranted { .. }) => "auto_grants",
            EventOutcome::Join(JoinOutcome::VoteOpened { .. }) => "votes_opened",
            EventOutcome::Reaction(ReactionOutcome::Ignored(_)) => "events_ignored",
            EventOutcome::Reaction(ReactionOutcome::Counted(_)) => "reactions_counted",
            EventOutcome::Reaction(ReactionOutcome::Resolved(resolution)) => {
                match resolution.outcome {
                    Outcome::Succeeded => "votes_approved",
                    Outcome::Cancelled => "votes_cancelled",
                }
            }
        };
        self.stats.increment(name);
    }

    /// Consume events until the channel closes or `stop` trips, then wait for
    /// in-flight events to finish. A trip wins over events already queued.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<GatewayEvent>,
        mut stop: StopReceiver,
    ) {
        let mut tasks = JoinSet::new();

        loop {
            let event = tokio::select! {
                biased;
                _ = stop.tripped() => break,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => {
                        tracing::debug!("event channel closed");
                        break;
                    }
                },
            };

            // Acquired before spawning, so with one permit events are handled
            // strictly in arrival order.
            let permit = match self.semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let service = Arc::clone(&self);
            tasks.spawn(async move {
                let _permit = permit;
                let _ = service.handle(&event).await;
            });

            while let Some(finished) = tasks.try_join_next() {
                if let Err(e) = finished {
                    tracing::error!("event task panicked: {e}");
                }
            }
        }

        let in_flight = tasks.len();
        if in_flight > 0 {
            tracing::info!(in_flight, "waiting for in-flight events");
        }
        while let Some(finished) = tasks.join_next().await {
            if let Err(e) = finished {
                tracing::error!("event task panicked: {e}");
            }
        }
        tracing::info!(stats = ?self.stats.snapshot(), "event loop stopped");
    }
}

fn log_failure(event: &GatewayEvent, error: &VoteError) {
    let community = event.community();
    let kind = event.kind();
    match error {
        VoteError::NotFound(_) => tracing::debug!(%community, kind, "{error}"),
        VoteError::Config(_) => {
            tracing::info!(%community, kind, "settings rejected event: {error}")
        }
        VoteError::MissingPermission(_) | VoteError::Delivery(_) => {
            tracing::warn!(%community, kind, "{error}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StopSignal;
    use std::collections::BTreeSet;
    use votegate_nullables::{NullConfigStore, NullPlatform};
    use votegate_types::{
        AccountId, ChannelId, CommunityId, MessageId, ReactionEvent, RoleId, VoteConfig,
    };

    const COMMUNITY: CommunityId = CommunityId::new(1);
    const BOT: AccountId = AccountId::new(1);
    const CANDIDATE: AccountId = AccountId::new(50);

    fn vote_config() -> VoteConfig {
        VoteConfig {
            enabled: true,
            target_roles: BTreeSet::from([RoleId::new(42)]),
            approval_channel: Some(ChannelId::new(500)),
            positive_threshold: 2,
            negative_threshold: 1,
            ..Default::default()
        }
    }

    fn service(config: VoteConfig, max_concurrent: usize) -> (Arc<GateService>, Arc<NullPlatform>) {
        let configs = Arc::new(NullConfigStore::new().with(COMMUNITY, config));
        let platform = Arc::new(NullPlatform::new(BOT));
        let service = Arc::new(GateService::new(configs, platform.clone(), max_concurrent));
        (service, platform)
    }

    fn joined() -> GatewayEvent {
        GatewayEvent::MemberJoined {
            community: COMMUNITY,
            account: CANDIDATE,
        }
    }

    fn added(message: MessageId, account: u64, symbol: &str) -> GatewayEvent {
        GatewayEvent::ReactionAdded(ReactionEvent {
            community: COMMUNITY,
            message,
            account: AccountId::new(account),
            symbol: symbol.to_string(),
        })
    }

    #[tokio::test]
    async fn handle_routes_events_and_counts_outcomes() {
        let (service, platform) = service(vote_config(), 4);

        let outcome = service.handle(&joined()).await.unwrap();
        let EventOutcome::Join(JoinOutcome::VoteOpened { message, .. }) = outcome else {
            panic!("expected a vote, got {outcome:?}");
        };

        service.handle(&added(message, 60, "✅")).await.unwrap();
        service.handle(&added(message, BOT.get(), "✅")).await.unwrap();
        service.handle(&added(message, 61, "✅")).await.unwrap();

        assert_eq!(platform.grants().len(), 1);
        assert!(service.registry().is_empty().await);
        let stats = service.stats();
        assert_eq!(stats.get("joins"), 1);
        assert_eq!(stats.get("votes_opened"), 1);
        assert_eq!(stats.get("reactions_counted"), 1);
        assert_eq!(stats.get("events_ignored"), 1);
        assert_eq!(stats.get("votes_approved"), 1);
    }

    #[tokio::test]
    async fn failures_are_counted() {
        let config = VoteConfig {
            target_roles: BTreeSet::new(),
            ..vote_config()
        };
        let (service, platform) = service(config, 4);

        let err = service.handle(&joined()).await.unwrap_err();
        assert!(matches!(err, VoteError::Config(_)));
        assert_eq!(service.stats().get("events_failed"), 1);
        assert!(platform.posts().is_empty());
    }

    #[tokio::test]
    async fn sequential_run_handles_events_in_order() {
        let (service, platform) = service(vote_config(), 1);
        let (tx, rx) = mpsc::channel(16);
        let stop = StopSignal::new();

        // The first approval post gets the null platform's first message id.
        let message = MessageId::new(10_000);
        tx.send(joined()).await.unwrap();
        tx.send(added(message, 60, "❌")).await.unwrap();
        drop(tx);

        service.clone().run(rx, stop.receiver()).await;

        assert_eq!(service.stats().get("votes_cancelled"), 1);
        assert!(platform.grants().is_empty());
        assert_eq!(platform.posts().len(), 2);
        assert!(service.registry().is_empty().await);
    }

    #[tokio::test]
    async fn tripped_stop_ends_the_loop() {
        let (service, platform) = service(vote_config(), 4);
        let (tx, rx) = mpsc::channel(16);
        let stop = StopSignal::new();
        let receiver = stop.receiver();

        let handle = tokio::spawn(service.clone().run(rx, receiver));
        stop.trip("test");
        handle.await.unwrap();

        // The sender is still alive; only the stop ended the loop.
        assert!(tx.is_closed());
        assert!(platform.posts().is_empty());
    }

    #[tokio::test]
    async fn stop_tripped_before_start_drops_queued_events() {
        let (service, platform) = service(vote_config(), 4);
        let (tx, rx) = mpsc::channel(16);
        tx.send(joined()).await.unwrap();
        let stop = StopSignal::new();
        stop.trip("test");

        service.clone().run(rx, stop.receiver()).await;

        assert_eq!(service.stats().get("joins"), 0);
        assert!(platform.posts().is_empty());
    }
}
