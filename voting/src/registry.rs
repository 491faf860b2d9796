//! Vote registry: every open vote, keyed by approval post.
//!
//! The registry owns all [`VoteRecord`]s. Each record sits in its own slot
//! behind an async mutex, so events for different votes proceed in parallel
//! while events for the same vote are serialized. A slot whose record has
//! been taken out is retired: tasks that fetched the slot before it was
//! unlinked find it empty and back off.
//!
//! Records never linger: resolution always unlinks the slot, whether or not
//! the outcome could be delivered.

use crate::record::{Outcome, VoteRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use votegate_types::MessageId;

/// A record's slot. `None` once the vote has been retired.
pub type VoteSlot = Arc<Mutex<Option<VoteRecord>>>;

/// Why a record left the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetireReason {
    Resolved(Outcome),
    /// The approval post became unusable while the vote was being resolved,
    /// so the outcome could not be announced.
    Abandoned,
}

pub struct VoteRegistry {
    votes: Mutex<HashMap<MessageId, VoteSlot>>,
}

impl VoteRegistry {
    pub fn new() -> Self {
        Self {
            votes: Mutex::new(HashMap::new()),
        }
    }

    /// Start tracking a vote under its approval post's id.
    ///
    /// Message ids are unique per post, so an existing entry is only replaced
    /// if the platform reused an id; that is logged and the old vote dropped.
    pub async fn open(&self, record: VoteRecord) {
        let message = record.message();
        let mut votes = self.votes.lock().await;
        if votes
            .insert(message, Arc::new(Mutex::new(Some(record))))
            .is_some()
        {
            tracing::warn!(%message, "replaced an open vote with the same message id");
        }
    }

    /// Slot for a tracked message, or `None` if the message carries no vote.
    pub async fn get(&self, message: MessageId) -> Option<VoteSlot> {
        self.votes.lock().await.get(&message).cloned()
    }

    /// Stop tracking a message. Returns `false` if it was not tracked.
    ///
    /// Callers resolving a vote take the record out of its slot first (under
    /// the slot lock) and then unlink the slot here.
    pub async fn retire(&self, message: MessageId, reason: RetireReason) -> bool {
        let removed = self.votes.lock().await.remove(&message).is_some();
        if removed {
            tracing::debug!(%message, ?reason, "vote retired");
        }
        removed
    }

    pub async fn contains(&self, message: MessageId) -> bool {
        self.votes.lock().await.contains_key(&message)
    }

    /// Number of open votes.
    pub async fn len(&self) -> usize {
        self.votes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.votes.lock().await.is_empty()
    }
}

impl Default for VoteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votegate_types::{AccountId, ChannelId, CommunityId};

    fn record(message: u64) -> VoteRecord {
        VoteRecord::new(
            MessageId::new(message),
            ChannelId::new(5),
            CommunityId::new(1),
            AccountId::new(50),
        )
    }

    #[tokio::test]
    async fn open_then_lookup() {
        let registry = VoteRegistry::new();
        registry.open(record(7)).await;

        let slot = registry.get(MessageId::new(7)).await.expect("tracked");
        let guard = slot.lock().await;
        assert_eq!(guard.as_ref().map(|r| r.message()), Some(MessageId::new(7)));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn untracked_message_is_none() {
        let registry = VoteRegistry::new();
        assert!(registry.get(MessageId::new(7)).await.is_none());
        assert!(!registry.retire(MessageId::new(7), RetireReason::Abandoned).await);
    }

    #[tokio::test]
    async fn retire_unlinks_once() {
        let registry = VoteRegistry::new();
        registry.open(record(7)).await;
        let reason = RetireReason::Resolved(Outcome::Succeeded);
        assert!(registry.retire(MessageId::new(7), reason).await);
        assert!(!registry.retire(MessageId::new(7), reason).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn votes_on_different_messages_are_independent() {
        let registry = VoteRegistry::new();
        registry.open(record(7)).await;
        registry.open(record(8)).await;

        let a = registry.get(MessageId::new(7)).await.unwrap();
        let _held = a.lock().await;
        // Holding one slot must not block another.
        let b = registry.get(MessageId::new(8)).await.unwrap();
        assert!(b.try_lock().is_ok());
    }
}
