//! Inbound signals delivered by the chat platform.

use crate::{AccountId, CommunityId, MessageId};
use serde::{Deserialize, Serialize};

/// A reaction added to or removed from a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub community: CommunityId,
    pub message: MessageId,
    pub account: AccountId,
    /// The reaction as the platform renders it (unicode emoji or custom emoji markup).
    pub symbol: String,
}

/// Every event the gate reacts to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    MemberJoined {
        community: CommunityId,
        account: AccountId,
    },
    ReactionAdded(ReactionEvent),
    ReactionRemoved(ReactionEvent),
}

impl GatewayEvent {
    pub fn community(&self) -> CommunityId {
        match self {
            Self::MemberJoined { community, .. } => *community,
            Self::ReactionAdded(r) | Self::ReactionRemoved(r) => r.community,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MemberJoined { .. } => "member_joined",
            Self::ReactionAdded(_) => "reaction_added",
            Self::ReactionRemoved(_) => "reaction_removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replay_lines() {
        let joined: GatewayEvent =
            serde_json::from_str(r#"{"type":"member_joined","community":1,"account":2}"#)
                .unwrap();
        assert_eq!(
            joined,
            GatewayEvent::MemberJoined {
                community: CommunityId::new(1),
                account: AccountId::new(2),
            }
        );

        let added: GatewayEvent = serde_json::from_str(
            r#"{"type":"reaction_added","community":1,"message":9,"account":3,"symbol":"✅"}"#,
        )
        .unwrap();
        assert_eq!(added.kind(), "reaction_added");
        assert_eq!(added.community(), CommunityId::new(1));
    }
}
