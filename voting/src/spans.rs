//! Pre-built [`tracing::Span`] constructors for vote operations.
//!
//! Consistent span names and fields make it easy to follow one vote from its
//! approval post through every reaction to its resolution.

use crate::record::Outcome;
use tracing::{info_span, Span};
use votegate_types::{AccountId, CommunityId, MessageId};

/// Span covering the handling of one member join.
pub fn join_span(community: CommunityId, account: AccountId) -> Span {
    info_span!("join", community = %community, account = %account)
}

/// Span covering one reaction add or remove.
pub fn reaction_span(kind: &str, message: MessageId, account: AccountId) -> Span {
    info_span!("reaction", kind = %kind, message = %message, account = %account)
}

/// Span covering the resolution of one vote.
pub fn resolve_span(message: MessageId, outcome: Outcome) -> Span {
    info_span!("resolve", message = %message, outcome = %outcome)
}
