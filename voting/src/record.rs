//! Vote record: the ballot box behind one approval post.

use std::collections::BTreeSet;
use std::fmt;
use votegate_types::{AccountId, ChannelId, CommunityId, MessageId, VoteConfig};

/// Which voter set a reaction counts towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ballot {
    Positive,
    Negative,
}

/// How a vote ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The positive threshold was reached; the candidate gets the roles.
    Succeeded,
    /// The negative threshold was reached; the candidate gets nothing.
    Cancelled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Current counts of a vote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub positive: usize,
    pub negative: usize,
}

/// One pending join approval.
///
/// Both voter sets track raw reaction membership independently: an account
/// that reacts with both symbols is counted on both sides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteRecord {
    message: MessageId,
    channel: ChannelId,
    community: CommunityId,
    candidate: AccountId,
    positive_voters: BTreeSet<AccountId>,
    negative_voters: BTreeSet<AccountId>,
}

impl VoteRecord {
    /// Create a record with empty voter sets for a freshly posted approval message.
    pub fn new(
        message: MessageId,
        channel: ChannelId,
        community: CommunityId,
        candidate: AccountId,
    ) -> Self {
        Self {
            message,
            channel,
            community,
            candidate,
            positive_voters: BTreeSet::new(),
            negative_voters: BTreeSet::new(),
        }
    }

    pub fn message(&self) -> MessageId {
        self.message
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn community(&self) -> CommunityId {
        self.community
    }

    pub fn candidate(&self) -> AccountId {
        self.candidate
    }

    /// Map a reaction symbol to a ballot under the given settings.
    ///
    /// The negative symbol only counts while the veto is enabled.
    pub fn ballot_for(config: &VoteConfig, symbol: &str) -> Option<Ballot> {
        if symbol == config.positive_symbol {
            Some(Ballot::Positive)
        } else if config.veto_enabled() && symbol == config.negative_symbol {
            Some(Ballot::Negative)
        } else {
            None
        }
    }

    /// Count a reaction. Returns `false` if the account was already counted.
    pub fn cast(&mut self, ballot: Ballot, account: AccountId) -> bool {
        match ballot {
            Ballot::Positive => self.positive_voters.insert(account),
            Ballot::Negative => self.negative_voters.insert(account),
        }
    }

    /// Withdraw a reaction.
    ///
    /// Unlike [`cast`](Self::cast), removal matches the symbols directly and
    /// ignores whether the veto is enabled, so a stale negative reaction can
    /// always be taken back. Returns `true` if any set changed.
    pub fn retract(&mut self, config: &VoteConfig, symbol: &str, account: AccountId) -> bool {
        let mut changed = false;
        if symbol == config.positive_symbol {
            changed |= self.positive_voters.remove(&account);
        }
        if symbol == config.negative_symbol {
            changed |= self.negative_voters.remove(&account);
        }
        changed
    }

    /// Check the resolution predicates, approval first.
    pub fn evaluate(&self, config: &VoteConfig) -> Option<Outcome> {
        if self.positive_voters.len() >= config.positive_threshold as usize {
            Some(Outcome::Succeeded)
        } else if config.veto_enabled()
            && self.negative_voters.len() >= config.negative_threshold as usize
        {
            Some(Outcome::Cancelled)
        } else {
            None
        }
    }

    pub fn tally(&self) -> Tally {
        Tally {
            positive: self.positive_voters.len(),
            negative: self.negative_voters.len(),
        }
    }

    /// The voters that decided an outcome: positive voters on success,
    /// negative voters on cancellation.
    pub fn deciding_voters(&self, outcome: Outcome) -> &BTreeSet<AccountId> {
        match outcome {
            Outcome::Succeeded => &self.positive_voters,
            Outcome::Cancelled => &self.negative_voters,
        }
    }
}
