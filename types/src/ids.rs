//! Platform identifiers.
//!
//! Every entity the chat platform hands us (communities, accounts, channels,
//! messages, roles) is a 64-bit snowflake. Each gets its own newtype so a
//! message id can never be passed where a role id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

snowflake_id!(
    /// A community (guild) that scopes configuration and membership.
    CommunityId
);
snowflake_id!(
    /// A user account within a community.
    AccountId
);
snowflake_id!(
    /// A text channel.
    ChannelId
);
snowflake_id!(
    /// A posted message. Approval posts are keyed by this id.
    MessageId
);
snowflake_id!(
    /// A grantable role.
    RoleId
);

impl AccountId {
    /// Raw mention markup, usable even after the member has left.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl ChannelId {
    pub fn mention(&self) -> String {
        format!("<#{}>", self.0)
    }
}

impl RoleId {
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_use_platform_markup() {
        assert_eq!(AccountId::new(42).mention(), "<@42>");
        assert_eq!(ChannelId::new(7).mention(), "<#7>");
        assert_eq!(RoleId::new(9).mention(), "<@&9>");
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&MessageId::new(1234)).unwrap();
        assert_eq!(json, "1234");
        let back: MessageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MessageId::new(1234));
    }
}
