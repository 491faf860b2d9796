//! Fundamental types for votegate.
//!
//! This crate defines the types shared across every other crate in the
//! workspace: platform identifiers, per-community vote settings, inbound
//! gateway events and configuration errors.

pub mod config;
pub mod error;
pub mod event;
pub mod ids;

pub use config::VoteConfig;
pub use error::ConfigError;
pub use event::{GatewayEvent, ReactionEvent};
pub use ids::{AccountId, ChannelId, CommunityId, MessageId, RoleId};
