//! Configuration errors shared across crates.
//!
//! The `Display` text of each variant is shown to community administrators
//! as-is, so it is phrased as a chat reply rather than a diagnostic.

use crate::RoleId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("No roles have been set for votemember.")]
    NoTargetRoles,

    #[error("Votemember has been disabled, enable it first.")]
    Disabled,

    #[error("The positive reaction threshold must be at least 1.")]
    ZeroPositiveThreshold,

    #[error("Role {0} is already in the votemember list.")]
    RoleAlreadyListed(RoleId),

    #[error("Role {0} is not in the votemember list.")]
    RoleNotListed(RoleId),

    #[error("Votemember settings are unavailable: {0}")]
    Unavailable(String),
}
