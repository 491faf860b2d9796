use thiserror::Error;
use votegate_platform::PlatformError;
use votegate_types::ConfigError;

/// Errors surfaced by join handling, reaction processing and settings edits.
///
/// Vote resolution never returns these; it logs and carries on.
#[derive(Debug, Error)]
pub enum VoteError {
    /// Missing or invalid settings. The message is fit to show administrators.
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("missing permission: {0}")]
    MissingPermission(String),

    /// A platform call failed. Not retried.
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl From<PlatformError> for VoteError {
    fn from(e: PlatformError) -> Self {
        match e {
            PlatformError::Delivery(msg) => Self::Delivery(msg),
            PlatformError::MissingPermission(msg) => Self::MissingPermission(msg),
            PlatformError::NotFound(msg) => Self::NotFound(msg),
            PlatformError::Storage(msg) => Self::Config(ConfigError::Unavailable(msg)),
        }
    }
}
