use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    /// The request reached the platform but could not be carried out
    /// (channel deleted, message gone, transport failure).
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("missing permission: {0}")]
    MissingPermission(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("config storage error: {0}")]
    Storage(String),
}
