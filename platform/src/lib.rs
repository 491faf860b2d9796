//! Abstract collaborator interfaces for votegate.
//!
//! The vote core never talks to a chat platform or a settings database
//! directly. Every backend (a live gateway connection, the console replay
//! platform, the in-memory nullables used in tests) implements these traits,
//! and the rest of the workspace depends only on the traits.

pub mod chat;
pub mod config_store;
pub mod error;
pub mod toml_store;

pub use chat::ChatPlatform;
pub use config_store::ConfigStore;
pub use error::PlatformError;
pub use toml_store::TomlConfigStore;
