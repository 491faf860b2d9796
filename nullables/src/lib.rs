//! Nullable infrastructure for deterministic testing.
//!
//! The chat platform and the settings store are abstracted behind the traits
//! in `votegate-platform`. This crate provides test-friendly implementations
//! that:
//! - Record every outbound call instead of performing it
//! - Can be told to fail, or to report a member as departed
//! - Never touch the network or the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod config_store;
pub mod platform;

pub use config_store::NullConfigStore;
pub use platform::{NullPlatform, PostedMessage, RoleGrant};
