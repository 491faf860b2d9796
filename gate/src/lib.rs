//! The votegate service.
//!
//! Owns the vote registry and the three vote components, and turns a stream
//! of gateway events into one task per event.

pub mod config;
pub mod error;
pub mod service;
pub mod stop;

pub use config::GateConfig;
pub use error::GateError;
pub use service::{EventOutcome, GateService};
pub use stop::{StopReceiver, StopSignal};
