//! Vote-to-join core.
//!
//! A member joins; depending on the community's settings they either receive
//! the target roles straight away or an approval post goes up and the
//! community votes on it with reactions. Every open vote is a [`VoteRecord`]
//! owned by the [`VoteRegistry`] and keyed by the approval post's message id.
//!
//! - [`JoinHandler`] opens votes (or auto-grants).
//! - [`ReactionEventProcessor`] tallies reactions and detects threshold crossings.
//! - [`VoteResolver`] grants roles, announces the outcome and retires the record.
//! - [`SettingsEditor`] applies administrator changes to the stored settings.

pub mod error;
pub mod join;
pub mod notice;
pub mod processor;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod spans;
pub mod template;

pub use error::VoteError;
pub use join::{JoinHandler, JoinOutcome};
pub use processor::{IgnoreReason, ReactionEventProcessor, ReactionOutcome};
pub use record::{Ballot, Outcome, Tally, VoteRecord};
pub use registry::{RetireReason, VoteRegistry, VoteSlot};
pub use resolver::{Resolution, VoteResolver};
pub use settings::{SettingsEditor, VoteSetup};
pub use template::{TemplateError, TemplateVars};
