//! Storage tiers for Quietwin preferences
//!
//! Three independent persistence backends sit behind the traits in this
//! crate: a synchronous local key/value tier, an asynchronous backend that
//! governs the notification time, and a write-only JSON file sink used for
//! cross-process recovery. Each tier is isolated so one tier's failure
//! cannot block or corrupt another.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod file;
pub mod local;
pub mod outcome;
pub mod test_utils;

pub use backend::TimeBackend;
pub use error::{Result, TierError};
pub use file::{FileSink, JsonFileSink};
pub use local::{LocalTier, SledTier, SledTierConfig, SETTINGS_KEY};
pub use outcome::{ReadOutcome, TierKind};
