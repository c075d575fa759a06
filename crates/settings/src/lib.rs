//! Settings store and multi-tier synchronization engine
//!
//! The [`store::SettingsStore`] holds the canonical in-memory preference
//! record and notifies subscribers synchronously on every change. The
//! [`engine::SyncEngine`] recovers that record from the storage tiers at
//! startup and fans every subsequent mutation out to all of them,
//! treating persistence as advisory: the in-memory value is the only
//! thing callers may rely on immediately.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod store;

pub use engine::{StaleWritePolicy, SyncConfig, SyncEngine, SyncEvent, TierStatus};
pub use store::{SettingsStore, Subscription};
