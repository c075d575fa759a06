//! Quietwin — settings subsystem for the Quietwin tray journal
//!
//! This package ties together the preference schema, the three storage
//! tiers, and the synchronization engine that keeps them consistent.
//! The member crates can also be used individually.

pub use schema;
pub use settings;
pub use tiers;
