//! Tier identity and read outcomes

use std::fmt;

use schema::PartialPreferences;

use crate::error::TierError;

/// Which persistence tier an operation touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierKind {
    /// Synchronous local key/value cache
    Local,
    /// Privileged backend governing the notification time
    Backend,
    /// Write-only JSON file used for cross-process recovery
    File,
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierKind::Local => write!(f, "local"),
            TierKind::Backend => write!(f, "backend"),
            TierKind::File => write!(f, "file"),
        }
    }
}

/// Result of reading a tier during startup recovery
///
/// `Absent` and `Failed` merge identically (the engine falls through to
/// the default or another tier) but stay distinguishable for logging.
#[derive(Debug)]
pub enum ReadOutcome {
    /// A partial record was recovered
    Recovered(PartialPreferences),
    /// Key missing or storage empty
    Absent,
    /// Storage unavailable or payload malformed
    Failed(TierError),
}

impl ReadOutcome {
    /// Whether anything usable was recovered
    pub fn is_recovered(&self) -> bool {
        matches!(self, ReadOutcome::Recovered(_))
    }
}
