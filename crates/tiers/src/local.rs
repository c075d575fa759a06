//! Synchronous local key/value tier
//!
//! This tier is a cache, not the source of truth: the full record is
//! stored as JSON under a fixed namespaced key, reads fall back cleanly
//! when the payload is missing or malformed, and write failures (quota,
//! closed database) are surfaced as errors the engine swallows.

use schema::{PartialPreferences, Preferences};

use crate::error::{Result, TierError};
use crate::outcome::ReadOutcome;

/// Fixed namespaced key the serialized record lives under
pub const SETTINGS_KEY: &str = "qw-settings";

/// Synchronous local storage tier
pub trait LocalTier: Send + Sync {
    /// Read the stored partial record, if any
    fn read(&self) -> ReadOutcome;

    /// Write the full record
    fn write(&self, prefs: &Preferences) -> Result<()>;
}

/// Configuration for the sled-backed local tier
#[derive(Debug, Clone)]
pub struct SledTierConfig {
    /// Database path
    pub path: String,
    /// Cache capacity in bytes
    pub cache_capacity: u64,
    /// Flush interval in milliseconds (None for immediate flush)
    pub flush_every_ms: Option<u64>,
}

impl Default for SledTierConfig {
    fn default() -> Self {
        Self {
            path: "quietwin_settings.db".to_string(),
            cache_capacity: 4 * 1024 * 1024,
            flush_every_ms: Some(500),
        }
    }
}

impl SledTierConfig {
    /// Create a configuration with a custom path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set cache capacity in bytes
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Set flush interval in milliseconds
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }
}

/// Sled-backed local tier
pub struct SledTier {
    db: sled::Db,
}

impl SledTier {
    /// Open the local tier with configuration
    pub fn new(config: SledTierConfig) -> Result<Self> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .flush_every_ms(config.flush_every_ms)
            .open()
            .map_err(|e| TierError::Unavailable(e.to_string()))?;

        Ok(Self { db })
    }

    /// Open an in-memory local tier (for testing)
    pub fn in_memory() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| TierError::Unavailable(e.to_string()))?;

        Ok(Self { db })
    }
}

impl LocalTier for SledTier {
    fn read(&self) -> ReadOutcome {
        match self.db.get(SETTINGS_KEY) {
            Ok(Some(raw)) => match serde_json::from_slice::<PartialPreferences>(&raw) {
                Ok(partial) => ReadOutcome::Recovered(partial),
                Err(e) => ReadOutcome::Failed(TierError::Malformed(e.to_string())),
            },
            Ok(None) => ReadOutcome::Absent,
            Err(e) => ReadOutcome::Failed(TierError::Unavailable(e.to_string())),
        }
    }

    fn write(&self, prefs: &Preferences) -> Result<()> {
        let raw = serde_json::to_vec(prefs)?;
        self.db
            .insert(SETTINGS_KEY, raw)
            .map_err(|e| TierError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
