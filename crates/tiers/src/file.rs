//! File backup tier
//!
//! Serializes the full record to a JSON file on every write so another
//! process (or a support bundle) can read the last known preferences.
//! Write-only in the core: recovery never reads this tier, and adding a
//! read path would change the startup merge order, so treat that as a
//! documented extension rather than something to slip in.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use schema::Preferences;

use crate::error::Result;

/// Asynchronous write-only file tier
#[async_trait]
pub trait FileSink: Send + Sync {
    /// Serialize and write the full record
    async fn write(&self, prefs: &Preferences) -> Result<()>;
}

/// JSON file sink with atomic writes
///
/// Writes go to a sibling temp file first and are renamed into place, so
/// a crash mid-write never leaves a truncated backup.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Create a sink writing to the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this sink writes to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileSink for JsonFileSink {
    async fn write(&self, prefs: &Preferences) -> Result<()> {
        let json = serde_json::to_string_pretty(prefs)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}
