//! In-memory tier fakes for testing
//!
//! These fakes let engine and integration tests script tier behavior
//! (recovered payloads, quota failures, slow or rejecting backends) and
//! inspect what the engine wrote, without touching disk.

#![allow(dead_code)] // Not every helper is used by every test crate

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use schema::{PartialPreferences, Preferences};

use crate::backend::TimeBackend;
use crate::error::{Result, TierError};
use crate::file::FileSink;
use crate::local::LocalTier;
use crate::outcome::ReadOutcome;

/// In-memory local tier with failure injection
#[derive(Default)]
pub struct MemoryLocalTier {
    state: Mutex<LocalState>,
}

#[derive(Default)]
struct LocalState {
    raw: Option<String>,
    fail_writes: bool,
    unavailable: bool,
    write_count: usize,
}

impl MemoryLocalTier {
    /// Empty tier (reads as `Absent`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Tier pre-seeded with a raw JSON payload
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let tier = Self::new();
        tier.state.lock().raw = Some(raw.into());
        tier
    }

    /// Tier pre-seeded with a partial record
    pub fn with_partial(partial: &PartialPreferences) -> Self {
        let raw = serde_json::to_string(partial).unwrap();
        Self::with_raw(raw)
    }

    /// Make subsequent writes fail like a quota error
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Make subsequent reads fail as unavailable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }

    /// Raw JSON currently stored, if any
    pub fn stored_raw(&self) -> Option<String> {
        self.state.lock().raw.clone()
    }

    /// Stored record parsed back, if any
    pub fn stored(&self) -> Option<Preferences> {
        let raw = self.state.lock().raw.clone()?;
        serde_json::from_str(&raw).ok()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.state.lock().write_count
    }
}

impl LocalTier for MemoryLocalTier {
    fn read(&self) -> ReadOutcome {
        let state = self.state.lock();
        if state.unavailable {
            return ReadOutcome::Failed(TierError::Unavailable("local storage gone".into()));
        }
        match &state.raw {
            Some(raw) => match serde_json::from_str::<PartialPreferences>(raw) {
                Ok(partial) => ReadOutcome::Recovered(partial),
                Err(e) => ReadOutcome::Failed(TierError::Malformed(e.to_string())),
            },
            None => ReadOutcome::Absent,
        }
    }

    fn write(&self, prefs: &Preferences) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(TierError::Unavailable("quota exceeded".into()));
        }
        state.raw = Some(serde_json::to_string(prefs)?);
        state.write_count += 1;
        Ok(())
    }
}

/// What the fake backend does when queried
#[derive(Clone)]
enum BackendScript {
    /// Return this value
    Value(String),
    /// Reject with `Denied`
    Deny(String),
    /// Sleep this long, then answer with this value (for timeout tests)
    Hang(Duration, String),
}

/// In-memory time backend with a scriptable response
pub struct MemoryTimeBackend {
    script: Mutex<BackendScript>,
    writes: Mutex<Vec<String>>,
    fail_writes: Mutex<bool>,
}

impl MemoryTimeBackend {
    /// Backend answering with the given time string
    pub fn returning(value: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(BackendScript::Value(value.into())),
            writes: Mutex::new(Vec::new()),
            fail_writes: Mutex::new(false),
        }
    }

    /// Backend rejecting every read
    pub fn denying(reason: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(BackendScript::Deny(reason.into())),
            writes: Mutex::new(Vec::new()),
            fail_writes: Mutex::new(false),
        }
    }

    /// Backend that sleeps before answering, to trip the startup timeout
    pub fn hanging(delay: Duration, value: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(BackendScript::Hang(delay, value.into())),
            writes: Mutex::new(Vec::new()),
            fail_writes: Mutex::new(false),
        }
    }

    /// Make subsequent writes fail
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    /// Every value written so far, in order
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }
}

#[async_trait]
impl TimeBackend for MemoryTimeBackend {
    async fn get_notif_time(&self) -> Result<String> {
        let script = self.script.lock().clone();
        match script {
            BackendScript::Value(v) => Ok(v),
            BackendScript::Deny(reason) => Err(TierError::Denied(reason)),
            BackendScript::Hang(delay, value) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
        }
    }

    async fn set_notif_time(&self, value: &str) -> Result<()> {
        if *self.fail_writes.lock() {
            return Err(TierError::Denied("backend write rejected".into()));
        }
        self.writes.lock().push(value.to_string());
        Ok(())
    }
}

/// In-memory file sink recording every snapshot written
#[derive(Default)]
pub struct MemoryFileSink {
    writes: Mutex<Vec<Preferences>>,
    fail: Mutex<bool>,
}

impl MemoryFileSink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail
    pub fn fail_writes(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    /// Every record written so far, in order
    pub fn writes(&self) -> Vec<Preferences> {
        self.writes.lock().clone()
    }

    /// The most recent record written, if any
    pub fn last(&self) -> Option<Preferences> {
        self.writes.lock().last().cloned()
    }
}

#[async_trait]
impl FileSink for MemoryFileSink {
    async fn write(&self, prefs: &Preferences) -> Result<()> {
        if *self.fail.lock() {
            return Err(TierError::Unavailable("disk full".into()));
        }
        self.writes.lock().push(prefs.clone());
        Ok(())
    }
}
