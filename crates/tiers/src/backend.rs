//! Privileged backend tier
//!
//! The backend owns exactly one field: the notification time. It may be
//! changed by a non-UI actor (a scheduled task) between sessions, so at
//! startup it wins over any copy the local tier cached. The engine
//! validates whatever comes back; this trait just moves strings.

use async_trait::async_trait;

use crate::error::Result;

/// Asynchronous backend call tier for the notification time field
#[async_trait]
pub trait TimeBackend: Send + Sync {
    /// Fetch the stored notification time
    ///
    /// Returns whatever the backend holds; callers must validate the
    /// shape and treat errors as absent.
    async fn get_notif_time(&self) -> Result<String>;

    /// Store a new notification time
    ///
    /// Fire-and-forget from the engine's perspective: a rejection is
    /// logged, never surfaced.
    async fn set_notif_time(&self, value: &str) -> Result<()>;
}
