//! Multi-tier synchronization engine
//!
//! Owns startup recovery and mutation fan-out for the settings store.
//! Recovery builds one authoritative record before the store is handed to
//! anyone: backend first for the notification time it governs, local
//! cache second for everything else, defaults underneath. After that the
//! engine subscribes to the store and persists every mutation to all
//! three tiers concurrently. Persistence is advisory — a failing tier is
//! logged and reported, never surfaced to the mutator.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, warn};

use schema::{is_valid_notif_time, Preferences};
use tiers::{FileSink, LocalTier, ReadOutcome, TierError, TierKind, TimeBackend};

use crate::store::SettingsStore;

/// What to do with a fan-out whose mutation has been superseded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleWritePolicy {
    /// Issue it anyway; a stale record may land in a tier after a newer
    /// one and is corrected by the next write or the next recovery
    #[default]
    Allow,
    /// Skip fan-outs that are no longer the newest mutation when their
    /// turn comes, reporting them as superseded
    LastWriterWins,
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Bound on the startup backend query
    pub backend_timeout: Duration,
    /// Handling of fan-outs superseded by a newer mutation
    pub stale_writes: StaleWritePolicy,
    /// Capacity of the sync event broadcast channel
    pub event_buffer: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            backend_timeout: Duration::from_secs(3),
            stale_writes: StaleWritePolicy::default(),
            event_buffer: 64,
        }
    }
}

/// Per-tier outcome of startup recovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierStatus {
    /// A usable value was recovered
    Recovered,
    /// Nothing stored
    Absent,
    /// Tier unavailable, rejected, or malformed
    Failed(String),
}

/// Telemetry events emitted by the engine
///
/// Observing these never changes control flow; they exist so failures
/// that are deliberately swallowed stay visible.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Startup recovery finished and the store was published
    RecoveryCompleted {
        /// Outcome of the backend notification-time query
        backend: TierStatus,
        /// Outcome of the local cache read
        local: TierStatus,
    },
    /// One tier write of one mutation's fan-out finished
    TierWrite {
        /// Tier the write went to
        tier: TierKind,
        /// Mutation sequence number
        seq: u64,
        /// Failure description, if the write failed
        error: Option<String>,
    },
    /// A fan-out was skipped under [`StaleWritePolicy::LastWriterWins`]
    MutationSuperseded {
        /// Sequence number of the skipped mutation
        seq: u64,
    },
}

/// Multi-tier settings synchronization engine
///
/// Construct with the three tiers, then call [`SyncEngine::start`] once;
/// the store it returns is the only mutation surface consumers get, and
/// it is not handed out until recovery has resolved.
pub struct SyncEngine {
    local: Arc<dyn LocalTier>,
    backend: Arc<dyn TimeBackend>,
    file: Arc<dyn FileSink>,
    config: SyncConfig,
    events: broadcast::Sender<SyncEvent>,
    latest_seq: Arc<AtomicU64>,
    pending: Arc<watch::Sender<usize>>,
}

impl SyncEngine {
    /// Create an engine over the three storage tiers
    pub fn new(
        local: Arc<dyn LocalTier>,
        backend: Arc<dyn TimeBackend>,
        file: Arc<dyn FileSink>,
        config: SyncConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer);
        let (pending, _) = watch::channel(0);

        Self {
            local,
            backend,
            file,
            config,
            events,
            latest_seq: Arc::new(AtomicU64::new(0)),
            pending: Arc::new(pending),
        }
    }

    /// Subscribe to engine telemetry events
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Number of mutations whose fan-out has not finished yet
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Wait until every enqueued fan-out has completed or been skipped
    pub async fn drain(&self) {
        let mut rx = self.pending.subscribe();
        let _ = rx.wait_for(|count| *count == 0).await;
    }

    /// Recover the authoritative record and return the live store
    ///
    /// No persistence writes are issued for the recovery publish itself;
    /// fan-out begins with the first mutation after this returns.
    pub async fn start(&self) -> SettingsStore {
        let mut record = Preferences::default();

        // Backend first: it governs notif_time even when the local tier
        // cached a copy, because a scheduled task may have changed it
        // between sessions.
        let (notif_time, backend_status) = self.recover_notif_time(&record).await;

        let local_status = match self.local.read() {
            ReadOutcome::Recovered(partial) => {
                record = record.merged(&partial);
                TierStatus::Recovered
            }
            ReadOutcome::Absent => {
                debug!("no local settings cached");
                TierStatus::Absent
            }
            ReadOutcome::Failed(err) => {
                warn!(error = %err, "local settings unreadable, using defaults");
                TierStatus::Failed(err.to_string())
            }
        };

        // Unconditional: backend-or-default wins for the field it governs.
        record.notif_time = notif_time;

        let _ = self.events.send(SyncEvent::RecoveryCompleted {
            backend: backend_status,
            local: local_status,
        });

        let store = SettingsStore::new(record);
        self.attach(&store);
        store
    }

    async fn recover_notif_time(&self, record: &Preferences) -> (String, TierStatus) {
        match timeout(self.config.backend_timeout, self.backend.get_notif_time()).await {
            Ok(Ok(value)) if is_valid_notif_time(&value) => (value, TierStatus::Recovered),
            Ok(Ok(value)) => {
                warn!(%value, "backend returned malformed notification time");
                (record.notif_time.clone(), TierStatus::Failed(format!("malformed time: {value}")))
            }
            Ok(Err(err)) => {
                warn!(error = %err, "backend notification time unavailable");
                (record.notif_time.clone(), TierStatus::Failed(err.to_string()))
            }
            Err(_) => {
                warn!(timeout = ?self.config.backend_timeout, "backend notification time timed out");
                (record.notif_time.clone(), TierStatus::Failed("timed out".to_string()))
            }
        }
    }

    /// Attach the persistence subscriber and its background worker
    fn attach(&self, store: &SettingsStore) {
        let (tx, rx) = mpsc::unbounded_channel::<(u64, Preferences)>();
        self.spawn_worker(rx);

        let latest = Arc::clone(&self.latest_seq);
        let pending = Arc::clone(&self.pending);
        let replayed = AtomicBool::new(false);

        // The subscription handle is intentionally dropped: the engine's
        // subscriber stays registered for the life of the store.
        let _ = store.subscribe(move |prefs| {
            // subscribe replays the record just recovered; persistence
            // starts with the first real mutation
            if !replayed.swap(true, Ordering::SeqCst) {
                return;
            }
            let seq = latest.fetch_add(1, Ordering::SeqCst) + 1;
            pending.send_modify(|count| *count += 1);
            if tx.send((seq, prefs.clone())).is_err() {
                pending.send_modify(|count| *count -= 1);
            }
        });
    }

    fn spawn_worker(&self, mut rx: mpsc::UnboundedReceiver<(u64, Preferences)>) {
        let local = Arc::clone(&self.local);
        let backend = Arc::clone(&self.backend);
        let file = Arc::clone(&self.file);
        let events = self.events.clone();
        let latest = Arc::clone(&self.latest_seq);
        let pending = Arc::clone(&self.pending);
        let policy = self.config.stale_writes;

        tokio::spawn(async move {
            while let Some((seq, prefs)) = rx.recv().await {
                if policy == StaleWritePolicy::LastWriterWins
                    && seq < latest.load(Ordering::SeqCst)
                {
                    debug!(seq, "skipping superseded settings write");
                    let _ = events.send(SyncEvent::MutationSuperseded { seq });
                    pending.send_modify(|count| *count -= 1);
                    continue;
                }

                // Fan-outs from successive mutations may overlap. An
                // in-flight fan-out is never cancelled; under `Allow` it
                // may land a stale record after a newer one.
                let local = Arc::clone(&local);
                let backend = Arc::clone(&backend);
                let file = Arc::clone(&file);
                let events = events.clone();
                let pending = Arc::clone(&pending);
                tokio::spawn(async move {
                    fan_out(&*local, &*backend, &*file, &events, seq, &prefs).await;
                    pending.send_modify(|count| *count -= 1);
                });
            }
        });
    }
}

/// Issue one mutation's writes to all three tiers concurrently
async fn fan_out(
    local: &dyn LocalTier,
    backend: &dyn TimeBackend,
    file: &dyn FileSink,
    events: &broadcast::Sender<SyncEvent>,
    seq: u64,
    prefs: &Preferences,
) {
    let local_write = async {
        // Cache tier: a quota error here is swallowed on purpose.
        report(events, TierKind::Local, seq, local.write(prefs).err());
    };
    let backend_write = async {
        let result = backend.set_notif_time(&prefs.notif_time).await;
        report(events, TierKind::Backend, seq, result.err());
    };
    let file_write = async {
        report(events, TierKind::File, seq, file.write(prefs).await.err());
    };

    tokio::join!(local_write, backend_write, file_write);
}

fn report(
    events: &broadcast::Sender<SyncEvent>,
    tier: TierKind,
    seq: u64,
    error: Option<TierError>,
) {
    match &error {
        Some(err) => warn!(%tier, seq, error = %err, "settings write failed"),
        None => debug!(%tier, seq, "settings write ok"),
    }
    let _ = events.send(SyncEvent::TierWrite { tier, seq, error: error.map(|e| e.to_string()) });
}
