//! Settings synchronization integration tests
//!
//! End-to-end scenarios over the real sled local tier and JSON file sink:
//! startup recovery, restart round-trips, and the fan-out that keeps the
//! tiers in step with the in-memory record.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use schema::{theme, Preferences, Theme};
use settings::{SyncConfig, SyncEngine};
use tempfile::TempDir;
use tiers::test_utils::{MemoryFileSink, MemoryLocalTier, MemoryTimeBackend};
use tiers::{JsonFileSink, SledTier, SledTierConfig};

fn sled_config(dir: &TempDir) -> SledTierConfig {
    SledTierConfig::new(dir.path().join("settings.db").to_string_lossy())
}

/// Full lifecycle: first launch, an edit, then two restarts — one with the
/// backend healthy, one with it gone.
#[tokio::test]
async fn test_settings_lifecycle_across_restarts() {
    let temp_dir = TempDir::new().unwrap();
    let backup_path = temp_dir.path().join("backup/settings.json");

    // Session 1: nothing stored yet, user switches to dark at 09:30
    {
        let local = Arc::new(SledTier::new(sled_config(&temp_dir)).unwrap());
        let backend = Arc::new(MemoryTimeBackend::returning("20:00"));
        let file = Arc::new(JsonFileSink::new(&backup_path));
        let engine = SyncEngine::new(local, backend, file, SyncConfig::default());

        let store = engine.start().await;
        assert_eq!(store.get(), Preferences::default());

        let mut edit = store.get();
        edit.theme = Theme::Dark;
        edit.notif_time = "09:30".to_string();
        store.set(edit);
        engine.drain().await;
    }

    // Session 2: backend still answers, everything comes back
    {
        let local = Arc::new(SledTier::new(sled_config(&temp_dir)).unwrap());
        let backend = Arc::new(MemoryTimeBackend::returning("09:30"));
        let file = Arc::new(JsonFileSink::new(&backup_path));
        let engine = SyncEngine::new(local, backend, file, SyncConfig::default());

        let store = engine.start().await;
        let prefs = store.get();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.notif_time, "09:30");
    }

    // Session 3: backend gone — every field survives except the one it
    // governs, which falls back to default rather than the local copy
    {
        let local = Arc::new(SledTier::new(sled_config(&temp_dir)).unwrap());
        let backend = Arc::new(MemoryTimeBackend::denying("backend offline"));
        let file = Arc::new(JsonFileSink::new(&backup_path));
        let engine = SyncEngine::new(local, backend, file, SyncConfig::default());

        let store = engine.start().await;
        let prefs = store.get();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.notif_time, "20:00");
    }
}

/// The documented merge scenario: defaults underneath, local cache over
/// them, backend value for the notification time on top. Unknown keys in
/// the cached payload are ignored.
#[tokio::test]
async fn test_startup_merge_scenario() {
    let local = Arc::new(MemoryLocalTier::with_raw(
        r#"{"theme":"dark","obsoleteToggle":true}"#,
    ));
    let backend = Arc::new(MemoryTimeBackend::returning("09:30"));
    let file = Arc::new(MemoryFileSink::new());

    let engine = SyncEngine::new(local, backend, file, SyncConfig::default());
    let store = engine.start().await;

    let prefs = store.get();
    let defaults = Preferences::default();
    assert_eq!(prefs.theme, Theme::Dark);
    assert_eq!(prefs.notif_time, "09:30");
    assert_eq!(prefs.icon, defaults.icon);
    assert_eq!(prefs.font, defaults.font);
    assert_eq!(prefs.shortcut, defaults.shortcut);
    assert_eq!(prefs.notif_sound, defaults.notif_sound);
    assert_eq!(prefs.auto_tag, defaults.auto_tag);
    assert_eq!(prefs.privacy_lock, defaults.privacy_lock);
    assert_eq!(prefs.startup, defaults.startup);
}

/// The file sink holds a parseable copy of the last mutation.
#[tokio::test]
async fn test_file_backup_reflects_last_write() {
    let temp_dir = TempDir::new().unwrap();
    let backup_path = temp_dir.path().join("settings.json");

    let local = Arc::new(MemoryLocalTier::new());
    let backend = Arc::new(MemoryTimeBackend::returning("20:00"));
    let file = Arc::new(JsonFileSink::new(&backup_path));
    let engine = SyncEngine::new(local, backend, file, SyncConfig::default());

    let store = engine.start().await;
    let mut edit = store.get();
    edit.privacy_lock = true;
    store.set(edit.clone());
    engine.drain().await;

    let raw = std::fs::read_to_string(&backup_path).unwrap();
    let on_disk: Preferences = serde_json::from_str(&raw).unwrap();
    assert_eq!(on_disk, edit);
}

/// A UI-style subscriber (the theme applier) sees the recovered value on
/// subscription and every mutation after it, without ever touching the
/// tiers itself.
#[tokio::test]
async fn test_theme_applier_subscription() {
    let local = Arc::new(MemoryLocalTier::with_raw(r#"{"theme":"light"}"#));
    let backend = Arc::new(MemoryTimeBackend::returning("20:00"));
    let file = Arc::new(MemoryFileSink::new());

    let engine = SyncEngine::new(local, backend, file, SyncConfig::default());
    let store = engine.start().await;

    let applications = Arc::new(AtomicUsize::new(0));
    let applications_clone = Arc::clone(&applications);
    let _sub = store.subscribe(move |prefs| {
        // What the webview does with each notification
        let vars = theme::theme_vars(prefs.theme);
        assert!(!vars.is_empty());
        let _stack = theme::font_stack(prefs.font);
        applications_clone.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(applications.load(Ordering::SeqCst), 1);

    let mut edit = store.get();
    edit.theme = Theme::Warm;
    store.set(edit);
    engine.drain().await;

    assert_eq!(applications.load(Ordering::SeqCst), 2);
}
