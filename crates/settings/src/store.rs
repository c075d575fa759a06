//! Observable settings container
//!
//! Holds exactly one current [`Preferences`] value. `set` replaces the
//! value and synchronously notifies every subscriber, in subscription
//! order, before it returns; consumers therefore never observe a window
//! where the store and a freshly notified subscriber disagree. Callbacks
//! receive a shared reference and take their own clone if they need a
//! snapshot.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::warn;

use schema::Preferences;

type Callback = Arc<dyn Fn(&Preferences) + Send + Sync>;

struct Inner {
    current: RwLock<Preferences>,
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_id: AtomicU64,
}

/// Publish/subscribe container for the canonical preference record
///
/// Cheap to clone; all clones share the same value and subscriber list.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<Inner>,
}

impl SettingsStore {
    /// Create a store holding the given record
    pub fn new(initial: Preferences) -> Self {
        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(initial),
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Snapshot of the latest published value
    pub fn get(&self) -> Preferences {
        self.inner.current.read().clone()
    }

    /// Replace the value and notify all subscribers before returning
    pub fn set(&self, value: Preferences) {
        *self.inner.current.write() = value.clone();

        // Snapshot the list so callbacks run without the lock held and a
        // callback may itself subscribe or unsubscribe.
        let callbacks: Vec<Callback> = {
            let subscribers = self.inner.subscribers.lock();
            subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for callback in callbacks {
            invoke(&callback, &value);
        }
    }

    /// Replace the value via a function of the current one
    pub fn update(&self, f: impl FnOnce(Preferences) -> Preferences) {
        let next = f(self.get());
        self.set(next);
    }

    /// Register a subscriber
    ///
    /// The callback is immediately invoked once with the current value,
    /// then again after every `set`. The returned handle deregisters it.
    pub fn subscribe(&self, f: impl Fn(&Preferences) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let callback: Callback = Arc::new(f);
        self.inner.subscribers.lock().push((id, Arc::clone(&callback)));

        let current = self.get();
        invoke(&callback, &current);

        Subscription { id, inner: Arc::downgrade(&self.inner) }
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

/// Isolate one callback invocation: a panicking subscriber must not
/// prevent its siblings from running.
fn invoke(callback: &Callback, value: &Preferences) {
    if catch_unwind(AssertUnwindSafe(|| callback(value))).is_err() {
        warn!("settings subscriber panicked during notification");
    }
}

/// Handle deregistering a subscriber
///
/// Dropping the handle does not deregister; call [`Subscription::unsubscribe`].
pub struct Subscription {
    id: u64,
    inner: Weak<Inner>,
}

impl Subscription {
    /// Deregister the subscriber this handle was returned for
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.subscribers.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::Theme;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_get_returns_initial() {
        let store = SettingsStore::new(Preferences::default());
        assert_eq!(store.get(), Preferences::default());
    }

    #[test]
    fn test_set_replaces_value() {
        let store = SettingsStore::new(Preferences::default());
        let next = Preferences { theme: Theme::Dark, ..Default::default() };

        store.set(next.clone());
        assert_eq!(store.get(), next);
    }

    #[test]
    fn test_subscribe_replays_current_value() {
        let store = SettingsStore::new(Preferences::default());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        let _sub = store.subscribe(move |prefs| {
            seen_clone.lock().push(prefs.clone());
        });

        assert_eq!(*seen.lock(), vec![Preferences::default()]);
    }

    #[test]
    fn test_set_notifies_in_subscription_order() {
        let store = SettingsStore::new(Preferences::default());
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["a", "b", "c"] {
            let order = Arc::clone(&order);
            let _ = store.subscribe(move |_| order.lock().push(label));
        }
        order.lock().clear();

        store.set(Preferences { theme: Theme::Light, ..Default::default() });
        assert_eq!(*order.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_one_notification_per_set_even_when_equal() {
        let store = SettingsStore::new(Preferences::default());
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = Arc::clone(&count);
        let _sub = store.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        // 1 from the subscribe replay
        assert_eq!(count.load(Ordering::SeqCst), 1);

        let same = Preferences::default();
        store.set(same.clone());
        store.set(same);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(store.get(), Preferences::default());
    }

    #[test]
    fn test_panicking_subscriber_does_not_block_siblings() {
        let store = SettingsStore::new(Preferences::default());
        let reached = Arc::new(AtomicUsize::new(0));

        let _a = store.subscribe(|prefs| {
            if prefs.theme == Theme::Dark {
                panic!("subscriber A blew up");
            }
        });
        let reached_clone = Arc::clone(&reached);
        let _b = store.subscribe(move |prefs| {
            if prefs.theme == Theme::Dark {
                reached_clone.fetch_add(1, Ordering::SeqCst);
            }
        });

        store.set(Preferences { theme: Theme::Dark, ..Default::default() });
        assert_eq!(reached.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = SettingsStore::new(Preferences::default());
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = Arc::clone(&count);
        let sub = store.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(store.subscriber_count(), 1);

        sub.unsubscribe();
        assert_eq!(store.subscriber_count(), 0);

        store.set(Preferences { theme: Theme::Dark, ..Default::default() });
        assert_eq!(count.load(Ordering::SeqCst), 1); // only the replay
    }

    #[test]
    fn test_clones_share_state() {
        let store = SettingsStore::new(Preferences::default());
        let other = store.clone();

        other.set(Preferences { privacy_lock: true, ..Default::default() });
        assert!(store.get().privacy_lock);
    }

    #[test]
    fn test_update_applies_function() {
        let store = SettingsStore::new(Preferences::default());
        store.update(|mut prefs| {
            prefs.notif_sound = false;
            prefs
        });
        assert!(!store.get().notif_sound);
    }
}
