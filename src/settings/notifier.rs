//! # Change Notifier
//!
//! Fans out "key changed" events from a [`PreferenceStore`] to any number of
//! [`Subscription`]s.
//!
//! ## Backpressure
//!
//! Each subscription holds a single pending slot. A new change overwrites
//! an unconsumed one, so a stalled subscriber sees only the latest key and
//! the writer never blocks on it.
//!
//! ```text
//! set(K1)  ──▶ slot = K1
//! set(K2)  ──▶ slot = K2        (K1 dropped)
//! recv()   ◀── K2, slot = empty
//! ```
//!
//! ## Unsubscribe ordering
//!
//! Unsubscribe is linearized before any later delivery. The closed flag and
//! the pending slot share one mutex, so a callback that races with
//! [`Subscription::unsubscribe`] either stores its key before the flag is
//! set (and the key is discarded with the slot) or sees the flag and does
//! nothing. Once `unsubscribe` returns, nothing is ever published into the
//! subscription again.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::{Condvar, Mutex};

use crate::{ChangeCallback, ListenerId, PreferenceStore};

// ============================================================================
// Listener registry (store side)
// ============================================================================

/// Change listeners of one preference store.
///
/// Callbacks are invoked outside the registry lock, on the writing thread,
/// so a callback may itself register or unregister listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<u64, ChangeCallback>>,
}

impl ListenerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener.
    pub fn register(&self, callback: ChangeCallback) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().insert(id, callback);
        ListenerId(id)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        self.listeners.lock().remove(&id.0).is_some()
    }

    /// Tell every listener that `key` changed.
    pub fn notify(&self, key: &str) {
        let snapshot: Vec<ChangeCallback> = self.listeners.lock().values().cloned().collect();
        for callback in snapshot {
            callback(key);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

// ============================================================================
// Subscription (consumer side)
// ============================================================================

#[derive(Default)]
struct SlotState {
    pending: Option<String>,
    closed: bool,
}

#[derive(Default)]
struct Slot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl Slot {
    fn publish(&self, key: &str) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.pending = Some(key.to_owned());
        self.ready.notify_all();
    }
}

/// A live feed of changed setting keys.
///
/// Created by [`SettingsStore::observe_changes`](crate::SettingsStore::observe_changes).
/// `Send + Sync`: one thread may block in [`recv`](Self::recv) while another
/// calls [`unsubscribe`](Self::unsubscribe), which wakes it with `None`.
/// Dropping the subscription unsubscribes.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use torrent_storage::{MemoryPreferences, PreferenceStore, Subscription};
///
/// let store: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferences::new());
/// let changes = Subscription::new(store.clone());
/// store.set("a", torrent_storage::PrefValue::Int(1)).unwrap();
/// store.set("b", torrent_storage::PrefValue::Int(2)).unwrap();
/// assert_eq!(changes.try_recv().as_deref(), Some("b"));
/// assert_eq!(changes.try_recv(), None);
/// ```
pub struct Subscription {
    slot: Arc<Slot>,
    store: Arc<dyn PreferenceStore>,
    id: ListenerId,
}

impl Subscription {
    /// Register a listener on `store` and return its feed.
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        let slot = Arc::new(Slot::default());
        let sink = Arc::clone(&slot);
        let id = store.on_change(Arc::new(move |key: &str| sink.publish(key)));
        debug!("subscribed to setting changes as listener {}", id.0);
        Self { slot, store, id }
    }

    /// Wait for the next changed key. `None` once unsubscribed.
    pub fn recv(&self) -> Option<String> {
        let mut state = self.slot.state.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(key) = state.pending.take() {
                return Some(key);
            }
            self.slot.ready.wait(&mut state);
        }
    }

    /// Like [`recv`](Self::recv), giving up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<String> {
        let deadline = Instant::now() + timeout;
        let mut state = self.slot.state.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(key) = state.pending.take() {
                return Some(key);
            }
            if self.slot.ready.wait_until(&mut state, deadline).timed_out() {
                if state.closed {
                    return None;
                }
                return state.pending.take();
            }
        }
    }

    /// The pending key, if any, without waiting.
    pub fn try_recv(&self) -> Option<String> {
        let mut state = self.slot.state.lock();
        if state.closed {
            return None;
        }
        state.pending.take()
    }

    /// Blocking iterator over changed keys, ending on unsubscribe.
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::from_fn(move || self.recv())
    }

    /// Returns `true` once [`unsubscribe`](Self::unsubscribe) has run.
    pub fn is_closed(&self) -> bool {
        self.slot.state.lock().closed
    }

    /// Stop receiving changes and deregister from the store.
    ///
    /// Idempotent; returns `false` if already unsubscribed. Any pending key
    /// is discarded and blocked receivers wake with `None`.
    pub fn unsubscribe(&self) -> bool {
        {
            let mut state = self.slot.state.lock();
            if state.closed {
                return false;
            }
            state.closed = true;
            state.pending = None;
            self.slot.ready.notify_all();
        }
        self.store.unregister(self.id);
        debug!("listener {} unsubscribed", self.id.0);
        true
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryPreferences, PrefValue};
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    fn store() -> Arc<dyn PreferenceStore> {
        Arc::new(MemoryPreferences::new())
    }

    #[test]
    fn registry_calls_every_listener() {
        let registry = ListenerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = hits.clone();
            registry.register(Arc::new(move |_: &str| {
                hits.fetch_add(1, Ordering::SeqCst);
            }));
        }
        registry.notify("k");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn registry_unregister_is_reported_once() {
        let registry = ListenerRegistry::new();
        let id = registry.register(Arc::new(|_: &str| {}));
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn callback_may_unregister_itself() {
        let registry = Arc::new(ListenerRegistry::new());
        let id = Arc::new(Mutex::new(None));
        let (r, i) = (registry.clone(), id.clone());
        let own = registry.register(Arc::new(move |_: &str| {
            if let Some(own) = i.lock().take() {
                r.unregister(own);
            }
        }));
        *id.lock() = Some(own);
        registry.notify("k");
        assert!(registry.is_empty());
    }

    #[test]
    fn stalled_subscriber_sees_latest_only() {
        let store = store();
        let sub = Subscription::new(store.clone());
        store.set("k1", PrefValue::Int(1)).unwrap();
        store.set("k2", PrefValue::Int(2)).unwrap();
        assert_eq!(sub.try_recv().as_deref(), Some("k2"));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn every_subscriber_gets_the_change() {
        let store = store();
        let a = Subscription::new(store.clone());
        let b = Subscription::new(store.clone());
        store.set("k", PrefValue::Bool(true)).unwrap();
        assert_eq!(a.try_recv().as_deref(), Some("k"));
        assert_eq!(b.try_recv().as_deref(), Some("k"));
    }

    #[test]
    fn unsubscribe_deregisters_and_discards_pending() {
        let store = store();
        let sub = Subscription::new(store.clone());
        store.set("k", PrefValue::Int(1)).unwrap();
        assert!(sub.unsubscribe());
        assert!(!sub.unsubscribe());
        store.set("k", PrefValue::Int(2)).unwrap();
        assert_eq!(sub.try_recv(), None);
        assert_eq!(sub.recv(), None);
    }

    #[test]
    fn drop_deregisters_listener() {
        let prefs = Arc::new(MemoryPreferences::new());
        let sub = Subscription::new(prefs.clone());
        assert_eq!(prefs.listener_count(), 1);
        drop(sub);
        assert_eq!(prefs.listener_count(), 0);
    }

    #[test]
    fn recv_wakes_on_write_from_other_thread() {
        let store = store();
        let sub = Subscription::new(store.clone());
        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            store.set("remote", PrefValue::Long(1)).unwrap();
        });
        assert_eq!(sub.recv_timeout(Duration::from_secs(5)).as_deref(), Some("remote"));
        writer.join().unwrap();
    }

    #[test]
    fn unsubscribe_wakes_blocked_receiver() {
        let sub = Arc::new(Subscription::new(store()));
        let rx = sub.clone();
        let waiter = thread::spawn(move || rx.recv());
        thread::sleep(Duration::from_millis(20));
        sub.unsubscribe();
        assert_eq!(waiter.join().unwrap(), None);
    }

    #[test]
    fn recv_timeout_expires() {
        let sub = Subscription::new(store());
        assert_eq!(sub.recv_timeout(Duration::from_millis(10)), None);
    }
}
