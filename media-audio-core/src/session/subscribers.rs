use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

/// Handle returned by every event registration; pass it to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observer list for one event.
///
/// Callbacks are invoked from a snapshot taken under the lock, so a callback
/// may add or remove subscribers without deadlocking.
pub struct Subscribers<C: Clone> {
    entries: Mutex<Vec<(SubscriptionId, C)>>,
}

impl<C: Clone> Subscribers<C> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, callback: C) -> SubscriptionId {
        let id = SubscriptionId(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, callback));
        id
    }

    /// Returns `false` if `id` was not registered here.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn has_any(&self) -> bool {
        !self.entries.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_any()
    }

    pub fn snapshot(&self) -> Vec<C> {
        self.entries.lock().iter().map(|(_, cb)| cb.clone()).collect()
    }
}

impl<C: Clone> Default for Subscribers<C> {
    fn default() -> Self {
        Self::new()
    }
}
