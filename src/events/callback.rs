//! Callback registry keyed by event name.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::event::{EventName, ProtocolEvent};

/// Shared handler invoked with each emitted event.
pub type CallbackFn = Arc<dyn Fn(&ProtocolEvent) + Send + Sync + 'static>;

/// Handler together with the id returned by [`CallbackRegistry::add`].
#[derive(Clone)]
pub struct Callback {
    pub id: u64,
    pub callback: CallbackFn,
}

impl Callback {
    pub fn new(id: u64, callback: impl Fn(&ProtocolEvent) + Send + Sync + 'static) -> Self {
        Self {
            id,
            callback: Arc::new(callback),
        }
    }

    pub fn invoke(&self, event: &ProtocolEvent) {
        (self.callback)(event);
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callback").field("id", &self.id).finish()
    }
}

/// Handlers grouped by [`EventName`], kept in registration order.
#[derive(Debug)]
pub struct CallbackRegistry {
    callbacks: RwLock<BTreeMap<EventName, Vec<Callback>>>,
    next_id: AtomicU64,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Add a callback for a specific event
    pub fn add(
        &self,
        event: EventName,
        callback: impl Fn(&ProtocolEvent) + Send + Sync + 'static,
    ) -> u64 {
        let id = self.next_id();
        self.callbacks
            .write()
            .entry(event)
            .or_default()
            .push(Callback::new(id, callback));
        id
    }

    /// Snapshot of the callbacks for an event, in registration order.
    ///
    /// The lock is released before the snapshot is returned, so callbacks may register
    /// further callbacks while running.
    pub fn get(&self, event: EventName) -> Vec<Callback> {
        self.callbacks
            .read()
            .get(&event)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove callbacks. `None` acts as a wildcard for either argument.
    pub fn remove(&self, event: Option<EventName>, callback_id: Option<u64>) {
        let mut callbacks = self.callbacks.write();
        match (event, callback_id) {
            (Some(name), Some(id)) => {
                if let Some(list) = callbacks.get_mut(&name) {
                    list.retain(|cb| cb.id != id);
                }
            }
            (Some(name), None) => {
                callbacks.remove(&name);
            }
            (None, Some(id)) => {
                for list in callbacks.values_mut() {
                    list.retain(|cb| cb.id != id);
                }
            }
            (None, None) => callbacks.clear(),
        }
    }

    pub fn clear(&self) {
        self.callbacks.write().clear();
    }

    pub fn has_callbacks(&self, event: EventName) -> bool {
        self.callbacks
            .read()
            .get(&event)
            .is_some_and(|list| !list.is_empty())
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.read().values().map(Vec::len).sum()
    }
}
