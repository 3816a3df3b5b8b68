//! Event dispatcher the protocol client emits into.

use std::any::Any;
use std::sync::Arc;

use tracing::{debug, warn};

use super::callback::CallbackRegistry;
use super::event::{EventName, ProtocolEvent};

/// Event dispatcher that manages callback bindings and event emission.
///
/// Cloning is cheap and every clone shares the same bindings, so the protocol client and
/// the facade can each hold one.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    callbacks: Arc<CallbackRegistry>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `event`. The returned id can be passed to [`Self::unbind`].
    pub fn bind(
        &self,
        event: EventName,
        callback: impl Fn(&ProtocolEvent) + Send + Sync + 'static,
    ) -> u64 {
        debug!(event = %event, "binding callback");
        self.callbacks.add(event, callback)
    }

    /// Unbind callbacks. `None` acts as a wildcard.
    pub fn unbind(&self, event: Option<EventName>, callback_id: Option<u64>) {
        debug!(?event, ?callback_id, "unbinding callback");
        self.callbacks.remove(event, callback_id);
    }

    pub fn unbind_all(&self) {
        debug!("unbinding all callbacks");
        self.callbacks.clear();
    }

    /// Run every callback bound to the event, synchronously and in registration order.
    ///
    /// A panicking callback is logged and the remaining callbacks still run.
    pub fn emit(&self, event: &ProtocolEvent) {
        let name = event.name();
        let callbacks = self.callbacks.get(name);
        if callbacks.is_empty() {
            debug!(event = %name, "no callbacks bound");
            return;
        }

        for callback in callbacks {
            if let Err(payload) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                callback.invoke(event);
            })) {
                warn!(
                    event = %name,
                    id = callback.id,
                    "callback panicked: {}",
                    panic_message(&*payload)
                );
            }
        }
    }

    pub fn has_callbacks(&self, event: EventName) -> bool {
        self.callbacks.has_callbacks(event)
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.callback_count()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
