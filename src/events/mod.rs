//! Protocol events and the dispatcher handlers are bound on.

mod callback;
mod dispatcher;
mod event;

pub use callback::{Callback, CallbackFn, CallbackRegistry};
pub use dispatcher::EventDispatcher;
pub use event::{EventName, ProtocolEvent};
