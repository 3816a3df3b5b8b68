use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::ReceivedMessage;

#[derive(Debug, Clone, Default)]
/// Caller-owned buffer of inbound messages.
///
/// Clones share the same buffer: keep one and hand another to
/// [`crate::WhatsAppClient::with_message_log`].
pub struct MessageLog {
    entries: Arc<Mutex<Vec<ReceivedMessage>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: ReceivedMessage) {
        self.entries.lock().push(message);
    }

    /// Copy of the buffered messages, oldest first.
    pub fn snapshot(&self) -> Vec<ReceivedMessage> {
        self.entries.lock().clone()
    }

    /// Remove and return the buffered messages, oldest first.
    pub fn drain(&self) -> Vec<ReceivedMessage> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: &str) -> ReceivedMessage {
        ReceivedMessage::from_event("1", "2@s.whatsapp.net", id, "text", 0, "n", "d")
    }

    #[test]
    fn clones_share_entries_and_drain_empties() {
        let log = MessageLog::new();
        let handle = log.clone();
        handle.push(message("a"));
        handle.push(message("b"));

        assert_eq!(log.len(), 2);
        let ids: Vec<_> = log.snapshot().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, ["a", "b"]);

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(handle.is_empty());
    }
}
