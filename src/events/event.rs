use std::fmt;

use crate::domain::{CodeRequestMethod, GroupInfo, PhoneNumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Names of the events a protocol client emits.
pub enum EventName {
    Connect,
    GetMessage,
    GetGroups,
    CodeRequestFailedTooRecent,
    CodeRequestFailedTooManyGuesses,
    CodeRequestFailed,
    CodeRegisterFailed,
}

impl EventName {
    pub const ALL: [EventName; 7] = [
        Self::Connect,
        Self::GetMessage,
        Self::GetGroups,
        Self::CodeRequestFailedTooRecent,
        Self::CodeRequestFailedTooManyGuesses,
        Self::CodeRequestFailed,
        Self::CodeRegisterFailed,
    ];

    /// Wire name of the event (`onGetMessage`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "onConnect",
            Self::GetMessage => "onGetMessage",
            Self::GetGroups => "onGetGroups",
            Self::CodeRequestFailedTooRecent => "onCodeRequestFailedTooRecent",
            Self::CodeRequestFailedTooManyGuesses => "onCodeRequestFailedTooManyGuesses",
            Self::CodeRequestFailed => "onCodeRequestFailed",
            Self::CodeRegisterFailed => "onCodeRegisterFailed",
        }
    }

    /// Inverse of [`EventName::as_str`].
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.as_str() == name)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Event emitted by a protocol client, carrying the callback arguments.
pub enum ProtocolEvent {
    /// The session is established.
    Connect { phone: PhoneNumber },

    /// Inbound message.
    GetMessage {
        phone: String,
        from: String,
        id: String,
        kind: String,
        /// Unix seconds.
        time: i64,
        name: String,
        data: String,
    },

    /// Reply to a group list request.
    GetGroups {
        phone: String,
        groups: Vec<GroupInfo>,
    },

    /// Code request refused because a previous one was too recent.
    CodeRequestFailedTooRecent {
        phone: PhoneNumber,
        method: CodeRequestMethod,
        reason: String,
        retry_after: u64,
    },

    /// Code request refused after too many wrong guesses.
    CodeRequestFailedTooManyGuesses {
        phone: PhoneNumber,
        method: CodeRequestMethod,
        reason: String,
        retry_after: u64,
    },

    /// Code request refused for any other reason.
    CodeRequestFailed {
        phone: PhoneNumber,
        method: CodeRequestMethod,
        reason: String,
        param: String,
    },

    /// Code registration refused.
    CodeRegisterFailed {
        phone: PhoneNumber,
        status: String,
        reason: String,
        retry_after: u64,
    },
}

impl ProtocolEvent {
    pub fn name(&self) -> EventName {
        match self {
            Self::Connect { .. } => EventName::Connect,
            Self::GetMessage { .. } => EventName::GetMessage,
            Self::GetGroups { .. } => EventName::GetGroups,
            Self::CodeRequestFailedTooRecent { .. } => EventName::CodeRequestFailedTooRecent,
            Self::CodeRequestFailedTooManyGuesses { .. } => {
                EventName::CodeRequestFailedTooManyGuesses
            }
            Self::CodeRequestFailed { .. } => EventName::CodeRequestFailed,
            Self::CodeRegisterFailed { .. } => EventName::CodeRegisterFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for name in EventName::ALL {
            assert_eq!(EventName::from_wire(name.as_str()), Some(name));
        }
        assert_eq!(EventName::from_wire("onSomethingElse"), None);
        assert_eq!(EventName::GetMessage.to_string(), "onGetMessage");
    }

    #[test]
    fn event_reports_its_name() {
        let event = ProtocolEvent::GetGroups {
            phone: "34600000000".to_owned(),
            groups: Vec::new(),
        };
        assert_eq!(event.name(), EventName::GetGroups);
    }
}
