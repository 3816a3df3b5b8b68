use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::value::GroupId;

static LEADING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+").expect("static regex is valid"));

/// Format used for [`ReceivedMessage::time`].
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Inbound message as recorded in the message log.
pub struct ReceivedMessage {
    /// Number of the receiving account.
    pub phone: String,
    /// Sender number with the JID suffix removed.
    pub from: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// UTC time formatted with [`TIME_FORMAT`].
    pub time: String,
    /// Sender nickname.
    pub name: String,
    pub data: String,
}

impl ReceivedMessage {
    /// Build a log entry from the arguments of an inbound message event.
    pub fn from_event(
        phone: impl Into<String>,
        from: &str,
        id: impl Into<String>,
        kind: impl Into<String>,
        timestamp: i64,
        name: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            phone: phone.into(),
            from: sender_number(from).to_owned(),
            id: id.into(),
            kind: kind.into(),
            time: format_timestamp(timestamp),
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Leading digits of a JID (`34600111222@s.whatsapp.net` -> `34600111222`).
///
/// Input without leading digits, such as `status@broadcast`, is returned unchanged
/// instead of collapsing to an empty sender.
pub fn sender_number(jid: &str) -> &str {
    LEADING_DIGITS
        .find(jid)
        .map(|found| found.as_str())
        .unwrap_or(jid)
}

/// Unix seconds rendered with [`TIME_FORMAT`] in UTC. Out-of-range values are rendered as
/// the bare number.
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(time) => time.format(TIME_FORMAT).to_string(),
        None => timestamp.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Group entry as reported by the group list event.
pub struct GroupInfo {
    pub id: GroupId,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Group the account belongs to or owns, formatted for display.
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

impl From<GroupInfo> for Group {
    fn from(value: GroupInfo) -> Self {
        Self {
            name: format!("GROUP: {}", value.subject),
            id: value.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_number_keeps_leading_digits() {
        assert_eq!(sender_number("34600111222@s.whatsapp.net"), "34600111222");
        assert_eq!(sender_number("34600111222-1400000000@g.us"), "34600111222");
        assert_eq!(sender_number("34600111222"), "34600111222");
        assert_eq!(sender_number("status@broadcast"), "status@broadcast");
        assert_eq!(sender_number(""), "");
    }

    #[test]
    fn timestamp_is_formatted_in_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13:20");
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn received_message_from_event() {
        let message = ReceivedMessage::from_event(
            "34600000000",
            "34600111222@s.whatsapp.net",
            "msg-1",
            "text",
            1_700_000_000,
            "Alice",
            "hello",
        );
        assert_eq!(message.from, "34600111222");
        assert_eq!(message.time, "2023-11-14 22:13:20");
        assert_eq!(message.kind, "text");
        assert_eq!(message.data, "hello");
    }

    #[test]
    fn group_name_is_prefixed() {
        let group = Group::from(GroupInfo {
            id: GroupId::new("34600111222-1400000000@g.us"),
            subject: "Family".to_owned(),
        });
        assert_eq!(group.name, "GROUP: Family");
        assert_eq!(group.id.as_str(), "34600111222-1400000000@g.us");
    }
}
