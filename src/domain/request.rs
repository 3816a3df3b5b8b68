use std::fmt;

use crate::domain::validation::ValidationError;
use crate::domain::value::PhoneNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Payload kind of an outbound message.
pub enum MessageKind {
    Text,
    Image,
    Audio,
    Video,
    Location,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Outbound message payload.
///
/// Media variants carry a path or URL the protocol client knows how to upload.
pub enum Message {
    Text(String),
    Image(String),
    Audio(String),
    Video(String),
    Location(Location),
}

impl Message {
    /// Text message. Rejects text that is empty after trimming.
    pub fn text(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: "message" });
        }
        Ok(Self::Text(value))
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Text(_) => MessageKind::Text,
            Self::Image(_) => MessageKind::Image,
            Self::Audio(_) => MessageKind::Audio,
            Self::Video(_) => MessageKind::Video,
            Self::Location(_) => MessageKind::Location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Shared location.
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Channel the verification code is delivered through.
pub enum CodeRequestMethod {
    #[default]
    Sms,
    Voice,
}

impl CodeRequestMethod {
    /// Field name used in failure records (`method`).
    pub const FIELD: &'static str = "method";

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Voice => "voice",
        }
    }
}

impl fmt::Display for CodeRequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipient list for per-recipient sends and broadcasts.
///
/// Invariant: at least one recipient. Duplicates are kept in order; per-recipient sends
/// report only the last id assigned to a repeated number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients(Vec<PhoneNumber>);

impl Recipients {
    pub fn new(recipients: Vec<PhoneNumber>) -> Result<Self, ValidationError> {
        if recipients.is_empty() {
            return Err(ValidationError::Empty {
                field: PhoneNumber::FIELD,
            });
        }
        Ok(Self(recipients))
    }

    pub fn as_slice(&self) -> &[PhoneNumber] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<PhoneNumber> for Recipients {
    fn from(value: PhoneNumber) -> Self {
        Self(vec![value])
    }
}

impl TryFrom<Vec<PhoneNumber>> for Recipients {
    type Error = ValidationError;

    fn try_from(value: Vec<PhoneNumber>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
