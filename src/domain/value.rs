use std::fmt;

use phonenumber::country;
use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
/// WhatsApp account number: country code followed by the subscriber number.
///
/// Invariant: ASCII digits only, no leading `+`. Surrounding whitespace and a single
/// leading `+` are stripped by [`PhoneNumber::new`]; use [`PhoneNumber::parse`] to
/// normalize national or formatted input through `phonenumber`.
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Field name used in failure records (`phone`).
    pub const FIELD: &'static str = "phone";

    /// Create a validated number from already-international digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidPhoneNumber {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(digits.to_owned()))
    }

    /// Parse and normalize a phone number through E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, raw).map_err(|_| {
            ValidationError::InvalidPhoneNumber {
                input: raw.to_owned(),
            }
        })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();
        Self::new(e164)
    }

    /// Digits as sent to the protocol client.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Display name announced to contacts.
///
/// Invariant: non-empty after trimming.
pub struct Nickname(String);

impl Nickname {
    /// Configuration field name (`nickname`).
    pub const FIELD: &'static str = "nickname";

    /// Create a validated [`Nickname`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated nickname.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// Account password issued by the registration flow.
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
pub struct Password(String);

impl Password {
    /// Configuration field name (`password`).
    pub const FIELD: &'static str = "password";

    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Verification code received by SMS or voice call.
///
/// Invariant: ASCII digits only. The `123-456` form shown to users is accepted and the
/// separator dropped.
pub struct RegistrationCode(String);

impl RegistrationCode {
    /// Field name used by the registration call (`code`).
    pub const FIELD: &'static str = "code";

    /// Create a validated [`RegistrationCode`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        let code: String = trimmed.chars().filter(|c| *c != '-').collect();
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidCode {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(code))
    }

    /// Borrow the digits of the code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Message id assigned by the protocol client to an outbound message.
pub struct MessageId(String);

impl MessageId {
    /// Wrap an id exactly as the protocol client reported it; no validation is applied.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Group JID as reported by the group list event.
pub struct GroupId(String);

impl GroupId {
    /// Wrap a group JID such as `1234567890-1400000000@g.us`, kept verbatim.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
