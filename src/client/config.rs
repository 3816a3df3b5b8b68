use crate::domain::{Nickname, Password, PhoneNumber, ValidationError};

pub const ENV_NUMBER: &str = "WHATSAPP_NUMBER";
pub const ENV_NICKNAME: &str = "WHATSAPP_NICKNAME";
pub const ENV_PASSWORD: &str = "WHATSAPP_PASSWORD";
pub const ENV_DEBUG: &str = "WHATSAPP_DEBUG";
pub const ENV_IDENTITY_FILE: &str = "WHATSAPP_IDENTITY_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Account settings handed to the protocol client when connecting.
pub struct ClientConfig {
    number: PhoneNumber,
    nickname: Nickname,
    password: Option<Password>,
    debug: bool,
    identity_file: bool,
}

impl ClientConfig {
    /// Start building a configuration. The password may be left out until the account
    /// has been registered.
    pub fn builder(number: PhoneNumber, nickname: Nickname) -> ClientConfigBuilder {
        ClientConfigBuilder::new(number, nickname)
    }

    /// Read the configuration from `WHATSAPP_*` environment variables.
    ///
    /// `WHATSAPP_NUMBER` and `WHATSAPP_NICKNAME` are required; `WHATSAPP_PASSWORD`,
    /// `WHATSAPP_DEBUG` and `WHATSAPP_IDENTITY_FILE` are optional.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ValidationError> {
        let required = |var: &'static str| lookup(var).ok_or(ValidationError::MissingEnv { var });

        let number = PhoneNumber::new(required(ENV_NUMBER)?)?;
        let nickname = Nickname::new(required(ENV_NICKNAME)?)?;
        let mut builder = Self::builder(number, nickname)
            .debug(lookup(ENV_DEBUG).is_some_and(|value| parse_flag(&value)))
            .identity_file(lookup(ENV_IDENTITY_FILE).is_some_and(|value| parse_flag(&value)));
        if let Some(password) = lookup(ENV_PASSWORD).filter(|value| !value.is_empty()) {
            builder = builder.password(Password::new(password)?);
        }
        Ok(builder.build())
    }

    pub fn number(&self) -> &PhoneNumber {
        &self.number
    }

    pub fn nickname(&self) -> &Nickname {
        &self.nickname
    }

    pub fn password(&self) -> Option<&Password> {
        self.password.as_ref()
    }

    /// Whether the protocol client should log its traffic.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Whether the protocol client should persist its identity to a file.
    pub fn identity_file(&self) -> bool {
        self.identity_file
    }

    pub(crate) fn set_password(&mut self, password: Password) {
        self.password = Some(password);
    }
}

#[derive(Debug, Clone)]
/// Builder for [`ClientConfig`].
pub struct ClientConfigBuilder {
    number: PhoneNumber,
    nickname: Nickname,
    password: Option<Password>,
    debug: bool,
    identity_file: bool,
}

impl ClientConfigBuilder {
    pub fn new(number: PhoneNumber, nickname: Nickname) -> Self {
        Self {
            number,
            nickname,
            password: None,
            debug: false,
            identity_file: false,
        }
    }

    pub fn password(mut self, password: Password) -> Self {
        self.password = Some(password);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn identity_file(mut self, identity_file: bool) -> Self {
        self.identity_file = identity_file;
        self
    }

    pub fn build(self) -> ClientConfig {
        ClientConfig {
            number: self.number,
            nickname: self.nickname,
            password: self.password,
            debug: self.debug,
            identity_file: self.identity_file,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn builder_defaults() {
        let config = ClientConfig::builder(
            PhoneNumber::new("34600000000").unwrap(),
            Nickname::new("bot").unwrap(),
        )
        .build();
        assert_eq!(config.number().as_str(), "34600000000");
        assert_eq!(config.nickname().as_str(), "bot");
        assert!(config.password().is_none());
        assert!(!config.debug());
        assert!(!config.identity_file());
    }

    #[test]
    fn from_lookup_reads_all_fields() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_NUMBER, "+34600000000"),
            (ENV_NICKNAME, " bot "),
            (ENV_PASSWORD, "secret"),
            (ENV_DEBUG, "TRUE"),
            (ENV_IDENTITY_FILE, "0"),
        ]))
        .unwrap();
        assert_eq!(config.number().as_str(), "34600000000");
        assert_eq!(config.nickname().as_str(), "bot");
        assert_eq!(config.password().map(Password::as_str), Some("secret"));
        assert!(config.debug());
        assert!(!config.identity_file());
    }

    #[test]
    fn from_lookup_requires_number_and_nickname() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_NICKNAME, "bot")])).unwrap_err();
        assert_eq!(err, ValidationError::MissingEnv { var: ENV_NUMBER });

        let err = ClientConfig::from_lookup(lookup(&[(ENV_NUMBER, "34600000000")])).unwrap_err();
        assert_eq!(err, ValidationError::MissingEnv { var: ENV_NICKNAME });
    }

    #[test]
    fn from_lookup_treats_empty_password_as_absent() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_NUMBER, "34600000000"),
            (ENV_NICKNAME, "bot"),
            (ENV_PASSWORD, ""),
        ]))
        .unwrap();
        assert!(config.password().is_none());
    }

    #[test]
    fn flags_accept_common_spellings() {
        for value in ["1", "true", "Yes", " on "] {
            assert!(parse_flag(value), "{value}");
        }
        for value in ["0", "false", "", "enabled"] {
            assert!(!parse_flag(value), "{value}");
        }
    }
}
