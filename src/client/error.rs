use std::error::Error as StdError;

use crate::domain::{FailureRecord, Response, ValidationError};

/// Boxed error raised by a protocol client.
pub type ProtocolError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Category of a [`ResponseError`]. Categories carry no data of their own.
pub enum ResponseErrorKind {
    /// Server-reported failure without a more specific category, including refused code
    /// requests.
    Response,
    /// A code was requested too recently; wait `retry_after` seconds.
    TooRecent,
    /// Too many wrong codes were tried; wait `retry_after` seconds.
    TooManyGuesses,
    /// The registration code was refused.
    CodeRegisterFailed,
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
/// Failure reported by the server, with the [`Response`] describing it.
pub struct ResponseError {
    kind: ResponseErrorKind,
    message: String,
    response: Option<Response>,
    code: i64,
    #[source]
    source: Option<ProtocolError>,
}

impl ResponseError {
    pub fn new(kind: ResponseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            response: None,
            code: 0,
            source: None,
        }
    }

    pub fn with_response(mut self, response: Response) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    pub fn with_source(mut self, source: ProtocolError) -> Self {
        self.source = Some(source);
        self
    }

    /// Code request refused because the previous one is too recent.
    pub fn too_recent(record: FailureRecord) -> Self {
        let message = format!(
            "code requested too recently, retry in {} minutes ({})",
            retry_minutes(record.retry_after.unwrap_or_default()),
            record.reason
        );
        Self::classified(ResponseErrorKind::TooRecent, message, record)
    }

    /// Code request refused after too many wrong guesses.
    pub fn too_many_guesses(record: FailureRecord) -> Self {
        let message = format!(
            "too many wrong codes, retry in {} minutes ({})",
            retry_minutes(record.retry_after.unwrap_or_default()),
            record.reason
        );
        Self::classified(ResponseErrorKind::TooManyGuesses, message, record)
    }

    /// Code request refused for any other reason.
    pub fn code_request_failed(record: FailureRecord) -> Self {
        let message = match record.param.as_deref() {
            Some(param) => format!("code request failed: {} (param {param})", record.reason),
            None => format!("code request failed: {}", record.reason),
        };
        Self::classified(ResponseErrorKind::Response, message, record)
    }

    /// Registration code refused.
    pub fn code_register_failed(record: FailureRecord) -> Self {
        let message = format!(
            "code registration failed: {} (status {}, retry in {} minutes)",
            record.reason,
            record.status,
            retry_minutes(record.retry_after.unwrap_or_default())
        );
        Self::classified(ResponseErrorKind::CodeRegisterFailed, message, record)
    }

    fn classified(kind: ResponseErrorKind, message: String, record: FailureRecord) -> Self {
        let mut response = Response::failure(record);
        response.set_exception_message(Some(message.clone()));
        Self::new(kind, message).with_response(response)
    }

    pub fn kind(&self) -> ResponseErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn into_response(self) -> Option<Response> {
        self.response
    }

    pub fn code(&self) -> i64 {
        self.code
    }
}

/// Seconds rounded to the nearest whole minute.
pub(crate) fn retry_minutes(seconds: u64) -> u64 {
    seconds / 60 + u64::from(seconds % 60 >= 30)
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`crate::WhatsAppClient`].
pub enum WhatsAppError {
    /// The server reported a classified failure.
    #[error("{0}")]
    Response(#[from] ResponseError),

    /// The protocol client failed without a classified failure event.
    #[error("protocol error: {0}")]
    Protocol(#[source] ProtocolError),

    /// Connecting requires a password; obtain one through code registration first.
    #[error("no password configured")]
    MissingPassword,

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl WhatsAppError {
    /// The attached response for classified failures.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Response(err) => err.response(),
            _ => None,
        }
    }

    pub fn response_kind(&self) -> Option<ResponseErrorKind> {
        match self {
            Self::Response(err) => Some(err.kind()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::domain::{CodeRequestMethod, PhoneNumber};

    fn phone() -> PhoneNumber {
        PhoneNumber::new("34600111222").unwrap()
    }

    #[test]
    fn retry_minutes_rounds_to_nearest() {
        assert_eq!(retry_minutes(0), 0);
        assert_eq!(retry_minutes(29), 0);
        assert_eq!(retry_minutes(30), 1);
        assert_eq!(retry_minutes(120), 2);
        assert_eq!(retry_minutes(3599), 60);
        assert_eq!(retry_minutes(u64::MAX), u64::MAX / 60);
        assert_eq!(retry_minutes(u64::MAX - 15), u64::MAX / 60);
    }

    #[test]
    fn too_recent_mentions_minutes_and_carries_failure() {
        let err = ResponseError::too_recent(FailureRecord::throttled(
            phone(),
            CodeRequestMethod::Sms,
            "too_recent",
            120,
        ));
        assert_eq!(err.kind(), ResponseErrorKind::TooRecent);
        assert!(err.to_string().contains('2'), "{err}");
        assert_eq!(
            err.to_string(),
            "code requested too recently, retry in 2 minutes (too_recent)"
        );

        let response = err.response().unwrap();
        assert_eq!(response.exception_message(), Some(err.message()));
        assert_eq!(response.status(), Some("fail"));
        assert_eq!(response.fail_reason(), Some("too_recent"));
        assert_eq!(response.retry_after(), Some(120));
    }

    #[test]
    fn too_many_guesses_kind() {
        let err = ResponseError::too_many_guesses(FailureRecord::throttled(
            phone(),
            CodeRequestMethod::Voice,
            "too_many_guesses",
            3600,
        ));
        assert_eq!(err.kind(), ResponseErrorKind::TooManyGuesses);
        assert!(err.message().contains("60 minutes"));
        assert!(err.into_response().unwrap().is_fail());
    }

    #[test]
    fn code_request_failed_is_generic_kind() {
        let err = ResponseError::code_request_failed(FailureRecord::with_param(
            phone(),
            CodeRequestMethod::Sms,
            "bad_param",
            "mcc",
        ));
        assert_eq!(err.kind(), ResponseErrorKind::Response);
        assert_eq!(err.to_string(), "code request failed: bad_param (param mcc)");
    }

    #[test]
    fn code_register_failed_kind() {
        let err = ResponseError::code_register_failed(FailureRecord::register_failed(
            phone(),
            "fail",
            "mismatch",
            90,
        ));
        assert_eq!(err.kind(), ResponseErrorKind::CodeRegisterFailed);
        assert_eq!(err.response().unwrap().fail_reason(), Some("mismatch"));
    }

    #[test]
    fn builder_fields_and_source() {
        let err = ResponseError::new(ResponseErrorKind::Response, "refused")
            .with_code(403)
            .with_source(Box::new(io::Error::other("socket closed")));
        assert_eq!(err.code(), 403);
        assert!(err.response().is_none());
        assert_eq!(
            StdError::source(&err).map(ToString::to_string).as_deref(),
            Some("socket closed")
        );
    }

    #[test]
    fn whatsapp_error_exposes_response() {
        let err = WhatsAppError::from(ResponseError::too_recent(FailureRecord::throttled(
            phone(),
            CodeRequestMethod::Sms,
            "too_recent",
            60,
        )));
        assert_eq!(err.response_kind(), Some(ResponseErrorKind::TooRecent));
        assert!(err.response().unwrap().is_fail());

        let err = WhatsAppError::Protocol(Box::new(io::Error::other("eof")));
        assert!(err.response().is_none());
        assert_eq!(err.to_string(), "protocol error: eof");
        assert_eq!(WhatsAppError::MissingPassword.to_string(), "no password configured");
    }
}
