//! Uniform accessors over heterogeneous protocol results.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::request::CodeRequestMethod;
use crate::domain::value::PhoneNumber;

const STATUS: &str = "status";
const REASON: &str = "reason";
const RETRY_AFTER: &str = "retry_after";
const PARAM: &str = "param";

/// Status value written into failure records.
pub const STATUS_FAIL: &str = "fail";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Shape of the payload a [`Response`] was built from.
pub enum PayloadShape {
    /// Key/value mapping handed over as-is.
    Mapping,
    /// Record with named fields, flattened through `serde`.
    Record,
}

#[derive(Debug, Clone, PartialEq)]
/// Result of a protocol call.
///
/// Accessors behave the same for both payload shapes: a field that is not present is
/// reported as `None`, never as an error.
pub struct Response {
    shape: PayloadShape,
    payload: Map<String, Value>,
    exception_message: Option<String>,
}

impl Response {
    /// Wrap a key/value mapping.
    pub fn from_map(payload: Map<String, Value>) -> Self {
        Self {
            shape: PayloadShape::Mapping,
            payload,
            exception_message: None,
        }
    }

    /// Wrap a record. Anything that does not serialize into an object yields an empty
    /// record, so every property lookup returns `None`.
    pub fn from_record<T: Serialize>(record: &T) -> Self {
        let payload = match serde_json::to_value(record) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            shape: PayloadShape::Record,
            payload,
            exception_message: None,
        }
    }

    /// Build the failure record attached to classified errors.
    pub fn failure(record: FailureRecord) -> Self {
        Self::from_record(&record)
    }

    pub fn shape(&self) -> PayloadShape {
        self.shape
    }

    /// `status == "ok"`.
    pub fn is_ok(&self) -> bool {
        self.status() == Some("ok")
    }

    /// `status == "sent"`.
    pub fn is_sent(&self) -> bool {
        self.status() == Some("sent")
    }

    /// `status == "fail"`.
    pub fn is_fail(&self) -> bool {
        self.status() == Some(STATUS_FAIL)
    }

    pub fn status(&self) -> Option<&str> {
        self.property(STATUS).and_then(Value::as_str)
    }

    /// The `reason` field, when it is text.
    pub fn fail_reason(&self) -> Option<&str> {
        self.property(REASON).and_then(Value::as_str)
    }

    /// The `retry_after` field in seconds, when present.
    pub fn retry_after(&self) -> Option<u64> {
        self.property(RETRY_AFTER).and_then(Value::as_u64)
    }

    /// Look up a field by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Look up a field and deserialize it. `None` when missing or of another type.
    pub fn property_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.property(name)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Borrow the whole payload.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Replace the payload, keeping the wrapper.
    pub fn set_payload(&mut self, shape: PayloadShape, payload: Map<String, Value>) {
        self.shape = shape;
        self.payload = payload;
    }

    /// Message of the error this response was attached to, if any.
    pub fn exception_message(&self) -> Option<&str> {
        self.exception_message.as_deref()
    }

    pub fn set_exception_message(&mut self, message: Option<String>) {
        self.exception_message = message;
    }

    pub fn into_payload(self) -> Map<String, Value> {
        self.payload
    }
}

impl From<Map<String, Value>> for Response {
    fn from(value: Map<String, Value>) -> Self {
        Self::from_map(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Payload assembled from the arguments of a failure event.
pub struct FailureRecord {
    pub status: String,
    pub phone: PhoneNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl FailureRecord {
    pub const STATUS: &'static str = STATUS;
    pub const REASON: &'static str = REASON;
    pub const RETRY_AFTER: &'static str = RETRY_AFTER;
    pub const PARAM: &'static str = PARAM;

    /// Record for a code request refused with a retry-after delay.
    pub fn throttled(
        phone: PhoneNumber,
        method: CodeRequestMethod,
        reason: impl Into<String>,
        retry_after: u64,
    ) -> Self {
        Self {
            status: STATUS_FAIL.to_owned(),
            phone,
            method: Some(method.as_str().to_owned()),
            reason: reason.into(),
            retry_after: Some(retry_after),
            param: None,
        }
    }

    /// Record for a code request refused because of a request parameter.
    pub fn with_param(
        phone: PhoneNumber,
        method: CodeRequestMethod,
        reason: impl Into<String>,
        param: impl Into<String>,
    ) -> Self {
        Self {
            status: STATUS_FAIL.to_owned(),
            phone,
            method: Some(method.as_str().to_owned()),
            reason: reason.into(),
            retry_after: None,
            param: Some(param.into()),
        }
    }

    /// Record for a refused code registration. The status reported by the server is
    /// kept as-is.
    pub fn register_failed(
        phone: PhoneNumber,
        status: impl Into<String>,
        reason: impl Into<String>,
        retry_after: u64,
    ) -> Self {
        Self {
            status: status.into(),
            phone,
            method: None,
            reason: reason.into(),
            retry_after: Some(retry_after),
            param: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other:?}"),
        }
    }

    #[derive(Serialize)]
    struct RegisterResult {
        status: String,
        login: String,
        pw: String,
        expiration: u64,
    }

    #[test]
    fn ok_status_is_only_ok() {
        let response = Response::from_map(map(json!({ "status": "ok" })));
        assert!(response.is_ok());
        assert!(!response.is_sent());
        assert!(!response.is_fail());
        assert_eq!(response.shape(), PayloadShape::Mapping);
    }

    #[test]
    fn fail_status_exposes_reason() {
        let response = Response::from_map(map(json!({ "status": "fail", "reason": "R" })));
        assert!(response.is_fail());
        assert!(!response.is_ok());
        assert_eq!(response.fail_reason(), Some("R"));
    }

    #[test]
    fn exception_message_is_separate_from_payload() {
        let mut response = Response::from_map(map(json!({ "status": "fail" })));
        assert_eq!(response.exception_message(), None);

        response.set_exception_message(Some("refused".to_owned()));
        assert_eq!(response.exception_message(), Some("refused"));
        assert_eq!(response.property("exception_message"), None);

        response.set_exception_message(None);
        assert_eq!(response.exception_message(), None);
    }

    #[test]
    fn sent_status() {
        let response = Response::from_map(map(json!({ "status": "sent" })));
        assert!(response.is_sent());
    }

    #[test]
    fn property_round_trips_mapping_fields() {
        let response = Response::from_map(map(json!({
            "status": "ok",
            "login": "34600111222",
            "expiration": 1_700_000_000u64,
        })));
        assert_eq!(response.property("login"), Some(&json!("34600111222")));
        assert_eq!(
            response.property_as::<u64>("expiration"),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn property_round_trips_record_fields() {
        let response = Response::from_record(&RegisterResult {
            status: "ok".to_owned(),
            login: "34600111222".to_owned(),
            pw: "c2VjcmV0".to_owned(),
            expiration: 42,
        });
        assert_eq!(response.shape(), PayloadShape::Record);
        assert!(response.is_ok());
        assert_eq!(response.property_as::<String>("pw").as_deref(), Some("c2VjcmV0"));
        assert_eq!(response.property("expiration"), Some(&json!(42)));
    }

    #[test]
    fn missing_property_is_none_for_both_shapes() {
        let mapping = Response::from_map(map(json!({ "status": "ok" })));
        assert_eq!(mapping.property("reason"), None);
        assert_eq!(mapping.fail_reason(), None);

        let record = Response::from_record(&RegisterResult {
            status: "ok".to_owned(),
            login: String::new(),
            pw: String::new(),
            expiration: 0,
        });
        assert_eq!(record.property("reason"), None);
    }

    #[test]
    fn missing_status_matches_nothing() {
        let response = Response::from_map(Map::new());
        assert!(!response.is_ok());
        assert!(!response.is_sent());
        assert!(!response.is_fail());
        assert_eq!(response.status(), None);
    }

    #[test]
    fn non_object_record_is_empty() {
        let response = Response::from_record(&"plain string");
        assert!(response.payload().is_empty());
        assert_eq!(response.property("status"), None);
    }

    #[test]
    fn set_payload_replaces_fields() {
        let mut response = Response::from_map(map(json!({ "status": "fail" })));
        response.set_payload(PayloadShape::Record, map(json!({ "status": "ok" })));
        assert!(response.is_ok());
        assert_eq!(response.shape(), PayloadShape::Record);
    }

    #[test]
    fn failure_record_with_retry_after() {
        let phone = PhoneNumber::new("34600111222").unwrap();
        let response = Response::failure(FailureRecord::throttled(
            phone,
            CodeRequestMethod::Voice,
            "too_recent",
            120,
        ));
        assert!(response.is_fail());
        assert_eq!(response.fail_reason(), Some("too_recent"));
        assert_eq!(response.retry_after(), Some(120));
        assert_eq!(response.property("phone"), Some(&json!("34600111222")));
        assert_eq!(response.property("method"), Some(&json!("voice")));
        assert_eq!(response.property(FailureRecord::PARAM), None);
    }

    #[test]
    fn failure_record_with_param() {
        let phone = PhoneNumber::new("34600111222").unwrap();
        let response = Response::failure(FailureRecord::with_param(
            phone,
            CodeRequestMethod::Sms,
            "bad_param",
            "mcc",
        ));
        assert!(response.is_fail());
        assert_eq!(response.property(FailureRecord::PARAM), Some(&json!("mcc")));
        assert_eq!(response.retry_after(), None);
    }

    #[test]
    fn register_failure_keeps_server_status() {
        let phone = PhoneNumber::new("34600111222").unwrap();
        let response = Response::failure(FailureRecord::register_failed(
            phone, "fail", "mismatch", 60,
        ));
        assert!(response.is_fail());
        assert_eq!(response.fail_reason(), Some("mismatch"));
        assert_eq!(response.property("method"), None);
    }
}
