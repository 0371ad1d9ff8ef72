use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::request::Request;
use crate::constants::protocol::{
    MALFORMED_REPLY_TYPE, STATUS_OK, STATUS_TRANSPORT_FAILURE, TRANSPORT_ERROR_TYPE,
};
use crate::errors::TransportError;

/// Reply to one request: the response on status 200, the error response otherwise.
pub type Outcome = Result<Response, ErrorResponse>;

/// Successful reply to a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub timestamp: i64,
    pub request: Request,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
}

impl Response {
    /// Decode the value into a concrete type
    pub fn value_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.value)
    }
}

/// Previous value of an attribute kept by the agent's history store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub value: Value,
    pub timestamp: i64,
}

/// Failed reply to a request (any status other than 200)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub timestamp: i64,
    pub request: Request,
    pub error_type: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_value: Option<Value>,
}

impl ErrorResponse {
    /// Stand-in response for a request whose batch never got an answer
    pub fn transport(err: &TransportError, request: Request) -> Self {
        Self {
            status: err.http_status().unwrap_or(STATUS_TRANSPORT_FAILURE),
            timestamp: Utc::now().timestamp(),
            request,
            error_type: TRANSPORT_ERROR_TYPE.to_string(),
            error: err.to_string(),
            stacktrace: None,
            error_value: None,
        }
    }

    /// Stand-in for one reply of a batch that could not be decoded
    pub fn malformed(reason: impl Into<String>, request: Request) -> Self {
        Self::local(MALFORMED_REPLY_TYPE, reason.into(), request)
    }

    /// Error produced on the client side, with no agent status attached
    pub fn local(error_type: &str, error: String, request: Request) -> Self {
        Self {
            status: STATUS_TRANSPORT_FAILURE,
            timestamp: Utc::now().timestamp(),
            request,
            error_type: error_type.to_string(),
            error,
            stacktrace: None,
            error_value: None,
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.error_type == TRANSPORT_ERROR_TYPE
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} request failed with status {}: {} ({})",
            self.request.kind(),
            self.status,
            self.error,
            self.error_type
        )
    }
}

impl std::error::Error for ErrorResponse {}

#[derive(Deserialize)]
struct WireResponse {
    status: u16,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    history: Option<Vec<HistoryEntry>>,
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    stacktrace: Option<String>,
    #[serde(default)]
    error_value: Option<Value>,
}

/// Decode one raw reply, correlating it with the request that produced it.
///
/// The agent's own echo of the request is ignored; `request` is what ends up
/// in the outcome.
pub fn parse_outcome(raw: Value, request: &Request) -> Result<Outcome, serde_json::Error> {
    let wire: WireResponse = serde_json::from_value(raw)?;
    let timestamp = wire.timestamp.unwrap_or_else(|| Utc::now().timestamp());

    if wire.status == STATUS_OK {
        return Ok(Ok(Response {
            status: wire.status,
            timestamp,
            request: request.clone(),
            value: wire.value,
            history: wire.history,
        }));
    }

    Ok(Err(ErrorResponse {
        status: wire.status,
        timestamp,
        request: request.clone(),
        error_type: wire.error_type.unwrap_or_else(|| "UnknownError".to_string()),
        error: wire
            .error
            .unwrap_or_else(|| format!("agent returned status {}", wire.status)),
        stacktrace: wire.stacktrace,
        error_value: wire.error_value,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_reply_uses_input_request() {
        let request = Request::read("java.lang:type=Memory", "HeapMemoryUsage");
        let raw = json!({
            "status": 200,
            "timestamp": 1700000000,
            "request": {"type": "read", "mbean": "java.lang:type=Memory"},
            "value": {"used": 1024, "max": 4096}
        });

        let response = parse_outcome(raw, &request).unwrap().unwrap();
        assert_eq!(response.request, request);
        assert_eq!(response.value["used"], 1024);
        assert_eq!(response.timestamp, 1700000000);
        assert!(response.history.is_none());
    }

    #[test]
    fn test_error_reply_carries_error_fields() {
        let request = Request::read("app:name=Missing", "Foo");
        let raw = json!({
            "status": 404,
            "error_type": "javax.management.InstanceNotFoundException",
            "error": "app:name=Missing",
            "stacktrace": "javax.management.InstanceNotFoundException: ..."
        });

        let error = parse_outcome(raw, &request).unwrap().unwrap_err();
        assert_eq!(error.status, 404);
        assert_eq!(error.error_type, "javax.management.InstanceNotFoundException");
        assert_eq!(error.request, request);
        assert!(error.stacktrace.is_some());
        assert!(!error.is_transport_failure());
    }

    #[test]
    fn test_history_entries_are_kept() {
        let raw = json!({
            "status": 200,
            "timestamp": 20,
            "value": 3,
            "history": [{"value": 2, "timestamp": 10}]
        });
        let response = parse_outcome(raw, &Request::read("a:b=c", "X")).unwrap().unwrap();
        assert_eq!(
            response.history,
            Some(vec![HistoryEntry { value: json!(2), timestamp: 10 }])
        );
    }

    #[test]
    fn test_reply_without_status_is_malformed() {
        let raw = json!({"value": 1});
        assert!(parse_outcome(raw, &Request::version()).is_err());
    }

    #[test]
    fn test_malformed_stand_in_keeps_request() {
        let response = ErrorResponse::malformed("missing field `status`", Request::version());
        assert_eq!(response.status, 0);
        assert_eq!(response.error_type, "MalformedReply");
        assert_eq!(response.request, Request::version());
        assert!(!response.is_transport_failure());
    }

    #[test]
    fn test_transport_stand_in_uses_http_status() {
        let err = TransportError::Http {
            url: "http://agent/jolokia".to_string(),
            status: 503,
            body: String::new(),
        };
        let response = ErrorResponse::transport(&err, Request::version());
        assert_eq!(response.status, 503);
        assert!(response.is_transport_failure());
    }
}
