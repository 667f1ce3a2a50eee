//! Error types and the error normalizer.
//!
//! # Design
//! Every failure that happens after a request leaves the building stage is
//! converted exactly once into a `NormalizedError`, whatever its cause (no
//! response, failing status, undecodable body). Callers therefore only ever
//! inspect one shape. `MissingPathParameter` is the exception: it is a
//! programmer error detected before any request exists and is surfaced as
//! its own variant.

use std::future::Future;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::HttpResponse;

pub const NETWORK_ERROR: &str = "Network error occurred. Please check your connection.";
pub const TIMEOUT_ERROR: &str = "Request timeout. Please try again.";
pub const UNAUTHORIZED: &str = "Authentication required. Please log in.";
pub const FORBIDDEN: &str = "Access denied. You do not have permission to perform this action.";
pub const NOT_FOUND: &str = "The requested resource was not found.";
pub const SERVER_ERROR: &str = "Internal server error. Please try again later.";
pub const UNKNOWN_ERROR: &str = "An unknown error occurred. Please try again.";
pub const DECODE_ERROR: &str = "Failed to decode response body.";

/// Transport codes that mean the request was aborted by its timeout.
const TIMEOUT_CODES: &[&str] = &["ECONNABORTED", "ETIMEDOUT"];

/// The single error shape surfaced for failed requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct NormalizedError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// RFC 3339 / ISO-8601 UTC timestamp of when the error was normalized.
    pub timestamp: String,
}

impl NormalizedError {
    /// Build an error by hand, stamped with the current time.
    pub fn new(
        message: impl Into<String>,
        status: Option<u16>,
        code: Option<String>,
        details: Option<Value>,
    ) -> Self {
        Self {
            message: message.into(),
            status,
            code,
            details,
            timestamp: now_iso8601(),
        }
    }
}

/// Errors returned by pipeline and resource operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A placeholder in the path template had no usable value. Raised before
    /// any request is built.
    #[error("missing path parameter `{name}` for template `{template}`")]
    MissingPathParameter { name: String, template: String },

    /// The request payload could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request was attempted and failed; always normalized.
    #[error(transparent)]
    Request(#[from] NormalizedError),
}

impl ApiError {
    pub fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            ApiError::Request(err) => Some(err),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.normalized().and_then(|e| e.status)
    }
}

/// Failure reported by an executor when no response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    /// Transport-specific abort code, e.g. `ECONNABORTED`.
    pub code: Option<String>,
    pub message: String,
    pub timed_out: bool,
}

impl TransportError {
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            code: Some("ECONNABORTED".to_string()),
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            code: Some("ERR_NETWORK".to_string()),
            message: message.into(),
            timed_out: false,
        }
    }

    fn is_timeout(&self) -> bool {
        self.timed_out
            || self
                .code
                .as_deref()
                .is_some_and(|code| TIMEOUT_CODES.contains(&code))
    }
}

/// Normalize a failure where no response was received. `status` is never
/// set.
pub fn normalize_transport_error(err: &TransportError) -> NormalizedError {
    let message = if err.is_timeout() {
        TIMEOUT_ERROR
    } else {
        NETWORK_ERROR
    };
    NormalizedError::new(message, None, err.code.clone(), None)
}

/// Normalize a response carrying a non-2xx status.
pub fn normalize_response(response: &HttpResponse) -> NormalizedError {
    let details = parse_details(&response.body);
    let message = canonical_message(response.status)
        .map(str::to_string)
        .unwrap_or_else(|| extract_message(details.as_ref()));

    NormalizedError::new(
        message,
        Some(response.status),
        status_code_class(response.status),
        details,
    )
}

/// Normalize a 2xx response whose body did not match the expected type.
pub(crate) fn normalize_decode_error(response: &HttpResponse, err: &serde_json::Error) -> NormalizedError {
    tracing::debug!(status = response.status, error = %err, "response body did not decode");
    NormalizedError::new(
        DECODE_ERROR,
        Some(response.status),
        Some("ERR_BAD_RESPONSE_BODY".to_string()),
        parse_details(&response.body),
    )
}

/// Fixed user-facing message for well-known status classes.
fn canonical_message(status: u16) -> Option<&'static str> {
    match status {
        401 => Some(UNAUTHORIZED),
        403 => Some(FORBIDDEN),
        404 => Some(NOT_FOUND),
        500 | 502 | 503 => Some(SERVER_ERROR),
        _ => None,
    }
}

fn status_code_class(status: u16) -> Option<String> {
    match status {
        400..=499 => Some("ERR_BAD_REQUEST".to_string()),
        500..=599 => Some("ERR_BAD_RESPONSE".to_string()),
        _ => None,
    }
}

/// Raw body as JSON when it parses, otherwise as a JSON string. Empty bodies
/// carry no details.
fn parse_details(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

/// `message`, then `error`, then `detail`; a plain string body is used
/// verbatim.
fn extract_message(details: Option<&Value>) -> String {
    match details {
        Some(Value::Object(map)) => ["message", "error", "detail"]
            .iter()
            .find_map(|key| match map.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                _ => None,
            })
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        Some(Value::String(s)) => s.clone(),
        _ => UNKNOWN_ERROR.to_string(),
    }
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Run an operation; on failure log it, then either substitute `fallback`
/// or hand the error back unchanged.
///
/// Only request failures are substituted. `MissingPathParameter` and
/// serialization errors are invalid calls and always propagate.
///
/// Resource operations already run under this with no fallback, so their
/// failures are logged once. To default the result of one of them, apply
/// `recover` to its output instead of wrapping it here again:
///
/// ```no_run
/// # async fn demo(client: petstore_core::ApiClient) -> Result<(), petstore_core::ApiError> {
/// use petstore_core::error::recover;
///
/// let pets = recover(client.pet.find_pets_by_tags(&["rare"], None).await, Vec::new())?;
/// # let _ = pets;
/// # Ok(())
/// # }
/// ```
pub async fn with_error_handling<T, F>(operation: F, fallback: Option<T>) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match operation.await {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::error!(error = %err, "operation failed");
            match fallback {
                Some(fallback) => recover(Err(err), fallback),
                None => Err(err),
            }
        }
    }
}

/// Replace a request failure with `fallback`, without logging. Invalid-call
/// errors pass through unchanged.
pub fn recover<T>(result: Result<T, ApiError>, fallback: T) -> Result<T, ApiError> {
    match result {
        Err(ApiError::Request(_)) => Ok(fallback),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn not_found_override_wins_over_payload() {
        let err = normalize_response(&response(404, r#"{"message":"x not found"}"#));
        assert_eq!(err.message, NOT_FOUND);
        assert_eq!(err.status, Some(404));
        assert_eq!(err.details.unwrap()["message"], "x not found");
    }

    #[test]
    fn unlisted_status_keeps_payload_error_field() {
        let err = normalize_response(&response(422, r#"{"error":"bad field"}"#));
        assert_eq!(err.message, "bad field");
        assert_eq!(err.status, Some(422));
        assert_eq!(err.code.as_deref(), Some("ERR_BAD_REQUEST"));
    }

    #[test]
    fn message_field_preferred_over_error_and_detail() {
        let err = normalize_response(&response(
            409,
            r#"{"detail":"d","error":"e","message":"m"}"#,
        ));
        assert_eq!(err.message, "m");

        let err = normalize_response(&response(409, r#"{"detail":"d"}"#));
        assert_eq!(err.message, "d");
    }

    #[test]
    fn empty_message_falls_through_to_next_field() {
        let err = normalize_response(&response(400, r#"{"message":"","error":"e"}"#));
        assert_eq!(err.message, "e");
    }

    #[test]
    fn plain_text_body_used_verbatim() {
        let err = normalize_response(&response(400, "Invalid ID supplied"));
        assert_eq!(err.message, "Invalid ID supplied");
        assert_eq!(err.details, Some(Value::String("Invalid ID supplied".to_string())));
    }

    #[test]
    fn uninspectable_body_gets_unknown_message() {
        let err = normalize_response(&response(418, ""));
        assert_eq!(err.message, UNKNOWN_ERROR);
        assert!(err.details.is_none());

        let err = normalize_response(&response(418, "[1,2]"));
        assert_eq!(err.message, UNKNOWN_ERROR);
    }

    #[test]
    fn server_errors_share_canonical_message() {
        for status in [500, 502, 503] {
            let err = normalize_response(&response(status, r#"{"message":"stack trace"}"#));
            assert_eq!(err.message, SERVER_ERROR, "status {status}");
            assert_eq!(err.code.as_deref(), Some("ERR_BAD_RESPONSE"));
        }
        let err = normalize_response(&response(504, r#"{"message":"gateway"}"#));
        assert_eq!(err.message, "gateway");
    }

    #[test]
    fn timeout_has_no_status() {
        let err = normalize_transport_error(&TransportError::timeout("deadline elapsed"));
        assert_eq!(err.message, TIMEOUT_ERROR);
        assert!(err.status.is_none());
        assert_eq!(err.code.as_deref(), Some("ECONNABORTED"));
    }

    #[test]
    fn timeout_detected_from_code_alone() {
        let err = TransportError {
            code: Some("ETIMEDOUT".to_string()),
            message: "socket".to_string(),
            timed_out: false,
        };
        assert_eq!(normalize_transport_error(&err).message, TIMEOUT_ERROR);
    }

    #[test]
    fn connection_failure_is_network_error() {
        let err = normalize_transport_error(&TransportError::network("connection refused"));
        assert_eq!(err.message, NETWORK_ERROR);
        assert!(err.status.is_none());
    }

    #[test]
    fn timestamp_is_rfc3339() {
        let err = NormalizedError::new("m", None, None, None);
        assert!(chrono::DateTime::parse_from_rfc3339(&err.timestamp).is_ok());
    }

    #[test]
    fn serialized_shape_omits_absent_fields() {
        let err = NormalizedError::new("boom", None, None, None);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["message"], "boom");
        assert!(json.get("status").is_none());
        assert!(json.get("code").is_none());
        assert!(json.get("details").is_none());
        assert!(json.get("timestamp").is_some());
    }

    #[tokio::test]
    async fn fallback_replaces_request_failure() {
        let failing = async { Err::<u32, _>(ApiError::Request(NormalizedError::new("x", Some(500), None, None))) };
        assert_eq!(with_error_handling(failing, Some(7)).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn no_fallback_reraises_unchanged() {
        let failing = async { Err::<u32, _>(ApiError::Request(NormalizedError::new("x", Some(418), None, None))) };
        let err = with_error_handling(failing, None).await.unwrap_err();
        assert_eq!(err.status(), Some(418));
        assert_eq!(err.normalized().unwrap().message, "x");
    }

    #[tokio::test]
    async fn validation_errors_ignore_fallback() {
        let failing = async {
            Err::<u32, _>(ApiError::MissingPathParameter {
                name: "petId".to_string(),
                template: "/pet/{petId}".to_string(),
            })
        };
        let err = with_error_handling(failing, Some(1)).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingPathParameter { .. }));
    }

    #[test]
    #[tracing_test::traced_test]
    fn recover_defaults_request_failures_quietly() {
        let failed = Err::<Vec<u32>, _>(ApiError::Request(NormalizedError::new(NOT_FOUND, Some(404), None, None)));
        assert_eq!(recover(failed, Vec::new()).unwrap(), Vec::<u32>::new());
        assert_eq!(recover(Ok(vec![1]), Vec::new()).unwrap(), vec![1]);
        assert!(!logs_contain("operation failed"));
    }

    #[test]
    fn recover_keeps_invalid_call_errors() {
        let invalid = Err::<u32, _>(ApiError::MissingPathParameter {
            name: "username".to_string(),
            template: "/user/{username}".to_string(),
        });
        assert!(matches!(recover(invalid, 0), Err(ApiError::MissingPathParameter { .. })));
    }
}
