//! Custom error types for the application.
//!
//! Provides structured error handling for each domain:
//!
//! - [`HttpError`] - Non-2xx/non-304 responses from the backend
//! - [`ApiError`] - Everything the API client can fail with
//! - [`TransportError`] - Network/fetch-level failures
//! - [`CacheError`] - Persistent response cache failures
//! - [`PrefetchError`] - Route resolution and loader failures during prefetch

use leptos::logging;
use serde_json::Value;
use thiserror::Error;

/// Non-success HTTP response from the backend.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Request failed with status {status}: {}", body_summary(.body))]
pub struct HttpError {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body, or the raw text as a JSON string.
    pub body: Value,
}

impl HttpError {
    /// Build an error from a status and raw response text.
    ///
    /// The body is parsed as JSON when possible and kept as text otherwise.
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
        Self { status, body }
    }
}

fn body_summary(body: &Value) -> String {
    match body {
        Value::Null => "<empty>".to_string(),
        Value::String(text) if text.is_empty() => "<empty>".to_string(),
        Value::String(text) => text.clone(),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| body.to_string()),
        other => other.to_string(),
    }
}

/// Network/fetch-related errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("Browser window not available")]
    NoWindow,
    #[error("Failed to create request")]
    RequestCreationFailed,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Failed to read response")]
    ResponseReadFailed,
}

/// Persistent response cache errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheError {
    #[error("localStorage not available")]
    StorageUnavailable,
    #[error("failed to read from cache")]
    ReadFailed,
    #[error("failed to write to cache")]
    WriteFailed,
    #[error("failed to serialize cache entry")]
    SerializationFailed,
    #[error("corrupt cache entry for {0}")]
    Corrupt(String),
    /// The server answered 304 for a path that was never cached.
    #[error("not modified, but no cached response for {0}")]
    MissingEntry(String),
}

/// Errors returned by [`ApiClient`](crate::core::api::ApiClient).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("JSON parse error: {0}")]
    Decode(String),
    #[error("failed to encode request body: {0}")]
    Encode(String),
    #[error("random source unavailable: {0}")]
    Entropy(String),
}

impl ApiError {
    /// HTTP status when the failure came from a backend response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => Some(err.status),
            _ => None,
        }
    }
}

/// Errors raised while prefetching a route. Always logged, never surfaced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrefetchError {
    #[error("failed to resolve route: {0}")]
    Resolve(String),
    #[error("failed to load component '{component}': {message}")]
    Load { component: String, message: String },
}

/// Convert an API failure into a rejected result with a readable message.
pub fn parse_error<T>(err: ApiError) -> Result<T, String> {
    let message = match &err {
        ApiError::Http(http) => http.to_string(),
        ApiError::Transport(TransportError::Timeout) => {
            "The server took too long to respond".to_string()
        }
        ApiError::Transport(e) => format!("Could not reach the server ({})", e),
        other => format!("Something went wrong: {}", other),
    };
    Err(message)
}

/// Log an API failure to the console.
pub fn debug_error(err: &ApiError) {
    logging::error!("{}", debug_message(err));
}

/// Developer-facing line for [`debug_error`]. HTTP failures keep the raw body.
fn debug_message(err: &ApiError) -> String {
    match err {
        ApiError::Http(http) => format!("[api] HTTP {} {}", http.status, http.body),
        other => format!("[api] request failed: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_error_parses_json_body() {
        let err = HttpError::from_text(422, r#"{"message":"email is required"}"#);
        assert_eq!(err.status, 422);
        assert_eq!(err.body, json!({ "message": "email is required" }));
        assert_eq!(
            err.to_string(),
            "Request failed with status 422: email is required"
        );
    }

    #[test]
    fn test_http_error_keeps_text_body() {
        let err = HttpError::from_text(502, "Bad Gateway");
        assert_eq!(err.body, Value::String("Bad Gateway".to_string()));
        assert_eq!(err.to_string(), "Request failed with status 502: Bad Gateway");

        let empty = HttpError::from_text(500, "");
        assert_eq!(empty.to_string(), "Request failed with status 500: <empty>");
    }

    #[test]
    fn test_parse_error_messages() {
        let http: Result<(), String> =
            parse_error(HttpError::from_text(404, "not found").into());
        assert_eq!(
            http.unwrap_err(),
            "Request failed with status 404: not found"
        );

        let timeout: Result<(), String> = parse_error(TransportError::Timeout.into());
        assert_eq!(timeout.unwrap_err(), "The server took too long to respond");

        let missing: Result<(), String> =
            parse_error(CacheError::MissingEntry("/posts".to_string()).into());
        assert!(missing.unwrap_err().contains("/posts"));
    }

    #[test]
    fn test_debug_error_messages() {
        let http = ApiError::from(HttpError::from_text(409, r#"{"error":"conflict"}"#));
        assert_eq!(
            debug_message(&http),
            r#"[api] HTTP 409 {"error":"conflict"}"#
        );
        debug_error(&http);

        let decode = ApiError::Decode("expected value".to_string());
        let message = debug_message(&decode);
        assert!(message.starts_with("[api] request failed: "));
        assert!(message.contains("expected value"));
        debug_error(&decode);
    }

    #[test]
    fn test_status_only_for_http() {
        assert_eq!(
            ApiError::from(HttpError::from_text(401, "")).status(),
            Some(401)
        );
        assert_eq!(ApiError::Decode("eof".to_string()).status(), None);
    }
}
