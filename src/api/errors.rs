//! HTTP error type and the status-code to user-message mapping.

use serde_json::Value;
use thiserror::Error;

/// Message for statuses with no mapping and no server-provided message
pub const UNEXPECTED_ERROR: &str = "Unexpected error occurred.";
/// Message for failures that never produced a response
pub const NETWORK_ERROR: &str = "Network error occurred. Please try again later.";

/// Fixed messages for well-known statuses
const STATUS_MESSAGES: [(u16, &str); 7] = [
    (400, "Invalid request data."),
    (401, "Unauthorized – please log in."),
    (403, "Forbidden – access denied."),
    (404, "Resource not found."),
    (409, "Conflict – duplicate data."),
    (422, "Unprocessable entity."),
    (500, "Server error – please try again later."),
];

/// Body of a failed response
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    /// Response declared `application/json` and parsed
    Json(Value),
    /// Anything else, verbatim
    Text(String),
}

impl ErrorBody {
    /// Message the server put in the body, if any
    ///
    /// Text bodies are the message themselves. JSON bodies contribute a
    /// string `message` field, or FastAPI's string `detail` field.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ErrorBody::Text(text) => Some(text.as_str()).filter(|t| !t.trim().is_empty()),
            ErrorBody::Json(value) => ["message", "detail"]
                .iter()
                .find_map(|field| value.get(*field).and_then(Value::as_str))
                .filter(|m| !m.trim().is_empty()),
        }
    }
}

/// Errors raised by [`crate::api::HttpClient`]
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// Non-2xx response; `message` is already mapped for display
    #[error("{message}")]
    Status { status: u16, message: String, body: ErrorBody },

    /// No response (connection refused, DNS, TLS...)
    #[error("Network error: {0}")]
    Transport(String),

    /// Success response whose body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Base URL or path did not form a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl HttpError {
    /// Build a status error, mapping the message from the status and body
    pub fn from_response(status: u16, body: ErrorBody) -> Self {
        let message = message_for(status, body.server_message());
        HttpError::Status { status, message, body }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            HttpError::Status { message, .. } => message.clone(),
            HttpError::Transport(_) => NETWORK_ERROR.to_string(),
            HttpError::Decode(_) | HttpError::InvalidUrl(_) => UNEXPECTED_ERROR.to_string(),
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HttpError::Decode(err.to_string())
        } else {
            HttpError::Transport(err.to_string())
        }
    }
}

/// User-facing message for `status`
///
/// Known statuses use the fixed table; otherwise the server's message, then a
/// generic fallback.
pub fn message_for(status: u16, server_message: Option<&str>) -> String {
    STATUS_MESSAGES
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, message)| (*message).to_string())
        .or_else(|| server_message.map(str::to_string))
        .unwrap_or_else(|| UNEXPECTED_ERROR.to_string())
}
