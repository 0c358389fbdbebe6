use serde::Deserialize;
use thiserror::Error;

use crate::error::AuthError;

use super::ApiResponse;

/// The request produced no HTTP response.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transport failure: {0}")]
    Other(String),
}

/// Maximum length for error response bodies in logged causes
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid logging excessive data
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut cut = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
}

/// What went wrong before normalization.
#[derive(Debug)]
pub(crate) enum Failure {
    /// The API answered with a non-2xx status
    Response(ApiResponse),
    /// No response at all
    Transport(TransportError),
    /// Anything else, e.g. an undecodable success body
    Other(String),
}

impl From<TransportError> for Failure {
    fn from(e: TransportError) -> Self {
        Failure::Transport(e)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<Detail>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Validation(Vec<ValidationItem>),
}

#[derive(Deserialize)]
struct ValidationItem {
    msg: Option<String>,
}

/// Extract the API's `detail` message from an error body, if there is one.
pub(crate) fn detail_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let message = match parsed.detail? {
        Detail::Message(text) => text,
        Detail::Validation(items) => items
            .into_iter()
            .filter_map(|item| item.msg)
            .collect::<Vec<_>>()
            .join("; "),
    };
    let message = message.trim().to_string();
    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}

/// Turn any failure into an `AuthFailure` with a presentable message.
pub(crate) fn normalize(failure: Failure, fallback: &str) -> AuthError {
    match failure {
        Failure::Response(response) => AuthError::AuthFailure {
            message: detail_message(&response.body).unwrap_or_else(|| fallback.to_string()),
            status: Some(response.status),
            cause: format!("Status {}: {}", response.status, truncate_body(&response.body)),
        },
        Failure::Transport(e) => AuthError::AuthFailure {
            message: fallback.to_string(),
            status: None,
            cause: e.to_string(),
        },
        Failure::Other(text) => AuthError::AuthFailure {
            message: if text.trim().is_empty() {
                fallback.to_string()
            } else {
                text.clone()
            },
            status: None,
            cause: text,
        },
    }
}
