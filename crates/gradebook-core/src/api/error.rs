use serde::Deserialize;
use thiserror::Error;

/// Fallback message when a failure carries nothing displayable.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected error.";

/// Failure raised by a gateway call.
///
/// Every store records the `describe_error` rendering of this value as its
/// `last_error` and hands the value itself back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No response was received (connect failure, timeout, broken transport).
    #[error("Network error: {description}")]
    Network { description: String },

    /// The server answered with a non-success status.
    #[error("Request rejected with status {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
        error: Option<String>,
    },

    /// Anything else that went wrong on this side of the wire.
    #[error("{description}")]
    Local { description: String },
}

/// Maximum length for error response bodies kept for logging
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// JSON body shape the server uses for rejected requests.
#[derive(Debug, Default, Deserialize)]
struct RejectionBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl GatewayError {
    pub fn network(description: impl Into<String>) -> Self {
        GatewayError::Network {
            description: description.into(),
        }
    }

    pub fn local(description: impl Into<String>) -> Self {
        GatewayError::Local {
            description: description.into(),
        }
    }

    /// Truncate a response body to avoid logging excessive data
    pub fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Build a rejection from a status code and the raw response body.
    ///
    /// The body is read as `{"message": ..., "error": ...}`; bodies that are
    /// not JSON (or not an object) give a rejection with neither field.
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed: RejectionBody = serde_json::from_str(body).unwrap_or_default();
        GatewayError::Rejected {
            status,
            message: parsed.message,
            error: parsed.error,
        }
    }

    /// HTTP status for rejections, `None` for the other kinds.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            GatewayError::Rejected {
                status: status.as_u16(),
                message: None,
                error: None,
            }
        } else if err.is_decode() {
            GatewayError::local(err.to_string())
        } else {
            GatewayError::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::local(err.to_string())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Render any gateway failure as a single display string.
///
/// Priority: server `message`, then server `error`, then
/// `"Request failed (<status>)"`, then the failure's own description, then
/// a generic fallback. Empty strings count as absent; whitespace is kept.
pub fn describe_error(err: &GatewayError) -> String {
    match err {
        GatewayError::Rejected {
            status,
            message,
            error,
        } => non_empty(message)
            .or_else(|| non_empty(error))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed ({})", status)),
        GatewayError::Network { description } | GatewayError::Local { description } => {
            if description.is_empty() {
                UNEXPECTED_ERROR_MESSAGE.to_string()
            } else {
                description.clone()
            }
        }
    }
}
