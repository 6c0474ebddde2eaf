//! Transport-level errors and their mapping onto domain errors.

use folio_core::error::CoreError;

/// Errors from the hosted REST/auth/function endpoints.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, or the raw body.
        message: String,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 401/403 are access-policy rejections; everything else the client
/// cannot act on is a network failure.
impl From<RemoteError> for CoreError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Api {
                status: 401 | 403,
                message,
            } => CoreError::Unauthorized(message),
            other => CoreError::Network(other.to_string()),
        }
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// REST errors use `message`, auth errors use `msg`, `error_description`
/// or `error`; the edge function uses `error`.
pub fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "<empty body>".to_string()
            } else {
                body.to_string()
            }
        })
}
