use thiserror::Error;

/// Errors returned by the analytics backend client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 401 or 403. Retrying with the same token cannot succeed.
    #[error("not authorized ({status}): {message}")]
    Auth { status: u16, message: String },

    /// HTTP 404 for the requested entity.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Any other non-2xx status.
    #[error("unexpected HTTP status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// No response within the caller's deadline.
    #[error("request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// Coarse error classes a UI can map to distinct messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    NotFound,
    Network,
    Malformed,
}

impl ClientError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Auth { .. } => ErrorKind::Auth,
            ClientError::NotFound { .. } => ErrorKind::NotFound,
            ClientError::Http(_)
            | ClientError::UnexpectedStatus { .. }
            | ClientError::Timeout { .. }
            | ClientError::InvalidBaseUrl { .. } => ErrorKind::Network,
            ClientError::Deserialize { .. } => ErrorKind::Malformed,
        }
    }

    /// Maps a non-2xx status and its body to the matching variant.
    ///
    /// The backend reports failures as `{ "message": "..." }`; any other body
    /// falls back to the canonical reason phrase.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_owned()
            });

        match status.as_u16() {
            401 | 403 => ClientError::Auth {
                status: status.as_u16(),
                message,
            },
            404 => ClientError::NotFound { message },
            code => ClientError::UnexpectedStatus {
                status: code,
                message,
            },
        }
    }
}
