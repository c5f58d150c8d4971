//! Error types for the notes API client.
//!
//! # Design
//! 401 and 409 get dedicated variants because callers branch on them: a
//! missing session sends the user to the login screen, a conflict means the
//! username or email is taken. Every other non-2xx status lands in `Status`
//! with the raw code and body. `Transport` covers the case where no response
//! arrived at all.

use thiserror::Error;

/// Errors returned by `NotesClient` parse methods and `RequestGateway`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 401. Carries the backend's `error` message.
    #[error("{0}")]
    Unauthorized(String),

    /// The server returned 409. Carries the backend's `error` message.
    #[error("{0}")]
    Conflict(String),

    /// The server returned a non-2xx status other than 401 or 409.
    #[error("request failed with status: {status}")]
    Status { status: u16, body: String },

    /// The request never produced a response (DNS, refused connection, ...).
    #[error("no response received: {0}")]
    Transport(String),

    /// A response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status behind this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Conflict(_) => Some(409),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_displays_backend_message() {
        let err = ApiError::Unauthorized("Invalid credentials".to_string());
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn status_display_embeds_code() {
        let err = ApiError::Status {
            status: 503,
            body: String::new(),
        };
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn transport_has_no_status() {
        assert_eq!(ApiError::Transport("refused".to_string()).status(), None);
    }
}
