//! Error types for API calls.

use thiserror::Error;

/// Errors that can occur when talking to the Eye2Heart API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed or the server returned an unexpected status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Login was refused (wrong email or password).
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The session token was missing, invalid or expired.
    ///
    /// Callers should discard the session and log in again.
    #[error("Session rejected by server, please log in again")]
    Unauthorized,

    /// The server understood the request but refused it.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request could not be built from the supplied input.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Reading a local file for upload failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Returns true if the error means the session must be discarded.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}
