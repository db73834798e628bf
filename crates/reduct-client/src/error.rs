//! Error types for reduct-client.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Request { status: u16, message: String },

    /// The access token could not be refreshed after an authorization failure.
    ///
    /// `status` and `message` describe the authorization failure that triggered the refresh.
    #[error("failed to refresh access token ({reason}) after {status}: {message}")]
    AuthRefresh {
        status: u16,
        message: String,
        reason: String,
    },

    #[error("record body stream failed: {0}")]
    Stream(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("illegal state: {0}")]
    InvalidState(String),
}

impl Error {
    /// HTTP status carried by the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } | Error::AuthRefresh { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Request { status: 404, .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Request { status: 409, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
