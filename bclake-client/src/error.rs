//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur talking to Business Central.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The identity endpoint rejected the client-credentials grant.
    #[error("authentication failed: {status} - {body}")]
    Auth { status: u16, body: String },

    /// A data or metadata request returned a non-success status.
    #[error("OData request failed: {status} - {body}")]
    Request { status: u16, body: String },

    /// Transport failure, or a body that did not decode as expected.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server handed back a next link that was already followed.
    #[error("pagination loop detected at {url}")]
    PaginationLoop { url: String },

    /// `$metadata` could not be parsed.
    #[error("metadata parse error: {0}")]
    Metadata(String),

    /// The HTTP client could not be built from the configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status carried by auth and request failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Auth { status, .. } | ClientError::Request { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth { .. })
    }
}
