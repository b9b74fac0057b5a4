//! CMS client error types.

use thiserror::Error;

/// Result type for CMS operations.
pub type Result<T> = std::result::Result<T, CmsError>;

/// Errors that can occur while talking to the CMS.
#[derive(Debug, Error)]
pub enum CmsError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("CMS responded with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not what the API documents.
    #[error("failed to decode CMS response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A document that must exist was not found.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The API root listed no master ref.
    #[error("CMS API did not advertise a master ref")]
    NoMasterRef,

    /// The client could not be configured.
    #[error("invalid CMS configuration: {0}")]
    Config(String),
}

impl CmsError {
    /// Returns true if the request ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CmsError::Http(e) if e.is_timeout())
    }
}
