// ABOUTME: HTTP error types distinguishing rejected responses from missing ones.
// ABOUTME: Lets the URL waiter log status codes separately from network failures.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    /// A response arrived but its status is not accepted.
    #[error("{url} responded with status {status}")]
    Status { url: String, status: StatusCode },

    /// The request was sent but no response was received.
    #[error("no response from {url}: {reason}")]
    NoResponse { url: String, reason: String },

    /// The request could not be built.
    #[error("invalid request to {url}: {reason}")]
    InvalidRequest { url: String, reason: String },
}

impl HttpError {
    /// Status code of the rejected response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
