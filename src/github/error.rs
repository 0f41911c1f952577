// ABOUTME: Errors returned by deployment platform calls.
// ABOUTME: Separates transport failures from unexpected HTTP statuses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("invalid API token: {0}")]
    InvalidToken(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Could not get information about the current pull request")]
    PullRequestUnavailable,
}
