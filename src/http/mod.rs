// ABOUTME: Generic HTTP seam used for URL probes and the password exchange.
// ABOUTME: Defines HttpClient, request/response types, and the reqwest implementation.

mod client;
pub mod cookie;
mod error;
mod request;

pub use client::ReqwestHttpClient;
pub use error::HttpError;
pub use request::{HttpRequest, HttpResponse, SUCCESS_STATUSES};

use async_trait::async_trait;

/// Sends one HTTP request.
///
/// A response whose status falls outside the request's accepted range is
/// returned as [`HttpError::Status`]; no response at all is
/// [`HttpError::NoResponse`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}
