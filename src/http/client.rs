// ABOUTME: reqwest-backed HttpClient.
// ABOUTME: Keeps a redirect-following and a non-following client side by side.

use async_trait::async_trait;
use reqwest::redirect::Policy;

use super::error::HttpError;
use super::request::{HttpRequest, HttpResponse};
use super::HttpClient;

const USER_AGENT: &str = concat!("deployment-gate/", env!("CARGO_PKG_VERSION"));

/// HTTP client for probing deployment URLs.
///
/// Both inner clients share nothing mutable, so one instance serves every
/// concurrent pipeline.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    following: reqwest::Client,
    manual: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let following = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let manual = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .build()?;

        Ok(Self { following, manual })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let client = if request.follow_redirects {
            &self.following
        } else {
            &self.manual
        };
        let url = request.url.to_string();

        let mut builder = client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = request.body.clone() {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                HttpError::InvalidRequest {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            } else {
                HttpError::NoResponse {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !request.accepts(status) {
            return Err(HttpError::Status { url, status });
        }

        Ok(HttpResponse {
            status,
            headers: response.headers().clone(),
        })
    }
}
