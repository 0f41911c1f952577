// ABOUTME: Request and response values passed through the HttpClient trait.
// ABOUTME: Requests carry their own accepted status range and redirect policy.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use std::ops::Range;

/// Statuses accepted unless a request says otherwise.
pub const SUCCESS_STATUSES: Range<u16> = 200..300;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub accepted: Range<u16>,
    pub follow_redirects: bool,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url, None)
    }

    pub fn post(url: Url, body: String) -> Self {
        Self::new(Method::POST, url, Some(body))
    }

    fn new(method: Method, url: Url, body: Option<String>) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body,
            accepted: SUCCESS_STATUSES,
            follow_redirects: true,
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Treat statuses in `range` as success.
    pub fn accept_statuses(mut self, range: Range<u16>) -> Self {
        self.accepted = range;
        self
    }

    /// Return redirect responses as-is instead of following them.
    pub fn without_redirects(mut self) -> Self {
        self.follow_redirects = false;
        self
    }

    pub fn accepts(&self, status: StatusCode) -> bool {
        self.accepted.contains(&status.as_u16())
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    #[test]
    fn defaults_accept_only_2xx() {
        let request = HttpRequest::get(url());
        assert!(request.accepts(StatusCode::OK));
        assert!(request.accepts(StatusCode::NO_CONTENT));
        assert!(!request.accepts(StatusCode::SEE_OTHER));
        assert!(!request.accepts(StatusCode::NOT_FOUND));
        assert!(request.follow_redirects);
    }

    #[test]
    fn widened_range_accepts_see_other_but_not_temporary_redirect() {
        let request = HttpRequest::post(url(), String::new()).accept_statuses(200..307);
        assert!(request.accepts(StatusCode::SEE_OTHER));
        assert!(!request.accepts(StatusCode::TEMPORARY_REDIRECT));
    }
}
