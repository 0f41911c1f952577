// ABOUTME: Exchanges a deployment protection password for a session cookie.
// ABOUTME: One form POST per call; retrying is left to the URL waiter.

use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use std::fmt;
use std::ops::Range;
use thiserror::Error;

use crate::http::cookie::{has_set_cookie, set_cookies};
use crate::http::{HttpClient, HttpError, HttpRequest};

/// Cookie carrying the protection session token.
pub const PROTECTION_COOKIE: &str = "_vercel_jwt";

/// Form field the password is posted in.
pub const PASSWORD_FIELD: &str = "_vercel_password";

/// The exchange answers with a redirect, so 3xx below 307 counts as success.
pub const AUTH_ACCEPTED_STATUSES: Range<u16> = 200..307;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Session token obtained from the password exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for a `Cookie` request header.
    pub fn cookie_header(&self) -> String {
        format!("{PROTECTION_COOKIE}={}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no set-cookie header in response")]
    NoSetCookieHeader,

    #[error("no vercel JWT in response")]
    NoAuthCookie,

    #[error(transparent)]
    Request(#[from] HttpError),
}

pub struct AuthExchange<'a> {
    http: &'a dyn HttpClient,
}

impl<'a> AuthExchange<'a> {
    pub fn new(http: &'a dyn HttpClient) -> Self {
        Self { http }
    }

    /// Post `password` to `url` and return the session token it sets.
    ///
    /// # Errors
    ///
    /// Fails if the request is rejected, the response sets no cookie, or
    /// none of the cookies is a non-empty protection token.
    pub async fn exchange(&self, url: &Url, password: &str) -> Result<AuthToken, AuthError> {
        let body = format!("{PASSWORD_FIELD}={}", urlencoding::encode(password));
        let request = HttpRequest::post(url.clone(), body)
            .header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
            .accept_statuses(AUTH_ACCEPTED_STATUSES)
            .without_redirects();

        let response = self.http.send(request).await?;
        tracing::debug!(%url, status = %response.status, "Password exchange answered");

        if !has_set_cookie(&response.headers) {
            return Err(AuthError::NoSetCookieHeader);
        }

        set_cookies(&response.headers)
            .into_iter()
            .find(|cookie| cookie.name == PROTECTION_COOKIE && !cookie.value.is_empty())
            .map(|cookie| AuthToken(cookie.value))
            .ok_or(AuthError::NoAuthCookie)
    }
}
