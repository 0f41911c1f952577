// ABOUTME: Probes a deployment url until it answers without error.
// ABOUTME: Re-runs the password exchange before every probe when protection is on.

use reqwest::Url;
use reqwest::header::{COOKIE, HeaderValue};
use thiserror::Error;

use super::auth::{AuthError, AuthExchange, AuthToken};
use crate::http::{HttpClient, HttpError, HttpRequest};
use crate::retry::{Attempt, PollOutcome, Poller, RetryPolicy, Sleeper};

/// A url that answered, with the token used to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCheckResult {
    pub url: String,
    pub path: String,
    pub token: Option<AuthToken>,
}

/// Why a single probe failed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("password exchange failed: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("session token is not a valid header value")]
    InvalidToken,

    #[error("cannot build probe url from {url:?} and {path:?}: {reason}")]
    InvalidUrl {
        url: String,
        path: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum UrlWaitError {
    #[error("Timeout reached: Unable to connect to {url}")]
    Timeout {
        url: String,
        attempts: u64,
        #[source]
        last_error: Option<ProbeError>,
    },
}

pub struct UrlWaiter<'a> {
    http: &'a dyn HttpClient,
    sleeper: &'a dyn Sleeper,
    policy: RetryPolicy,
    password: Option<&'a str>,
}

impl<'a> UrlWaiter<'a> {
    pub fn new(
        http: &'a dyn HttpClient,
        sleeper: &'a dyn Sleeper,
        policy: RetryPolicy,
        password: Option<&'a str>,
    ) -> Self {
        Self {
            http,
            sleeper,
            policy,
            password,
        }
    }

    async fn probe_once(&self, target_url: &str, path: &str) -> Result<Option<AuthToken>, ProbeError> {
        let invalid = |reason: String| ProbeError::InvalidUrl {
            url: target_url.to_string(),
            path: path.to_string(),
            reason,
        };
        let url = Url::parse(target_url).map_err(|e| invalid(e.to_string()))?;
        let endpoint = url.join(path).map_err(|e| invalid(e.to_string()))?;

        let token = match self.password {
            Some(password) => Some(AuthExchange::new(self.http).exchange(&url, password).await?),
            None => None,
        };

        let mut request = HttpRequest::get(endpoint);
        if let Some(token) = &token {
            let mut cookie =
                HeaderValue::from_str(&token.cookie_header()).map_err(|_| ProbeError::InvalidToken)?;
            cookie.set_sensitive(true);
            request = request.header(COOKIE, cookie);
        }

        self.http.send(request).await?;
        Ok(token)
    }

    /// Probe `target_url` joined with `path` until a request succeeds.
    ///
    /// A target that doesn't form a url counts as a failed probe like any
    /// other, so it ends in `Timeout` once the attempt budget is spent.
    pub async fn wait(&self, target_url: &str, path: &str) -> Result<UrlCheckResult, UrlWaitError> {
        let outcome = Poller::new(self.policy, self.sleeper)
            .run(move |attempt| async move {
                match self.probe_once(target_url, path).await {
                    Ok(token) => Attempt::Ready(token),
                    Err(e) => {
                        let status = match &e {
                            ProbeError::Http(http) => http.status(),
                            _ => None,
                        };
                        match (&e, status) {
                            (_, Some(status)) => {
                                tracing::info!(url = target_url, path, status = status.as_u16(), %attempt, "URL responded with an error status, retrying");
                            }
                            (ProbeError::Http(HttpError::NoResponse { .. }), None) => {
                                tracing::info!(url = target_url, path, %attempt, "GET error. A request was made, but no response was received");
                            }
                            (other, None) => {
                                tracing::warn!(url = target_url, path, error = %other, %attempt, "URL check failed, retrying");
                            }
                        }
                        Attempt::Retry(Some(e))
                    }
                }
            })
            .await;

        match outcome {
            PollOutcome::Succeeded { value, attempt } => {
                tracing::debug!(url = target_url, path, attempt, "URL is available");
                Ok(UrlCheckResult {
                    url: target_url.to_string(),
                    path: path.to_string(),
                    token: value,
                })
            }
            PollOutcome::Exhausted {
                attempts,
                last_error,
            } => Err(UrlWaitError::Timeout {
                url: target_url.to_string(),
                attempts,
                last_error,
            }),
        }
    }
}
