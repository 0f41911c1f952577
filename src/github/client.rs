// ABOUTME: GitHub REST implementation of the DeploymentPlatform trait.
// ABOUTME: Uses reqwest with token auth and the v3 JSON media type.

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::error::PlatformError;
use super::platform::DeploymentPlatform;
use super::types::{Deployment, DeploymentStatus};
use crate::types::{DeploymentId, RepoRef};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";
const PER_PAGE: &str = "100";
const USER_AGENT: &str = concat!("deployment-gate/", env!("CARGO_PKG_VERSION"));

/// Client for the GitHub deployments API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: Url,
}

impl GithubClient {
    /// Create a client authenticating with `token` against `api_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL doesn't parse, the token isn't a valid
    /// header value, or the TLS backend can't be initialised.
    pub fn new(token: &str, api_url: &str) -> Result<Self, PlatformError> {
        let api_url =
            Url::parse(api_url).map_err(|e| PlatformError::InvalidUrl(format!("{api_url}: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(PlatformError::InvalidUrl(api_url.to_string()));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| PlatformError::InvalidToken(e.to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(PlatformError::Client)?;

        Ok(Self { http, api_url })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Append path segments to the API base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PlatformError> {
        let mut url = self.api_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| PlatformError::InvalidUrl(self.api_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        tracing::debug!(%url, ?query, "GET");

        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|source| PlatformError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| PlatformError::Decode {
                url: url.to_string(),
                source,
            })
    }
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    head: PullRequestHead,
}

#[derive(Debug, Deserialize)]
struct PullRequestHead {
    sha: String,
}

#[async_trait]
impl DeploymentPlatform for GithubClient {
    async fn list_deployments(
        &self,
        repo: &RepoRef,
        environment: &str,
        sha: Option<&str>,
    ) -> Result<Vec<Deployment>, PlatformError> {
        let url = self.endpoint(&["repos", repo.owner(), repo.repo(), "deployments"])?;

        let mut query = vec![("environment", environment), ("per_page", PER_PAGE)];
        if let Some(sha) = sha {
            query.push(("sha", sha));
        }

        self.get_json(url, &query).await
    }

    async fn list_deployment_statuses(
        &self,
        repo: &RepoRef,
        deployment_id: DeploymentId,
    ) -> Result<Vec<DeploymentStatus>, PlatformError> {
        let id = deployment_id.to_string();
        let url = self.endpoint(&[
            "repos",
            repo.owner(),
            repo.repo(),
            "deployments",
            &id,
            "statuses",
        ])?;

        self.get_json(url, &[("per_page", PER_PAGE)]).await
    }

    async fn pull_request_head_sha(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<String, PlatformError> {
        let number = number.to_string();
        let url = self.endpoint(&["repos", repo.owner(), repo.repo(), "pulls", &number])?;

        match self.get_json::<PullRequest>(url, &[]).await {
            Ok(pr) => Ok(pr.head.sha),
            Err(PlatformError::Status { .. }) => Err(PlatformError::PullRequestUnavailable),
            Err(e) => Err(e),
        }
    }
}
