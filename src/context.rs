// ABOUTME: Commit context of the triggering workflow run.
// ABOUTME: Reads repository, sha and event payload, and resolves pull request head commits.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::github::{DeploymentPlatform, PlatformError};
use crate::types::{RepoRef, RepoRefError};

pub const REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";
pub const SHA_VAR: &str = "GITHUB_SHA";
pub const EVENT_PATH_VAR: &str = "GITHUB_EVENT_PATH";

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("GITHUB_REPOSITORY is not set")]
    MissingRepository,

    #[error("invalid repository: {0}")]
    InvalidRepository(#[from] RepoRefError),

    #[error("failed to read event payload {path}: {source}")]
    ReadEvent {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse event payload {path}: {source}")]
    ParseEvent {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Missing information: Pull request detected but no PR number was found in payload. Exiting..."
    )]
    MissingPullRequestNumber,

    #[error("Missing information: Failed to fetch the PR head commit SHA. Exiting...")]
    PullRequestHead(#[source] PlatformError),

    #[error("Missing information: Unable to determine SHA of the commit to check. Exiting...")]
    MissingSha,
}

/// Pull request information found in the event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequest {
    /// Not a pull request event.
    Absent,
    /// A pull request event without a usable number.
    Unnumbered,
    Numbered(u64),
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    #[serde(default)]
    number: Option<u64>,
}

impl PullRequest {
    /// Inspect an event payload. A number of zero counts as missing.
    pub fn from_payload(json: &str) -> Result<Self, serde_json::Error> {
        let payload: EventPayload = serde_json::from_str(json)?;
        Ok(match payload.pull_request {
            None => PullRequest::Absent,
            Some(PullRequestPayload {
                number: Some(number),
            }) if number > 0 => PullRequest::Numbered(number),
            Some(_) => PullRequest::Unnumbered,
        })
    }
}

/// Where the run was triggered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitContext {
    pub repo: RepoRef,
    pub sha: Option<String>,
    pub pull_request: PullRequest,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CommitContext {
    /// Read the context from the GitHub Actions environment.
    pub fn from_env() -> Result<Self, ContextError> {
        let repository = non_empty(std::env::var(REPOSITORY_VAR).ok())
            .ok_or(ContextError::MissingRepository)?;
        let sha = std::env::var(SHA_VAR).ok();
        let event_path = non_empty(std::env::var(EVENT_PATH_VAR).ok()).map(PathBuf::from);

        Self::from_parts(&repository, sha, event_path.as_deref())
    }

    /// Build the context from explicit values.
    ///
    /// Without an event payload the run is treated as a non pull request event.
    pub fn from_parts(
        repository: &str,
        sha: Option<String>,
        event_path: Option<&Path>,
    ) -> Result<Self, ContextError> {
        let repo = RepoRef::parse(repository)?;

        let pull_request = match event_path {
            Some(path) => {
                let json =
                    std::fs::read_to_string(path).map_err(|source| ContextError::ReadEvent {
                        path: path.to_path_buf(),
                        source,
                    })?;
                PullRequest::from_payload(&json).map_err(|source| ContextError::ParseEvent {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => PullRequest::Absent,
        };

        Ok(Self {
            repo,
            sha: non_empty(sha),
            pull_request,
        })
    }

    /// The commit whose deployments to wait for.
    ///
    /// For pull request events this is the head commit of the pull request,
    /// not the merge commit the workflow was triggered on.
    ///
    /// # Errors
    ///
    /// Fails when a pull request has no number, its head can't be fetched,
    /// or no sha is known at all.
    pub async fn resolve_commit_sha(
        &self,
        platform: &dyn DeploymentPlatform,
    ) -> Result<String, ContextError> {
        let sha = match self.pull_request {
            PullRequest::Absent => self.sha.clone(),
            PullRequest::Unnumbered => return Err(ContextError::MissingPullRequestNumber),
            PullRequest::Numbered(number) => {
                let head = platform
                    .pull_request_head_sha(&self.repo, number)
                    .await
                    .map_err(ContextError::PullRequestHead)?;
                tracing::info!(pull_request = number, sha = %head, "Using pull request head commit");
                Some(head)
            }
        };

        non_empty(sha).ok_or(ContextError::MissingSha)
    }
}
