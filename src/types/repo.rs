// ABOUTME: Repository reference in owner/name form.
// ABOUTME: Parses the GITHUB_REPOSITORY convention and renders API path segments.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoRefError {
    #[error("repository must be in the form owner/name, got '{0}'")]
    Malformed(String),

    #[error("repository owner cannot be empty")]
    EmptyOwner,

    #[error("repository name cannot be empty")]
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    owner: String,
    repo: String,
}

impl RepoRef {
    pub fn new(owner: &str, repo: &str) -> Result<Self, RepoRefError> {
        let owner = owner.trim();
        let repo = repo.trim();

        if owner.is_empty() {
            return Err(RepoRefError::EmptyOwner);
        }
        if repo.is_empty() {
            return Err(RepoRefError::EmptyName);
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    pub fn parse(value: &str) -> Result<Self, RepoRefError> {
        let (owner, repo) = value
            .trim()
            .split_once('/')
            .ok_or_else(|| RepoRefError::Malformed(value.to_string()))?;

        if repo.contains('/') {
            return Err(RepoRefError::Malformed(value.to_string()));
        }

        Self::new(owner, repo)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl FromStr for RepoRef {
    type Err = RepoRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
