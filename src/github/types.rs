// ABOUTME: Deployment platform records and the query that selects them.
// ABOUTME: Mirrors the subset of the GitHub deployments API the gate reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ApplicationTarget, DeploymentId, RepoRef};

/// Separator between the environment and the application label in
/// compound environment names (an en dash, not a hyphen).
pub const ENVIRONMENT_SEPARATOR: &str = " \u{2013} ";

/// Account that created a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub login: String,
}

/// A deployment record. Only `id` is used after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: DeploymentId,
    #[serde(default)]
    pub creator: Option<Creator>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
}

impl Deployment {
    pub fn creator_login(&self) -> Option<&str> {
        self.creator.as_ref().map(|c| c.login.as_str())
    }

    pub fn is_created_by(&self, actor_name: &str) -> bool {
        self.creator_login() == Some(actor_name)
    }
}

/// State of a deployment status entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Error,
    Failure,
    Inactive,
    InProgress,
    Queued,
    Pending,
    Success,
    #[serde(other)]
    Unknown,
}

impl DeploymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::Error => "error",
            DeploymentState::Failure => "failure",
            DeploymentState::Inactive => "inactive",
            DeploymentState::InProgress => "in_progress",
            DeploymentState::Queued => "queued",
            DeploymentState::Pending => "pending",
            DeploymentState::Success => "success",
            DeploymentState::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status entry attached to a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub state: DeploymentState,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub environment_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DeploymentStatus {
    pub fn new(state: DeploymentState) -> Self {
        Self {
            state,
            target_url: None,
            environment_url: None,
            created_at: None,
        }
    }

    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }

    /// The target url, treating an empty string as absent.
    pub fn target_url(&self) -> Option<&str> {
        self.target_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Which deployments to look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentQuery {
    pub repo: RepoRef,
    pub environment: String,
    pub actor_name: String,
    pub commit_sha: Option<String>,
    pub application: Option<ApplicationTarget>,
}

impl DeploymentQuery {
    /// Environment name as recorded by the platform.
    ///
    /// With an application this is `"{environment} – {application}"`.
    pub fn environment_key(&self) -> String {
        match &self.application {
            Some(app) => format!(
                "{}{}{}",
                self.environment, ENVIRONMENT_SEPARATOR, app.environment_label
            ),
            None => self.environment.clone(),
        }
    }

    /// Application name for log messages.
    pub fn application_name(&self) -> Option<&str> {
        self.application.as_ref().map(|app| app.label.as_str())
    }
}
