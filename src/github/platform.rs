// ABOUTME: Capability trait for the deployment platform.
// ABOUTME: Lists deployments and statuses and resolves pull request head commits.

use async_trait::async_trait;

use super::error::PlatformError;
use super::types::{Deployment, DeploymentStatus};
use crate::types::{DeploymentId, RepoRef};

/// Read-only view of the platform's deployment records.
#[async_trait]
pub trait DeploymentPlatform: Send + Sync {
    /// List deployments for `environment`, optionally restricted to one commit.
    async fn list_deployments(
        &self,
        repo: &RepoRef,
        environment: &str,
        sha: Option<&str>,
    ) -> Result<Vec<Deployment>, PlatformError>;

    /// List statuses of a deployment, most recent first.
    async fn list_deployment_statuses(
        &self,
        repo: &RepoRef,
        deployment_id: DeploymentId,
    ) -> Result<Vec<DeploymentStatus>, PlatformError>;

    /// Head commit sha of a pull request.
    async fn pull_request_head_sha(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<String, PlatformError>;
}
