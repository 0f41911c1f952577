// ABOUTME: Gate struct parameterized by state marker, and the pipeline driving it.
// ABOUTME: Runs resolve, status and url stages strictly in sequence for one application.

use std::sync::Arc;

use super::error::GateError;
use super::resolve::{DeploymentResolver, ResolveMode};
use super::state::{Pending, Ready, Resolved};
use super::status::StatusWaiter;
use super::url::{UrlCheckResult, UrlWaiter};
use crate::github::{Deployment, DeploymentPlatform, DeploymentQuery, DeploymentStatus};
use crate::http::HttpClient;
use crate::retry::{RetryPolicy, Sleeper};
use crate::types::{ApplicationTarget, DeploymentId, RepoRef};

/// One application's gate, parameterized by its current state.
///
/// The state type carries what the previous stage produced, so the status
/// stage can't run without a deployment and the url stage can't run without
/// a target url.
#[derive(Debug)]
pub struct DeploymentGate<S> {
    pub(crate) query: DeploymentQuery,
    pub(crate) state: S,
}

impl DeploymentGate<Pending> {
    pub fn new(query: DeploymentQuery) -> Self {
        Self {
            query,
            state: Pending,
        }
    }
}

impl DeploymentGate<Resolved> {
    pub fn deployment(&self) -> &Deployment {
        &self.state.deployment
    }
}

impl DeploymentGate<Ready> {
    pub fn deployment_id(&self) -> DeploymentId {
        self.state.deployment_id
    }

    pub fn status(&self) -> &DeploymentStatus {
        &self.state.status
    }

    pub fn target_url(&self) -> &str {
        &self.state.target_url
    }
}

/// Per-run settings shared by every application's gate.
#[derive(Debug, Clone)]
pub struct GateSettings {
    pub actor_name: String,
    pub environment: String,
    pub resolve_mode: ResolveMode,
    pub allow_inactive: bool,
    pub retry: RetryPolicy,
    pub path: String,
    pub protection_password: Option<String>,
}

impl GateSettings {
    /// Query for `application` (or the unlabeled deployment) at `sha`.
    pub fn query(
        &self,
        repo: RepoRef,
        sha: Option<String>,
        application: Option<ApplicationTarget>,
    ) -> DeploymentQuery {
        DeploymentQuery {
            repo,
            environment: self.environment.clone(),
            actor_name: self.actor_name.clone(),
            commit_sha: sha,
            application,
        }
    }
}

/// External collaborators, shared across concurrent gates.
#[derive(Clone)]
pub struct Services {
    pub platform: Arc<dyn DeploymentPlatform>,
    pub http: Arc<dyn HttpClient>,
    pub sleeper: Arc<dyn Sleeper>,
}

/// Run all three stages for `query`.
///
/// # Errors
///
/// The first failing stage, wrapped with its context. Nothing is retried
/// at this level.
pub async fn run_pipeline(
    services: &Services,
    settings: &GateSettings,
    query: DeploymentQuery,
) -> Result<UrlCheckResult, GateError> {
    let platform = services.platform.as_ref();
    let sleeper = services.sleeper.as_ref();

    let resolver = DeploymentResolver::new(platform, sleeper, settings.retry, settings.resolve_mode);
    let status_waiter = StatusWaiter::new(platform, sleeper, settings.retry, settings.allow_inactive);
    let url_waiter = UrlWaiter::new(
        services.http.as_ref(),
        sleeper,
        settings.retry,
        settings.protection_password.as_deref(),
    );

    DeploymentGate::new(query)
        .resolve(&resolver)
        .await?
        .await_status(&status_waiter)
        .await?
        .await_url(&url_waiter, &settings.path)
        .await
}
