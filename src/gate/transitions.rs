// ABOUTME: State transition methods for the deployment gate.
// ABOUTME: Each method consumes self and returns the next state on success.

use snafu::{OptionExt, ResultExt};

use super::error::{GateError, MissingTargetUrlSnafu, ResolveSnafu, StatusSnafu, UrlCheckSnafu};
use super::pipeline::DeploymentGate;
use super::resolve::DeploymentResolver;
use super::state::{Pending, Ready, Resolved};
use super::status::StatusWaiter;
use super::url::{UrlCheckResult, UrlWaiter};

impl DeploymentGate<Pending> {
    /// Find the deployment created by the configured actor.
    pub async fn resolve(
        self,
        resolver: &DeploymentResolver<'_>,
    ) -> Result<DeploymentGate<Resolved>, GateError> {
        let deployment = resolver
            .resolve(&self.query)
            .await
            .context(ResolveSnafu {
                actor: self.query.actor_name.as_str(),
            })?;

        tracing::info!(
            application = self.query.application_name(),
            deployment_id = %deployment.id,
            "Deployment found"
        );

        Ok(DeploymentGate {
            query: self.query,
            state: Resolved { deployment },
        })
    }
}

impl DeploymentGate<Resolved> {
    /// Wait for the deployment to succeed and take its target url.
    ///
    /// A successful status without a target url fails immediately.
    pub async fn await_status(
        self,
        waiter: &StatusWaiter<'_>,
    ) -> Result<DeploymentGate<Ready>, GateError> {
        let deployment_id = self.state.deployment.id;
        let status = waiter
            .wait(&self.query.repo, deployment_id)
            .await
            .context(StatusSnafu { deployment_id })?;

        let target_url = status
            .target_url()
            .map(str::to_string)
            .context(MissingTargetUrlSnafu { deployment_id })?;

        tracing::info!(
            application = self.query.application_name(),
            %deployment_id,
            state = %status.state,
            %target_url,
            "Deployment is ready"
        );

        Ok(DeploymentGate {
            query: self.query,
            state: Ready {
                deployment_id,
                status,
                target_url,
            },
        })
    }
}

impl DeploymentGate<Ready> {
    /// Wait for the target url to answer at `path`.
    pub async fn await_url(
        self,
        waiter: &UrlWaiter<'_>,
        path: &str,
    ) -> Result<UrlCheckResult, GateError> {
        let target_url = self.state.target_url;
        let result = waiter
            .wait(&target_url, path)
            .await
            .context(UrlCheckSnafu {
                target_url: target_url.as_str(),
            })?;

        tracing::info!(
            application = self.query.application_name(),
            url = %result.url,
            "Deployment is available"
        );

        Ok(result)
    }
}
