// ABOUTME: Waits for a resolved deployment to report an accepted status.
// ABOUTME: Only the most recent status entry counts on each poll.

use thiserror::Error;

use crate::github::{DeploymentPlatform, DeploymentState, DeploymentStatus, PlatformError};
use crate::retry::{Attempt, PollOutcome, Poller, RetryPolicy, Sleeper};
use crate::types::{DeploymentId, RepoRef};

/// Why a single status poll did not succeed.
#[derive(Debug, Error)]
pub enum StatusAttemptError {
    #[error("No status was available")]
    NoStatus,

    #[error("No status with state \"success\" was available (latest: {0})")]
    NotSuccessful(DeploymentState),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

#[derive(Debug, Error)]
pub enum StatusWaitError {
    #[error("Timeout reached: Unable to wait for a deployment to be successful")]
    Timeout {
        attempts: u64,
        #[source]
        last_error: Option<StatusAttemptError>,
    },
}

pub struct StatusWaiter<'a> {
    platform: &'a dyn DeploymentPlatform,
    sleeper: &'a dyn Sleeper,
    policy: RetryPolicy,
    allow_inactive: bool,
}

impl<'a> StatusWaiter<'a> {
    pub fn new(
        platform: &'a dyn DeploymentPlatform,
        sleeper: &'a dyn Sleeper,
        policy: RetryPolicy,
        allow_inactive: bool,
    ) -> Self {
        Self {
            platform,
            sleeper,
            policy,
            allow_inactive,
        }
    }

    fn accepts(&self, state: DeploymentState) -> bool {
        state == DeploymentState::Success
            || (self.allow_inactive && state == DeploymentState::Inactive)
    }

    async fn check_once(
        &self,
        repo: &RepoRef,
        deployment_id: DeploymentId,
    ) -> Result<DeploymentStatus, StatusAttemptError> {
        let statuses = self
            .platform
            .list_deployment_statuses(repo, deployment_id)
            .await?;

        let status = latest_status(statuses).ok_or(StatusAttemptError::NoStatus)?;
        if self.accepts(status.state) {
            Ok(status)
        } else {
            Err(StatusAttemptError::NotSuccessful(status.state))
        }
    }

    /// Poll until the latest status of `deployment_id` is accepted.
    ///
    /// # Errors
    ///
    /// `Timeout` once the attempt budget is spent.
    pub async fn wait(
        &self,
        repo: &RepoRef,
        deployment_id: DeploymentId,
    ) -> Result<DeploymentStatus, StatusWaitError> {
        let outcome = Poller::new(self.policy, self.sleeper)
            .run(move |attempt| async move {
                match self.check_once(repo, deployment_id).await {
                    Ok(status) => Attempt::Ready(status),
                    Err(e) => {
                        if !matches!(e, StatusAttemptError::NotSuccessful(_)) {
                            tracing::warn!(%deployment_id, error = %e, "Status check failed");
                        }
                        tracing::info!(
                            %deployment_id,
                            %attempt,
                            "Deployment unavailable or not successful, retrying (attempt {attempt})"
                        );
                        Attempt::Retry(Some(e))
                    }
                }
            })
            .await;

        match outcome {
            PollOutcome::Succeeded { value, attempt } => {
                tracing::debug!(%deployment_id, state = %value.state, attempt, "Deployment status accepted");
                Ok(value)
            }
            PollOutcome::Exhausted {
                attempts,
                last_error,
            } => Err(StatusWaitError::Timeout {
                attempts,
                last_error,
            }),
        }
    }
}

/// Most recent status entry.
///
/// The platform returns statuses newest first. When every entry carries a
/// timestamp the list is re-sorted to be sure; the sort is stable.
fn latest_status(mut statuses: Vec<DeploymentStatus>) -> Option<DeploymentStatus> {
    if statuses.iter().all(|s| s.created_at.is_some()) {
        statuses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    statuses.into_iter().next()
}
