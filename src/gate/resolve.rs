// ABOUTME: Deployment resolution: find the deployment created by the expected actor.
// ABOUTME: Polls the platform until it appears, or picks the most recent one in latest mode.

use thiserror::Error;

use crate::github::{Deployment, DeploymentPlatform, DeploymentQuery, PlatformError};
use crate::retry::{Attempt, PollOutcome, Poller, RetryPolicy, Sleeper};

/// How the deployment is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Poll deployments of the commit until the actor's one shows up.
    #[default]
    PollForActor,
    /// Take the newest deployment by the actor in the environment, once.
    Latest,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Timeout reached: No deployment was found")]
    NotFound {
        attempts: u64,
        #[source]
        last_error: Option<PlatformError>,
    },

    #[error(
        "Fetch failure: Failed to find latest deployment for application \"{application}\" and actor \"{actor}\""
    )]
    NoLatest {
        application: String,
        actor: String,
        #[source]
        source: Option<PlatformError>,
    },
}

pub struct DeploymentResolver<'a> {
    platform: &'a dyn DeploymentPlatform,
    sleeper: &'a dyn Sleeper,
    policy: RetryPolicy,
    mode: ResolveMode,
}

impl<'a> DeploymentResolver<'a> {
    pub fn new(
        platform: &'a dyn DeploymentPlatform,
        sleeper: &'a dyn Sleeper,
        policy: RetryPolicy,
        mode: ResolveMode,
    ) -> Self {
        Self {
            platform,
            sleeper,
            policy,
            mode,
        }
    }

    /// Locate the deployment matching `query`.
    ///
    /// # Errors
    ///
    /// `NotFound` once the attempt budget is spent, `NoLatest` when latest
    /// mode finds no deployment by the actor.
    pub async fn resolve(&self, query: &DeploymentQuery) -> Result<Deployment, ResolveError> {
        match self.mode {
            ResolveMode::PollForActor => self.poll_for_actor(query).await,
            ResolveMode::Latest => self.latest(query).await,
        }
    }

    async fn find_once(&self, query: &DeploymentQuery) -> Result<Option<Deployment>, PlatformError> {
        let deployments = self
            .platform
            .list_deployments(
                &query.repo,
                &query.environment_key(),
                query.commit_sha.as_deref(),
            )
            .await?;

        Ok(deployments
            .into_iter()
            .find(|d| d.is_created_by(&query.actor_name)))
    }

    async fn poll_for_actor(&self, query: &DeploymentQuery) -> Result<Deployment, ResolveError> {
        let application = query.application_name().unwrap_or("default");

        let outcome = Poller::new(self.policy, self.sleeper)
            .run(move |attempt| async move {
                match self.find_once(query).await {
                    Ok(Some(deployment)) => Attempt::Ready(deployment),
                    Ok(None) => {
                        tracing::info!(
                            application,
                            actor = %query.actor_name,
                            environment = %query.environment_key(),
                            %attempt,
                            "Could not find any deployments for actor, retrying"
                        );
                        Attempt::Retry(None)
                    }
                    Err(e) => {
                        tracing::warn!(
                            application,
                            error = %e,
                            %attempt,
                            "Error while fetching deployments, retrying"
                        );
                        Attempt::Retry(Some(e))
                    }
                }
            })
            .await;

        match outcome {
            PollOutcome::Succeeded { value, .. } => Ok(value),
            PollOutcome::Exhausted {
                attempts,
                last_error,
            } => Err(ResolveError::NotFound {
                attempts,
                last_error,
            }),
        }
    }

    async fn latest(&self, query: &DeploymentQuery) -> Result<Deployment, ResolveError> {
        let no_latest = |source| ResolveError::NoLatest {
            application: query.application_name().unwrap_or_default().to_string(),
            actor: query.actor_name.clone(),
            source,
        };

        let mut deployments = self
            .platform
            .list_deployments(&query.repo, &query.environment_key(), None)
            .await
            .map_err(|e| no_latest(Some(e)))?;

        deployments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        deployments
            .into_iter()
            .find(|d| d.is_created_by(&query.actor_name))
            .ok_or_else(|| no_latest(None))
    }
}
