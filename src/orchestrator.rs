// ABOUTME: Runs one deployment gate per application concurrently and exports their urls.
// ABOUTME: First failure wins; gates still running at that point are handed back, not cancelled.

use futures::future::select_all;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

use crate::gate::{GateError, GateSettings, Services, UrlCheckResult, run_pipeline};
use crate::output::{OutputError, OutputSink, constant_case};
use crate::types::{ApplicationLabel, ApplicationTarget, Applications, RepoRef};

const URL_KEY: &str = "URL";
const TOKEN_KEY: &str = "VERCEL_JWT";

/// Outcome of one successful gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationResult {
    pub application: Option<ApplicationLabel>,
    pub check: UrlCheckResult,
}

impl ApplicationResult {
    /// Key/value pairs to export, url first.
    ///
    /// Keys are `{LABEL}_URL` and `{LABEL}_VERCEL_JWT`, or `URL` and
    /// `VERCEL_JWT` without a label. The token is only exported when one
    /// was obtained.
    pub fn exports(&self) -> Vec<(String, String)> {
        let key = |suffix: &str| match &self.application {
            Some(label) => format!("{}_{suffix}", constant_case(label.as_str())),
            None => suffix.to_string(),
        };

        let mut exports = vec![(key(URL_KEY), self.check.url.clone())];
        if let Some(token) = &self.check.token {
            exports.push((key(TOKEN_KEY), token.as_str().to_string()));
        }
        exports
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Export(#[from] OutputError),

    #[error("gate task did not complete: {0}")]
    Join(#[from] JoinError),
}

type GateTask = JoinHandle<Result<ApplicationResult, ApplicationError>>;

/// Gates still running when the fan-out failed.
#[derive(Debug, Default)]
pub struct Stragglers(Vec<GateTask>);

impl Stragglers {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wait for every remaining gate to finish. Their failures are logged,
    /// not reported. Returns how many succeeded.
    pub async fn settle(self) -> usize {
        let mut succeeded = 0;
        for task in self.0 {
            match task.await {
                Ok(Ok(result)) => {
                    tracing::debug!(application = ?result.application, "Remaining gate succeeded");
                    succeeded += 1;
                }
                Ok(Err(e)) => tracing::warn!(error = %e, "Remaining gate failed"),
                Err(e) => tracing::warn!(error = %e, "Remaining gate did not complete"),
            }
        }
        succeeded
    }
}

/// The first gate failure of a run.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct FanOutError {
    pub application: Option<ApplicationLabel>,
    pub source: ApplicationError,
    stragglers: Stragglers,
}

impl FanOutError {
    /// Take the gates that were still running, leaving none behind.
    pub fn take_stragglers(&mut self) -> Stragglers {
        std::mem::take(&mut self.stragglers)
    }
}

pub struct Orchestrator {
    services: Services,
    settings: Arc<GateSettings>,
    sink: Arc<dyn OutputSink>,
}

impl Orchestrator {
    pub fn new(services: Services, settings: GateSettings, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            services,
            settings: Arc::new(settings),
            sink,
        }
    }

    fn spawn(
        &self,
        repo: &RepoRef,
        sha: Option<&str>,
        target: Option<ApplicationTarget>,
    ) -> GateTask {
        let services = self.services.clone();
        let settings = Arc::clone(&self.settings);
        let sink = Arc::clone(&self.sink);
        let application = target.as_ref().map(|t| t.label.clone());
        let span = tracing::info_span!(
            "gate",
            application = application.as_ref().map(ApplicationLabel::as_str)
        );
        let query = settings.query(repo.clone(), sha.map(str::to_string), target);

        tokio::spawn(
            async move {
                let check = run_pipeline(&services, &settings, query).await?;
                let result = ApplicationResult { application, check };
                for (key, value) in result.exports() {
                    sink.export(&key, &value)?;
                }
                Ok(result)
            }
            .instrument(span),
        )
    }

    /// Run every application's gate and export the results.
    ///
    /// Results come back in input order. On the first failure the error is
    /// returned at once; gates still running keep going and can be settled
    /// through [`FanOutError::take_stragglers`].
    ///
    /// # Errors
    ///
    /// The first gate failure to settle.
    pub async fn run(
        &self,
        repo: &RepoRef,
        sha: Option<&str>,
        applications: &Applications,
    ) -> Result<Vec<ApplicationResult>, FanOutError> {
        let targets: Vec<Option<ApplicationTarget>> = match applications {
            Applications::Single => vec![None],
            Applications::Multiple(targets) => targets.iter().cloned().map(Some).collect(),
        };

        tracing::info!(pipelines = targets.len(), "Starting deployment gates");

        let labels: Vec<Option<ApplicationLabel>> = targets
            .iter()
            .map(|t| t.as_ref().map(|t| t.label.clone()))
            .collect();
        let mut pending: Vec<(usize, GateTask)> = targets
            .into_iter()
            .enumerate()
            .map(|(slot, target)| (slot, self.spawn(repo, sha, target)))
            .collect();
        let mut results: Vec<Option<ApplicationResult>> = labels.iter().map(|_| None).collect();

        while !pending.is_empty() {
            let (joined, index) = {
                let (joined, index, _rest) =
                    select_all(pending.iter_mut().map(|(_, task)| task)).await;
                (joined, index)
            };
            let (slot, _finished) = pending.remove(index);

            match joined.map_err(ApplicationError::from).and_then(|r| r) {
                Ok(result) => results[slot] = Some(result),
                Err(source) => {
                    return Err(FanOutError {
                        application: labels[slot].clone(),
                        source,
                        stragglers: Stragglers(pending.into_iter().map(|(_, t)| t).collect()),
                    });
                }
            }
        }

        Ok(results.into_iter().flatten().collect())
    }
}
