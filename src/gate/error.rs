// ABOUTME: Gate error types with SNAFU pattern.
// ABOUTME: Wraps stage failures with the deployment context they happened in.

use snafu::Snafu;

use super::resolve::ResolveError;
use super::status::StatusWaitError;
use super::url::{ProbeError, UrlWaitError};
use crate::types::DeploymentId;

/// Failure of one application's gate, wrapped with stage context.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GateError {
    #[snafu(display("Check failure: Failed to find a deployment for actor \"{actor}\""))]
    Resolve { actor: String, source: ResolveError },

    #[snafu(display(
        "Check failure: Failed to find a deployment status for deployment \"{deployment_id}\""
    ))]
    Status {
        deployment_id: DeploymentId,
        source: StatusWaitError,
    },

    #[snafu(display("Check failure: No `target_url` was found in the status check"))]
    MissingTargetUrl { deployment_id: DeploymentId },

    #[snafu(display("Check failure: Failed to get a successful response from \"{target_url}\""))]
    UrlCheck {
        target_url: String,
        source: UrlWaitError,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateErrorKind {
    /// No deployment by the actor appeared within the budget.
    DeploymentNotFound,
    /// The deployment never reached an accepted state.
    DeploymentStatusTimeout,
    /// The accepted status had no target url.
    MissingTargetUrl,
    /// The target url never answered.
    UrlCheckTimeout,
    /// The last url probe failed while exchanging the protection password.
    AuthExchangeFailure,
}

impl GateError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> GateErrorKind {
        match self {
            GateError::Resolve { .. } => GateErrorKind::DeploymentNotFound,
            GateError::Status { .. } => GateErrorKind::DeploymentStatusTimeout,
            GateError::MissingTargetUrl { .. } => GateErrorKind::MissingTargetUrl,
            GateError::UrlCheck { source, .. } => match source {
                UrlWaitError::Timeout {
                    last_error: Some(ProbeError::Auth(_)),
                    ..
                } => GateErrorKind::AuthExchangeFailure,
                UrlWaitError::Timeout { .. } => GateErrorKind::UrlCheckTimeout,
            },
        }
    }

    /// Chain of underlying causes, outermost first, excluding this error.
    pub fn causes(&self) -> Vec<String> {
        let mut causes = Vec::new();
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            causes.push(cause.to_string());
            current = cause.source();
        }
        causes
    }
}
