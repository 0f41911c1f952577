// ABOUTME: Gate state markers for the type state pattern.
// ABOUTME: Each state carries the data the next stage needs.

use crate::github::{Deployment, DeploymentStatus};
use crate::types::DeploymentId;

/// Nothing resolved yet.
/// Available actions: `resolve()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Pending;

/// A deployment for the commit and actor was found.
/// Available actions: `await_status()`
#[derive(Debug, Clone)]
pub struct Resolved {
    pub(crate) deployment: Deployment,
}

/// The deployment reached an accepted state and exposes a target url.
/// Available actions: `await_url()`
#[derive(Debug, Clone)]
pub struct Ready {
    pub(crate) deployment_id: DeploymentId,
    pub(crate) status: DeploymentStatus,
    pub(crate) target_url: String,
}
