// ABOUTME: Numeric deployment identifier assigned by the deployment platform.
// ABOUTME: Transparent for serde so it maps straight onto API payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a deployment record on the platform.
///
/// Kept distinct from plain integers so a status id or pull request number
/// can't be passed where a deployment id is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use = "IDs reference resources and should not be ignored"]
pub struct DeploymentId(u64);

impl DeploymentId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for DeploymentId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
