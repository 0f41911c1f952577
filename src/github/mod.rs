// ABOUTME: Deployment platform access: the DeploymentPlatform trait and its GitHub REST client.
// ABOUTME: Exposes deployment, status, and query types consumed by the gate stages.

mod client;
mod error;
mod platform;
mod types;

pub use client::{DEFAULT_API_URL, GithubClient};
pub use error::PlatformError;
pub use platform::DeploymentPlatform;
pub use types::{Creator, Deployment, DeploymentQuery, DeploymentState, DeploymentStatus};
