// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Deployment ids, repository references, and application labels.

mod application;
mod id;
mod repo;

pub use application::{
    ApplicationLabel, ApplicationLabelError, ApplicationTarget, Applications, ApplicationsError,
};
pub use id::DeploymentId;
pub use repo::{RepoRef, RepoRefError};
