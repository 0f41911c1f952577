// ABOUTME: Per-application deployment gate using the type state pattern.
// ABOUTME: Resolve -> status -> URL stages, each a bounded polling loop.

mod auth;
mod error;
mod pipeline;
mod resolve;
mod state;
mod status;
mod transitions;
mod url;

pub use auth::{
    AUTH_ACCEPTED_STATUSES, AuthError, AuthExchange, AuthToken, PASSWORD_FIELD, PROTECTION_COOKIE,
};
pub use error::{GateError, GateErrorKind};
pub use pipeline::{DeploymentGate, GateSettings, Services, run_pipeline};
pub use resolve::{DeploymentResolver, ResolveError, ResolveMode};
pub use state::{Pending, Ready, Resolved};
pub use status::{StatusAttemptError, StatusWaitError, StatusWaiter};
pub use url::{ProbeError, UrlCheckResult, UrlWaitError, UrlWaiter};
