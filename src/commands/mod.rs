// ABOUTME: Command module aggregator for the deployment-gate CLI.
// ABOUTME: Re-exports the wait and init command handlers.

mod init;
mod wait;

pub use init::init;
pub use wait::{overrides, wait};
