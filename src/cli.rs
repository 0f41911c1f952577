// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Wait inputs also read the INPUT_* variables GitHub Actions sets for action inputs.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deployment-gate")]
#[command(about = "Wait for a commit's preview deployment to succeed and answer")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print feedback as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: deployment-gate.yml in the working directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Wait for the deployment(s) of the current commit and export their urls
    Wait(WaitArgs),

    /// Initialize a new deployment-gate.yml configuration file
    Init {
        /// Application to list in the template (repeatable)
        #[arg(short, long = "application")]
        applications: Vec<String>,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct WaitArgs {
    /// Token for the GitHub API (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Account that creates the deployments
    #[arg(long, env = "INPUT_ACTOR_NAME")]
    pub actor_name: Option<String>,

    /// Deployment environment name
    #[arg(long, env = "INPUT_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Accept deployments whose latest status is inactive
    #[arg(
        long,
        env = "INPUT_ALLOW_INACTIVE_DEPLOYMENT",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub allow_inactive_deployment: Option<String>,

    /// Use the newest deployment by the actor instead of the commit's
    #[arg(
        long,
        env = "INPUT_USE_LATEST_DEPLOYMENT",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub use_latest_deployment: Option<String>,

    /// Maximum wait per stage (seconds or e.g. "2m")
    #[arg(long, env = "INPUT_MAX_TIMEOUT")]
    pub max_timeout: Option<String>,

    /// Pause between attempts (seconds or e.g. "500ms")
    #[arg(long, env = "INPUT_CHECK_INTERVAL")]
    pub check_interval: Option<String>,

    /// Path probed on the deployment url
    #[arg(long, env = "INPUT_PATH")]
    pub path: Option<String>,

    /// Deployment protection password
    #[arg(long, env = "INPUT_VERCEL_PASSWORD", hide_env_values = true)]
    pub vercel_password: Option<String>,

    /// Comma-separated application names
    #[arg(long, env = "INPUT_APPLICATIONS")]
    pub applications: Option<String>,

    /// Prefix added to application names in environment names
    #[arg(long, env = "INPUT_APPLICATION_PREFIX")]
    pub application_prefix: Option<String>,

    /// GitHub API base url
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Repository in owner/name form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Commit sha that triggered the run
    #[arg(long, env = "GITHUB_SHA")]
    pub sha: Option<String>,

    /// Event payload JSON file
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,
}
