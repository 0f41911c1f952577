// ABOUTME: Wait command implementation.
// ABOUTME: Resolves the commit, runs every application's gate and reports the outcome.

use crate::cli::WaitArgs;
use deployment_gate::config::{Config, Overrides, parse_bool, parse_duration};
use deployment_gate::context::{CommitContext, ContextError};
use deployment_gate::error::{Error, Result};
use deployment_gate::gate::Services;
use deployment_gate::github::{DeploymentPlatform, GithubClient};
use deployment_gate::http::ReqwestHttpClient;
use deployment_gate::orchestrator::Orchestrator;
use deployment_gate::output::{GithubEnvSink, Output, OutputSink, StdoutSink};
use deployment_gate::retry::TokioSleeper;
use std::sync::Arc;

const TOKEN_FALLBACK_VAR: &str = "GITHUB_TOKEN";

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_input<T>(
    name: &str,
    value: Option<&str>,
    parse: impl Fn(&str) -> std::result::Result<T, String>,
) -> Result<Option<T>> {
    non_empty(value)
        .map(|v| parse(&v).map_err(|e| Error::InvalidConfig(format!("{name}: {e}"))))
        .transpose()
}

/// Config overrides from command line flags and workflow inputs.
/// Empty values count as unset.
pub fn overrides(args: &WaitArgs) -> Result<Overrides> {
    Ok(Overrides {
        actor_name: non_empty(args.actor_name.as_deref()),
        environment: non_empty(args.environment.as_deref()),
        allow_inactive_deployment: parse_input(
            "allow_inactive_deployment",
            args.allow_inactive_deployment.as_deref(),
            parse_bool,
        )?,
        use_latest_deployment: parse_input(
            "use_latest_deployment",
            args.use_latest_deployment.as_deref(),
            parse_bool,
        )?,
        max_timeout: parse_input("max_timeout", args.max_timeout.as_deref(), parse_duration)?,
        check_interval: parse_input(
            "check_interval",
            args.check_interval.as_deref(),
            parse_duration,
        )?,
        path: non_empty(args.path.as_deref()),
        vercel_password: args.vercel_password.clone().filter(|p| !p.is_empty()),
        applications: non_empty(args.applications.as_deref()),
        application_prefix: args.application_prefix.clone().filter(|p| !p.is_empty()),
        api_url: non_empty(args.api_url.as_deref()),
    })
}

fn github_token(args: &WaitArgs) -> Result<String> {
    non_empty(args.github_token.as_deref())
        .or_else(|| non_empty(std::env::var(TOKEN_FALLBACK_VAR).ok().as_deref()))
        .ok_or(Error::MissingToken)
}

fn output_sink() -> Arc<dyn OutputSink> {
    match GithubEnvSink::from_env() {
        Some(sink) => Arc::new(sink),
        None => Arc::new(StdoutSink::default()),
    }
}

/// Wait for the current commit's deployments.
pub async fn wait(config: Config, args: &WaitArgs, mut output: Output) -> Result<()> {
    output.start_timer();

    let token = github_token(args)?;
    let client = GithubClient::new(&token, config.api_url())?;
    tracing::debug!(api_url = %client.api_url(), "Using GitHub API");
    let platform: Arc<dyn DeploymentPlatform> = Arc::new(client);

    let repository =
        non_empty(args.repository.as_deref()).ok_or(ContextError::MissingRepository)?;
    let context =
        CommitContext::from_parts(&repository, args.sha.clone(), args.event_path.as_deref())?;
    let sha = context.resolve_commit_sha(platform.as_ref()).await?;

    let applications = config.applications()?;
    let settings = config.gate_settings()?;

    output.progress(&format!(
        "Waiting for {} deployment(s) of {} at {sha} by {}",
        applications.pipeline_count(),
        context.repo,
        settings.actor_name
    ));

    let services = Services {
        platform,
        http: Arc::new(ReqwestHttpClient::new().map_err(Error::HttpClient)?),
        sleeper: Arc::new(TokioSleeper),
    };
    let orchestrator = Orchestrator::new(services, settings, output_sink());

    match orchestrator.run(&context.repo, Some(&sha), &applications).await {
        Ok(results) => {
            for result in &results {
                let name = result
                    .application
                    .as_ref()
                    .map(|label| label.as_str())
                    .unwrap_or("deployment");
                output.progress(&format!("  ✓ {name}: {}", result.check.url));
            }
            output.success("Deployments are available");
            Ok(())
        }
        Err(mut e) => {
            tracing::error!(application = ?e.application, "Deployment gate failed");
            let stragglers = e.take_stragglers();
            if !stragglers.is_empty() {
                output.warning(&format!(
                    "waiting for {} other gate(s) to finish before exiting",
                    stragglers.len()
                ));
                let succeeded = stragglers.settle().await;
                tracing::info!(succeeded, "Remaining gates finished");
            }
            Err(e.into())
        }
    }
}
