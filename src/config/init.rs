// ABOUTME: Config scaffolding for new repositories.
// ABOUTME: Writes a commented deployment-gate.yml template.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, DEFAULT_ACTOR_NAME, DEFAULT_ENVIRONMENT, DEFAULT_PATH};

/// Write the template config into `dir` and return its path.
pub fn init_config(dir: &Path, applications: &[String], force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, generate_template_yaml(applications))?;
    Ok(config_path)
}

fn generate_template_yaml(applications: &[String]) -> String {
    let applications = if applications.is_empty() {
        "# applications:\n#   - web\n#   - docs".to_string()
    } else {
        let entries: Vec<String> = applications.iter().map(|a| format!("  - {a}")).collect();
        format!("applications:\n{}", entries.join("\n"))
    };

    format!(
        r#"# Account that creates the deployments
actor_name: "{DEFAULT_ACTOR_NAME}"
environment: {DEFAULT_ENVIRONMENT}
max_timeout: 60s
check_interval: 2s
path: {DEFAULT_PATH}
# allow_inactive_deployment: false
# use_latest_deployment: false
# Protection password, read from the environment
# vercel_password:
#   env: VERCEL_PASSWORD
{applications}
# application_prefix: my-org-
"#
    )
}
