// ABOUTME: Configuration types and parsing for deployment-gate.yml.
// ABOUTME: Layers defaults, the optional config file, and command line or workflow inputs.

mod deserialize;
mod env_value;
mod init;

pub use deserialize::{parse_bool, parse_duration};
pub use env_value::EnvValue;
pub use init::init_config;

use crate::error::{Error, Result};
use crate::gate::{GateSettings, ResolveMode};
use crate::github::DEFAULT_API_URL;
use crate::retry::RetryPolicy;
use crate::types::Applications;
use deserialize::{deserialize_applications, deserialize_duration};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "deployment-gate.yml";
pub const CONFIG_FILENAME_ALT: &str = "deployment-gate.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".github/deployment-gate.yml";

pub const DEFAULT_ACTOR_NAME: &str = "vercel[bot]";
pub const DEFAULT_ENVIRONMENT: &str = "Preview";
pub const DEFAULT_PATH: &str = "/";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_actor_name")]
    pub actor_name: String,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default)]
    pub allow_inactive_deployment: bool,

    #[serde(default)]
    pub use_latest_deployment: bool,

    #[serde(default = "default_max_timeout", deserialize_with = "deserialize_duration")]
    pub max_timeout: Duration,

    #[serde(
        default = "default_check_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub check_interval: Duration,

    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default)]
    pub vercel_password: Option<EnvValue>,

    #[serde(default, deserialize_with = "deserialize_applications")]
    pub applications: Vec<String>,

    #[serde(default)]
    pub application_prefix: Option<String>,

    #[serde(default)]
    pub api_url: Option<String>,
}

fn default_actor_name() -> String {
    DEFAULT_ACTOR_NAME.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn default_max_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_check_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_path() -> String {
    DEFAULT_PATH.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            actor_name: default_actor_name(),
            environment: default_environment(),
            allow_inactive_deployment: false,
            use_latest_deployment: false,
            max_timeout: default_max_timeout(),
            check_interval: default_check_interval(),
            path: default_path(),
            vercel_password: None,
            applications: Vec::new(),
            application_prefix: None,
            api_url: None,
        }
    }
}

/// Values given on the command line or as workflow inputs.
///
/// Each set field replaces the config file's value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub actor_name: Option<String>,
    pub environment: Option<String>,
    pub allow_inactive_deployment: Option<bool>,
    pub use_latest_deployment: Option<bool>,
    pub max_timeout: Option<Duration>,
    pub check_interval: Option<Duration>,
    pub path: Option<String>,
    pub vercel_password: Option<String>,
    pub applications: Option<String>,
    pub application_prefix: Option<String>,
    pub api_url: Option<String>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// First config file present in `dir`, if any.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        [CONFIG_FILENAME, CONFIG_FILENAME_ALT, CONFIG_FILENAME_DIR]
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Load the config file in `dir`, or the defaults when there is none.
    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::find(dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Load an explicitly named config file.
    pub fn load_required(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        Self::load(path)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        let Overrides {
            actor_name,
            environment,
            allow_inactive_deployment,
            use_latest_deployment,
            max_timeout,
            check_interval,
            path,
            vercel_password,
            applications,
            application_prefix,
            api_url,
        } = overrides;

        if let Some(v) = actor_name {
            self.actor_name = v;
        }
        if let Some(v) = environment {
            self.environment = v;
        }
        if let Some(v) = allow_inactive_deployment {
            self.allow_inactive_deployment = v;
        }
        if let Some(v) = use_latest_deployment {
            self.use_latest_deployment = v;
        }
        if let Some(v) = max_timeout {
            self.max_timeout = v;
        }
        if let Some(v) = check_interval {
            self.check_interval = v;
        }
        if let Some(v) = path {
            self.path = v;
        }
        if let Some(v) = vercel_password {
            self.vercel_password = Some(EnvValue::Literal(v));
        }
        if let Some(v) = applications {
            self.applications = vec![v];
        }
        if let Some(v) = application_prefix {
            self.application_prefix = Some(v);
        }
        if let Some(v) = api_url {
            self.api_url = Some(v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.actor_name.trim().is_empty() {
            return Err(Error::InvalidConfig("actor_name cannot be empty".to_string()));
        }
        if self.environment.trim().is_empty() {
            return Err(Error::InvalidConfig("environment cannot be empty".to_string()));
        }
        if self.path.is_empty() {
            return Err(Error::InvalidConfig("path cannot be empty".to_string()));
        }
        self.retry_policy()?;
        self.applications()?;
        Ok(())
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        RetryPolicy::new(self.max_timeout, self.check_interval)
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn applications(&self) -> Result<Applications> {
        Applications::from_entries(&self.applications, self.application_prefix.as_deref())
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn resolve_mode(&self) -> ResolveMode {
        if self.use_latest_deployment {
            ResolveMode::Latest
        } else {
            ResolveMode::PollForActor
        }
    }

    /// Protection password, if configured and non-empty.
    pub fn protection_password(&self) -> Result<Option<String>> {
        match &self.vercel_password {
            Some(value) => Ok(Some(value.resolve()?).filter(|p| !p.is_empty())),
            None => Ok(None),
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn gate_settings(&self) -> Result<GateSettings> {
        Ok(GateSettings {
            actor_name: self.actor_name.clone(),
            environment: self.environment.clone(),
            resolve_mode: self.resolve_mode(),
            allow_inactive: self.allow_inactive_deployment,
            retry: self.retry_policy()?,
            path: self.path.clone(),
            protection_password: self.protection_password()?,
        })
    }
}
