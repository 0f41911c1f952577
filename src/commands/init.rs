// ABOUTME: Init command implementation.
// ABOUTME: Writes the config template into the working directory.

use deployment_gate::config;
use deployment_gate::error::Result;
use deployment_gate::output::Output;
use std::env;

pub fn init(applications: &[String], force: bool, output: &Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let path = config::init_config(&cwd, applications, force)?;
    output.success(&format!("Created {}", path.display()));
    Ok(())
}
