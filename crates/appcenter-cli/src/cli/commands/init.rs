//! Init command - write a starter configuration

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use appcenter::config::{DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML};

use crate::cli::{output, Cli};

/// Write a starter `appcenter.toml`
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, "executing init command");
        let path = match &self.output {
            Some(path) => path.clone(),
            None => std::env::current_dir()?.join(DEFAULT_CONFIG_TOML),
        };

        write_template(&path, self.force)?;

        if !cli.quiet {
            output::success(&format!("Wrote {}", path.display()));
        }
        Ok(())
    }
}

/// Write the starter template to `path`, refusing to replace a file unless `force`
fn write_template(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
    Ok(())
}
