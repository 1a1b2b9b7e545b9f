//! Connection arguments shared by every command

use clap::Args;
use tracing::debug;

use appcenter::config::{load_config, load_config_from_dir};
use appcenter::{App, AppCenterError, ConfigError, DeployConfig};

use crate::cli::Cli;

/// Which app to talk to and how to authenticate
#[derive(Debug, Clone, Default, Args)]
pub struct AppArgs {
    /// API token
    #[arg(long, global = true, env = "APPCENTER_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// App owner (user or organization)
    #[arg(long, global = true, env = "APPCENTER_OWNER")]
    pub owner: Option<String>,

    /// App name
    #[arg(long, global = true, env = "APPCENTER_APP")]
    pub app: Option<String>,

    /// API base URL
    #[arg(long, global = true, env = "APPCENTER_BASE_URL")]
    pub base_url: Option<String>,
}

impl AppArgs {
    /// Overlay flags onto a loaded configuration
    pub fn apply(&self, config: &mut DeployConfig) {
        if let Some(token) = self.token.clone().filter(|t| !t.is_empty()) {
            config.api_token = Some(token);
        }
        if let Some(owner) = self.owner.clone().filter(|o| !o.is_empty()) {
            config.owner = owner;
        }
        if let Some(app) = self.app.clone().filter(|a| !a.is_empty()) {
            config.app = app;
        }
        if let Some(base_url) = self.base_url.clone().filter(|u| !u.is_empty()) {
            config.base_url = Some(base_url);
        }
    }
}

/// Config file, then environment, then flags
pub fn resolve_config(cli: &Cli, args: &AppArgs) -> anyhow::Result<DeployConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => match load_config_from_dir(&std::env::current_dir()?) {
            Ok((config, _path)) => config,
            Err(AppCenterError::Config(ConfigError::NotFound(dir))) => {
                debug!(dir = %dir.display(), "no config file, using environment and flags only");
                DeployConfig::default()
            }
            Err(e) => return Err(e.into()),
        },
    };

    config.apply_env_overrides();
    args.apply(&mut config);
    Ok(config)
}

/// Resolve configuration and open the app it names
pub fn open_app(cli: &Cli, args: &AppArgs) -> anyhow::Result<App> {
    let config = resolve_config(cli, args)?;
    for (field, value) in [("owner", &config.owner), ("app", &config.app)] {
        if value.is_empty() {
            return Err(AppCenterError::from(ConfigError::MissingField(
                field.to_string(),
            ))
            .into());
        }
    }

    let client = config.client(cli.debug_http)?;
    Ok(client.app(config.owner.as_str(), config.app.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = DeployConfig {
            api_token: Some("from-file".to_string()),
            owner: "file-owner".to_string(),
            app: "file-app".to_string(),
            ..Default::default()
        };
        let args = AppArgs {
            token: Some("from-flag".to_string()),
            owner: Some(String::new()),
            app: Some("flag-app".to_string()),
            base_url: None,
        };

        args.apply(&mut config);

        assert_eq!(config.api_token.as_deref(), Some("from-flag"));
        assert_eq!(config.owner, "file-owner");
        assert_eq!(config.app, "flag-app");
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_resolve_config_reads_explicit_file() {
        use clap::Parser;

        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("deploy.toml");
        std::fs::write(&path, "owner = \"acme\"\ngroups = [\"beta\"]\n").unwrap();

        let cli = Cli::try_parse_from([
            "appcenter-deploy",
            "--config",
            path.to_str().unwrap(),
            "release",
            "latest",
            "--app",
            "android",
        ])
        .unwrap();
        let args = AppArgs {
            app: Some("android".to_string()),
            ..Default::default()
        };

        let config = resolve_config(&cli, &args).unwrap();
        assert_eq!(config.app, "android");
        assert_eq!(config.groups, vec!["beta"]);
    }
}
