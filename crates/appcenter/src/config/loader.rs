//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::{config_file_names, ENV_API_TOKEN, ENV_APP, ENV_BASE_URL, ENV_OWNER};
use super::types::DeployConfig;

/// Parse a configuration file, TOML or YAML by extension
///
/// Validation is left to the caller, since environment and command line
/// values may still fill in required fields.
pub fn load_config(path: &Path) -> Result<DeployConfig> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: DeployConfig = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    debug!(path = %path.display(), owner = %config.owner, app = %config.app, "config loaded");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// At each directory level the search checks:
///   1. `<dir>/<name>`          (e.g. `appcenter.toml`)
///   2. `<dir>/.github/<name>`  (e.g. `.github/appcenter.toml`)
///
/// The first match wins. Parents are walked until the filesystem root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.exists() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(DeployConfig, PathBuf)> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}

impl DeployConfig {
    /// Overlay `APPCENTER_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary lookup; empty values are ignored
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(token) = get(ENV_API_TOKEN) {
            debug!(var = ENV_API_TOKEN, "api token taken from environment");
            self.api_token = Some(token);
        }
        if let Some(owner) = get(ENV_OWNER) {
            debug!(var = ENV_OWNER, %owner, "owner taken from environment");
            self.owner = owner;
        }
        if let Some(app) = get(ENV_APP) {
            debug!(var = ENV_APP, %app, "app taken from environment");
            self.app = app;
        }
        if let Some(base_url) = get(ENV_BASE_URL) {
            debug!(var = ENV_BASE_URL, %base_url, "base URL taken from environment");
            self.base_url = Some(base_url);
        }
    }

    /// Release notes text, reading `notes_file` when no inline notes are set
    pub fn resolve_release_notes(&self) -> Result<Option<String>> {
        if let Some(notes) = &self.release.notes {
            return Ok(Some(notes.clone()));
        }
        match &self.release.notes_file {
            Some(path) => {
                let notes = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
                Ok(Some(notes.trim().to_string()))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadMode;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("appcenter.toml");
        std::fs::write(&config_path, "owner = \"acme\"").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_toml_over_yaml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("appcenter.toml");
        std::fs::write(&toml_path, "owner = \"acme\"").unwrap();
        std::fs::write(temp.path().join("appcenter.yaml"), "owner: other").unwrap();

        assert_eq!(find_config(temp.path()).unwrap(), toml_path);
    }

    #[test]
    fn test_find_config_in_github_dir_of_parent() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("appcenter.yml");
        std::fs::write(&config_path, "owner: acme").unwrap();
        let nested = temp.path().join("android").join("app");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested).unwrap(), config_path);
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("appcenter.toml");
        std::fs::write(
            &config_path,
            r#"
owner = "acme"
app = "android"
groups = ["beta", "qa"]

[release]
file = "app.apk"
mode = "cli"
notify_testers = true

[poll]
interval_secs = 5
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.owner, "acme");
        assert_eq!(config.groups, vec!["beta", "qa"]);
        assert_eq!(config.release.mode, UploadMode::Cli);
        assert!(config.release.notify_testers);
        assert_eq!(config.poll.interval_secs, 5);
        assert_eq!(config.poll.max_attempts, 200);
    }

    #[test]
    fn test_load_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("appcenter.yaml");
        std::fs::write(
            &config_path,
            "owner: acme\napp: ios\nstores:\n  - Production\nrelease:\n  file: app.ipa\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.app, "ios");
        assert_eq!(config.stores, vec!["Production"]);
        assert_eq!(config.release.mode, UploadMode::Api);
    }

    #[test]
    fn test_load_config_reports_parse_error() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("appcenter.toml");
        std::fs::write(&config_path, "owner = [").unwrap();

        let err = load_config(&config_path).unwrap_err();
        assert!(err.to_string().contains("TOML parsing error"));
    }

    #[test]
    fn test_load_config_from_dir_not_found() {
        let temp = TempDir::new().unwrap();
        // The walk goes up to the filesystem root.
        if find_config(temp.path()).is_none() {
            let err = load_config_from_dir(temp.path()).unwrap_err();
            assert!(err.to_string().contains("Configuration file not found"));
        }
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DeployConfig {
            owner: "from-file".to_string(),
            app: "app".to_string(),
            ..Default::default()
        };
        let env: HashMap<&str, &str> = [
            ("APPCENTER_API_TOKEN", "tok"),
            ("APPCENTER_OWNER", "from-env"),
            ("APPCENTER_APP", ""),
        ]
        .into_iter()
        .collect();

        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_token.as_deref(), Some("tok"));
        assert_eq!(config.owner, "from-env");
        assert_eq!(config.app, "app");
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_release_notes_from_file() {
        let temp = TempDir::new().unwrap();
        let notes_path = temp.path().join("NOTES.md");
        std::fs::write(&notes_path, "\nFixed crash on launch\n\n").unwrap();

        let mut config = DeployConfig::default();
        assert_eq!(config.resolve_release_notes().unwrap(), None);

        config.release.notes_file = Some(notes_path);
        assert_eq!(
            config.resolve_release_notes().unwrap().as_deref(),
            Some("Fixed crash on launch")
        );

        config.release.notes = Some("inline".to_string());
        assert_eq!(config.resolve_release_notes().unwrap().as_deref(), Some("inline"));
    }
}
