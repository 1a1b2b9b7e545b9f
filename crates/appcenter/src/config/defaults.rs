//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "appcenter.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "appcenter.yaml";

/// Config file names, in lookup order
pub fn config_file_names() -> Vec<&'static str> {
    vec![DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_YAML, "appcenter.yml"]
}

/// Environment variable holding the API token
pub const ENV_API_TOKEN: &str = "APPCENTER_API_TOKEN";

/// Environment variable holding the app owner
pub const ENV_OWNER: &str = "APPCENTER_OWNER";

/// Environment variable holding the app name
pub const ENV_APP: &str = "APPCENTER_APP";

/// Environment variable holding an API base URL override
pub const ENV_BASE_URL: &str = "APPCENTER_BASE_URL";

/// Starter configuration
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# App Center deploy configuration
# The API token is read from APPCENTER_API_TOKEN.

owner = "my-org"
app = "my-app"
groups = ["Collaborators"]
stores = []
testers = []

[release]
file = "build/app-release.apk"
mode = "api"
mandatory = false
notify_testers = true
# notes_file = "CHANGELOG.md"
# symbols = "build/mapping.txt"

[poll]
interval_secs = 3
max_attempts = 200
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployConfig;

    #[test]
    fn test_template_parses() {
        let config: DeployConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.owner, "my-org");
        assert_eq!(config.groups, vec!["Collaborators"]);
        assert!(config.release.notify_testers);
        assert_eq!(config.poll.max_attempts, 200);
    }
}
