//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::{DeployConfig, UploadMode};

/// Validate a fully merged deploy configuration
pub fn validate_config(config: &DeployConfig) -> Result<()> {
    debug!("validating configuration");
    validate_credentials(config)?;
    validate_target(config)?;
    validate_release(config)?;
    validate_poll(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_credentials(config: &DeployConfig) -> Result<()> {
    if config.api_token.as_deref().map_or(true, str::is_empty) {
        return Err(ConfigError::MissingField("api_token".to_string()).into());
    }

    if let Some(base_url) = &config.base_url {
        if url::Url::parse(base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                message: format!("'{}' is not a valid URL", base_url),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_target(config: &DeployConfig) -> Result<()> {
    if config.owner.is_empty() {
        return Err(ConfigError::MissingField("owner".to_string()).into());
    }
    if config.app.is_empty() {
        return Err(ConfigError::MissingField("app".to_string()).into());
    }
    Ok(())
}

fn validate_release(config: &DeployConfig) -> Result<()> {
    if config.release.file.is_none() {
        return Err(ConfigError::MissingField("release.file".to_string()).into());
    }

    if config.release.mode == UploadMode::Cli && config.groups.iter().all(|g| g.is_empty()) {
        return Err(ConfigError::InvalidValue {
            field: "groups".to_string(),
            message: "cli mode needs at least one distribution group".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_poll(config: &DeployConfig) -> Result<()> {
    if config.poll.max_attempts == 0 {
        return Err(ConfigError::InvalidValue {
            field: "poll.max_attempts".to_string(),
            message: "must be at least 1".to_string(),
        }
        .into());
    }
    Ok(())
}
