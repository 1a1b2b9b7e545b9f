//! Error types for App Center operations

use std::path::PathBuf;

use thiserror::Error;

/// App Center client errors
#[derive(Debug, Error)]
pub enum AppCenterError {
    /// The request could not be sent or no response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response arrived with a status other than the one the operation expects
    #[error("invalid status code: {status}, url: {url}, body: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    /// Response body did not match the expected JSON shape
    #[error("failed to decode response: {source}, response: {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// Request body could not be serialized
    #[error("failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Local file could not be read while preparing an upload
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The `appcenter` command line tool failed
    #[error("{command} failed: {output}")]
    CommandFailed { command: String, output: String },

    /// The upload protocol could not be completed
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Polling gave up before the release became ready
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// No release matched the lookup
    #[error("Release not found: {0}")]
    ReleaseNotFound(String),

    /// A URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Client or workflow misconfiguration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Configuration file loading or validation failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for App Center operations
pub type Result<T> = std::result::Result<T, AppCenterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_message() {
        let err = AppCenterError::UnexpectedStatus {
            status: 500,
            url: "https://api.appcenter.ms/v0.1/apps/o/a/releases/42/testers".to_string(),
            body: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("/releases/42/testers"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: AppCenterError = ConfigError::MissingField("owner".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Missing required configuration field: owner"
        );
    }
}
