//! Deploy configuration types

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{PollOptions, ReleaseOptions};

/// How the release binary reaches App Center
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// Chunked upload over the REST API
    #[default]
    Api,
    /// Delegate to the `appcenter` command line tool
    Cli,
}

impl std::fmt::Display for UploadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadMode::Api => write!(f, "api"),
            UploadMode::Cli => write!(f, "cli"),
        }
    }
}

impl std::str::FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "api" => Ok(UploadMode::Api),
            "cli" => Ok(UploadMode::Cli),
            other => Err(format!("unknown upload mode '{}', expected api or cli", other)),
        }
    }
}

/// Everything a deploy run needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// API token, usually supplied through `APPCENTER_API_TOKEN`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// App owner (user or organization)
    pub owner: String,

    /// App name
    pub app: String,

    /// API base URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Release upload settings
    pub release: ReleaseConfig,

    /// Distribution group names, in attachment order
    pub groups: Vec<String>,

    /// Distribution store names
    pub stores: Vec<String>,

    /// Tester email addresses
    pub testers: Vec<String>,

    /// Upload status polling
    pub poll: PollConfig,
}

/// Release upload settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Artifact to upload
    pub file: Option<PathBuf>,

    /// Upload path
    pub mode: UploadMode,

    /// Build number override
    pub build_number: Option<String>,

    /// Build version override
    pub build_version: Option<String>,

    /// Release notes text
    pub notes: Option<String>,

    /// Read release notes from this file when `notes` is unset
    pub notes_file: Option<PathBuf>,

    /// Symbol file (dSYM zip or mapping.txt) to upload after release
    pub symbols: Option<PathBuf>,

    /// Force testers to update
    pub mandatory: bool,

    /// Email testers about the release
    pub notify_testers: bool,
}

/// Polling settings in config-file units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between status checks
    pub interval_secs: u64,

    /// Status checks before giving up
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        let defaults = PollOptions::default();
        Self {
            interval_secs: defaults.interval.as_secs(),
            max_attempts: defaults.max_attempts,
        }
    }
}

impl From<PollConfig> for PollOptions {
    fn from(config: PollConfig) -> Self {
        PollOptions {
            interval: Duration::from_secs(config.interval_secs),
            max_attempts: config.max_attempts,
        }
    }
}

impl DeployConfig {
    /// Release options for the upload step
    ///
    /// An unset file yields an empty path; validation rejects that before
    /// a deploy starts.
    pub fn release_options(&self) -> ReleaseOptions {
        ReleaseOptions {
            file_path: self.release.file.clone().unwrap_or_default(),
            build_number: self.release.build_number.clone(),
            build_version: self.release.build_version.clone(),
            group_names: self.groups.clone(),
            mandatory: self.release.mandatory,
            notify_testers: self.release.notify_testers,
        }
    }
}
