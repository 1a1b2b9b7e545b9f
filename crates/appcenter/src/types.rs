//! App Center data types
//!
//! These mirror the JSON documents returned by the distribution API. Field
//! names are snake_case on the wire, so no renaming is needed. Descriptive
//! fields the service may omit or send as `null` are optional.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Platform name App Center reports for Android releases
pub const ANDROID_OS: &str = "Android";

/// A release as returned by `GET /releases/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    /// Numeric release ID assigned by the service
    pub id: u64,
    pub app_name: String,
    pub app_display_name: Option<String>,
    /// Platform, e.g. "Android" or "iOS"
    pub app_os: Option<String>,
    /// Build version (version code / CFBundleVersion)
    pub version: String,
    pub origin: Option<String>,
    /// Marketing version (version name / CFBundleShortVersionString)
    pub short_version: String,
    pub release_notes: Option<String>,
    pub provisioning_profile_name: Option<String>,
    pub provisioning_profile_type: Option<String>,
    pub provisioning_profile_expiry_date: Option<String>,
    pub is_provisioning_profile_syncing: Option<bool>,
    pub size: Option<u64>,
    pub min_os: Option<String>,
    pub device_family: Option<String>,
    pub android_min_api_level: Option<String>,
    pub bundle_identifier: Option<String>,
    pub package_hashes: Vec<String>,
    pub fingerprint: Option<String>,
    pub uploaded_at: Option<String>,
    pub download_url: Option<String>,
    pub app_icon_url: Option<String>,
    pub install_url: Option<String>,
    pub destination_type: Option<String>,
    pub distribution_groups: Vec<GroupRef>,
    pub distribution_stores: Vec<StoreRef>,
    pub destinations: Vec<Destination>,
    pub is_udid_provisioned: Option<bool>,
    pub can_resign: Option<bool>,
    pub build: Option<BuildInfo>,
    pub enabled: bool,
    pub status: Option<String>,
    pub is_external_build: Option<bool>,
}

impl Release {
    /// Whether the release was built for Android
    pub fn is_android(&self) -> bool {
        self.app_os.as_deref() == Some(ANDROID_OS)
    }
}

/// Element of the `GET /releases` listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseSummary {
    pub id: u64,
    pub version: String,
    pub short_version: String,
    pub origin: Option<String>,
    pub uploaded_at: Option<String>,
    pub enabled: bool,
    pub destinations: Vec<Destination>,
}

/// Distribution group referenced by a release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRef {
    pub id: String,
    pub name: String,
}

/// Distribution store referenced by a release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreRef {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub store_type: Option<String>,
    pub publishing_status: Option<String>,
}

/// Where a release has been distributed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Destination {
    pub id: String,
    pub name: Option<String>,
    pub is_latest: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub publishing_status: Option<String>,
    pub destination_type: Option<String>,
    pub display_name: Option<String>,
}

/// Source control details of the build behind a release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildInfo {
    pub branch_name: Option<String>,
    pub commit_hash: Option<String>,
    pub commit_message: Option<String>,
}

/// Distribution group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub display_name: Option<String>,
    pub origin: Option<String>,
    pub is_public: bool,
}

/// Distribution store (Google Play, App Store Connect, Intune, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Store {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub store_type: Option<String>,
    pub track: Option<String>,
    pub intune_details: Option<IntuneDetails>,
    pub service_connection_id: Option<String>,
    pub created_by: Option<String>,
}

/// Intune-specific store settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntuneDetails {
    pub target_audience: Option<NamedRef>,
    pub app_category: Option<NamedRef>,
}

/// A `{ name, id }` pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedRef {
    pub name: String,
    pub id: String,
}

/// Symbol file kind accepted by `symbol_uploads`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolType {
    /// Apple dSYM bundle
    Apple,
    /// Android ProGuard/R8 mapping file
    AndroidProguard,
}

impl SymbolType {
    /// Pick the symbol kind matching a release's platform
    pub fn for_release(release: &Release) -> Self {
        if release.is_android() {
            SymbolType::AndroidProguard
        } else {
            SymbolType::Apple
        }
    }
}

impl std::fmt::Display for SymbolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolType::Apple => write!(f, "Apple"),
            SymbolType::AndroidProguard => write!(f, "AndroidProguard"),
        }
    }
}

/// Parameters for creating a release
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    /// Artifact to upload (APK, AAB, IPA, ...)
    pub file_path: PathBuf,

    /// Build number override
    pub build_number: Option<String>,

    /// Build version override
    pub build_version: Option<String>,

    /// Distribution groups, in attachment order
    pub group_names: Vec<String>,

    /// Force testers to install the update
    pub mandatory: bool,

    /// Email testers about the new release
    pub notify_testers: bool,
}

/// Upload status polling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between status requests
    pub interval: Duration,

    /// Number of status requests before giving up
    pub max_attempts: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 200,
        }
    }
}
