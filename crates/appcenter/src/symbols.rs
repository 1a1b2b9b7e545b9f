//! Debug symbol upload
//!
//! Three calls: register the upload (200), PUT the file to the returned blob
//! URL (201), then commit the upload (200). A failure part way leaves the
//! earlier steps in place.

use std::path::Path;

use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::App;
use crate::error::{AppCenterError, Result};
use crate::types::{Release, SymbolType};

const STATUS_COMMITTED: &str = "committed";

#[derive(Serialize)]
struct SymbolUploadRequest<'a> {
    symbol_type: SymbolType,
    #[serde(skip_serializing_if = "str::is_empty")]
    file_name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    build: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    version: &'a str,
}

/// Where to send the symbol file
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolUpload {
    pub symbol_upload_id: String,
    pub upload_url: String,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct SymbolUploadCommit<'a> {
    status: &'a str,
}

impl App {
    /// Upload a symbol file (dSYM zip or mapping.txt) for a release
    ///
    /// The symbol type follows the release platform: Android releases get a
    /// ProGuard mapping, everything else an Apple dSYM. Build and version
    /// come from the release, which Android requires.
    pub async fn upload_symbol(&self, path: &Path, release: &Release) -> Result<()> {
        let symbol_type = SymbolType::for_release(release);
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AppCenterError::ConfigurationError(format!(
                    "Not a file path: {}",
                    path.display()
                ))
            })?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AppCenterError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            release_id = release.id,
            %symbol_type,
            file = file_name,
            "uploading symbols"
        );

        let url = self.url(&["symbol_uploads"])?;
        let body = SymbolUploadRequest {
            symbol_type,
            file_name,
            build: &release.version,
            version: &release.short_version,
        };
        let upload: SymbolUpload = self
            .client()
            .fetch_json(Method::POST, url, Some(&body), StatusCode::OK)
            .await?;
        debug!(
            symbol_upload_id = %upload.symbol_upload_id,
            expires = ?upload.expiration_date,
            "symbol upload registered"
        );

        let blob_url = url::Url::parse(&upload.upload_url)?;
        self.client()
            .upload_bytes(
                Method::PUT,
                blob_url,
                bytes,
                &[("x-ms-blob-type", "BlockBlob")],
            )
            .await?
            .expect_status(StatusCode::CREATED)?;

        let commit_url = self.url(&["symbol_uploads", &upload.symbol_upload_id])?;
        self.client()
            .send_expect(
                Method::PATCH,
                commit_url,
                Some(&SymbolUploadCommit {
                    status: STATUS_COMMITTED,
                }),
                StatusCode::OK,
            )
            .await?;

        info!(symbol_upload_id = %upload.symbol_upload_id, "symbols committed");
        Ok(())
    }
}
