//! Release upload sequence
//!
//! Creating a release is a fixed sequence of calls against two hosts: the
//! API host and the upload domain the API hands back.
//!
//! 1. `POST uploads/releases` reserves an upload (201)
//! 2. `set_metadata` announces file name and size, returns the chunk layout (200)
//! 3. `upload_chunk` once per chunk, in the server's order (200 each)
//! 4. `finished` closes the upload (200)
//! 5. `PATCH uploads/releases/{id}` marks it `uploadFinished` (200)
//! 6. `GET uploads/releases/{id}` until `readyToBePublished`
//! 7. `GET releases/{release_distinct_id}` fetches the new release
//!
//! Nothing is retried or rolled back. The first failing step aborts.

use std::path::Path;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::app::App;
use crate::client::NO_BODY;
use crate::error::{AppCenterError, Result};
use crate::types::{Release, ReleaseOptions};

/// Upload status once the service has processed the binary
pub const STATUS_READY: &str = "readyToBePublished";

/// Upload status reported when processing failed
pub const STATUS_ERROR: &str = "error";

const STATUS_UPLOAD_FINISHED: &str = "uploadFinished";

#[derive(Serialize)]
struct NewUpload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    build_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    build_number: Option<&'a str>,
}

/// Upload reservation returned by step 1
#[derive(Debug, Clone, Deserialize)]
pub struct UploadAssets {
    pub id: String,
    pub package_asset_id: String,
    pub upload_domain: String,
    pub token: String,
    #[serde(default)]
    pub url_encoded_token: String,
}

/// Chunk layout returned by `set_metadata`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UploadMetadata {
    pub error: bool,
    pub chunk_size: u64,
    pub chunk_list: Vec<u64>,
    pub blob_partitions: u32,
    pub status_code: Option<String>,
}

/// Release upload status
#[derive(Debug, Clone, Deserialize)]
pub struct UploadStatus {
    pub id: String,
    pub upload_status: String,
    #[serde(default)]
    pub error_details: Option<String>,
    #[serde(default)]
    pub release_distinct_id: Option<u64>,
}

#[derive(Serialize)]
struct UploadStatusUpdate<'a> {
    upload_status: &'a str,
}

/// A file read into memory for upload
struct Artifact {
    file_name: String,
    bytes: Vec<u8>,
}

impl Artifact {
    async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AppCenterError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AppCenterError::ConfigurationError(format!(
                    "Not a file path: {}",
                    path.display()
                ))
            })?
            .to_string();

        Ok(Self { file_name, bytes })
    }

    fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// MIME type App Center expects for an artifact, by file extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "apk" | "aab" => "application/vnd.android.package-archive",
        "msi" => "application/x-msi",
        "plist" => "application/xml",
        "aetx" => "application/c-x509-ca-cert",
        "cer" => "application/pkix-cert",
        "xap" => "application/x-silverlight-app",
        "appx" => "application/x-appx",
        "appxbundle" => "application/x-appxbundle",
        "appxupload" | "appxsym" => "application/x-appxupload",
        "msix" => "application/x-msix",
        "msixbundle" => "application/x-msixbundle",
        "msixupload" | "msixsym" => "application/x-msixupload",
        _ => "application/octet-stream",
    }
}

/// Build a URL on the upload domain
fn upload_url(domain: &str, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(domain)?;
    url.path_segments_mut()
        .map_err(|_| {
            AppCenterError::UploadFailed(format!("upload domain is not a base URL: {}", domain))
        })?
        .pop_if_empty()
        .extend(segments);
    url.query_pairs_mut().extend_pairs(query);
    Ok(url)
}

impl App {
    /// Upload a binary and return the release it produced
    ///
    /// The file is read before the first request, so a missing or unreadable
    /// file fails without touching the network. Polling follows the
    /// client's [`PollOptions`](crate::PollOptions).
    pub async fn create_release(&self, opts: &ReleaseOptions) -> Result<Release> {
        let artifact = Artifact::read(&opts.file_path).await?;
        info!(
            app = %self.slug(),
            file = %artifact.file_name,
            size = artifact.size(),
            "creating release"
        );

        let assets = self.initiate_upload(opts).await?;
        let metadata = self.set_upload_metadata(&assets, &artifact).await?;
        self.upload_chunks(&assets, &metadata, &artifact).await?;
        self.finish_upload(&assets).await?;
        self.mark_upload_finished(&assets.id).await?;

        let release_id = self.wait_until_ready(&assets.id).await?;
        let release = self.release(release_id).await?;

        info!(
            release_id = release.id,
            version = %release.short_version,
            build = %release.version,
            "release created"
        );
        Ok(release)
    }

    async fn initiate_upload(&self, opts: &ReleaseOptions) -> Result<UploadAssets> {
        let url = self.url(&["uploads", "releases"])?;
        let body = NewUpload {
            build_version: opts.build_version.as_deref(),
            build_number: opts.build_number.as_deref(),
        };

        let assets: UploadAssets = self
            .client()
            .fetch_json(Method::POST, url, Some(&body), StatusCode::CREATED)
            .await?;

        debug!(
            upload_id = %assets.id,
            package_asset_id = %assets.package_asset_id,
            upload_domain = %assets.upload_domain,
            "upload reserved"
        );
        Ok(assets)
    }

    async fn set_upload_metadata(
        &self,
        assets: &UploadAssets,
        artifact: &Artifact,
    ) -> Result<UploadMetadata> {
        let file_size = artifact.size().to_string();
        let url = upload_url(
            &assets.upload_domain,
            &["upload", "set_metadata", &assets.package_asset_id],
            &[
                ("file_name", artifact.file_name.as_str()),
                ("file_size", file_size.as_str()),
                ("token", assets.token.as_str()),
                ("content_type", content_type_for(&artifact.file_name)),
            ],
        )?;

        let metadata: UploadMetadata = self
            .client()
            .signed_request(Method::POST, url, NO_BODY)
            .await?
            .expect_status(StatusCode::OK)?
            .json()?;

        if metadata.error {
            return Err(AppCenterError::UploadFailed(format!(
                "set_metadata rejected the upload: {}",
                metadata.status_code.as_deref().unwrap_or("unknown")
            )));
        }

        debug!(
            chunk_size = metadata.chunk_size,
            chunks = metadata.chunk_list.len(),
            blob_partitions = metadata.blob_partitions,
            "upload metadata accepted"
        );
        Ok(metadata)
    }

    async fn upload_chunks(
        &self,
        assets: &UploadAssets,
        metadata: &UploadMetadata,
        artifact: &Artifact,
    ) -> Result<()> {
        let chunks = split_chunks(&artifact.bytes, metadata)?;

        for (index, (block_number, chunk)) in metadata.chunk_list.iter().zip(chunks).enumerate() {
            let block = block_number.to_string();
            let url = upload_url(
                &assets.upload_domain,
                &["upload", "upload_chunk", &assets.package_asset_id],
                &[("token", assets.token.as_str()), ("block_number", block.as_str())],
            )?;

            self.client()
                .upload_bytes(Method::POST, url, chunk.to_vec(), &[])
                .await?
                .expect_status(StatusCode::OK)?;

            debug!(
                block_number,
                bytes = chunk.len(),
                progress = %format!("{}/{}", index + 1, metadata.chunk_list.len()),
                "chunk uploaded"
            );
        }

        Ok(())
    }

    async fn finish_upload(&self, assets: &UploadAssets) -> Result<()> {
        let url = upload_url(
            &assets.upload_domain,
            &["upload", "finished", &assets.package_asset_id],
            &[("token", assets.token.as_str())],
        )?;

        self.client()
            .signed_request(Method::POST, url, NO_BODY)
            .await?
            .expect_status(StatusCode::OK)?;
        Ok(())
    }

    async fn mark_upload_finished(&self, upload_id: &str) -> Result<()> {
        let url = self.url(&["uploads", "releases", upload_id])?;
        let body = UploadStatusUpdate {
            upload_status: STATUS_UPLOAD_FINISHED,
        };

        self.client()
            .send_expect(Method::PATCH, url, Some(&body), StatusCode::OK)
            .await?;
        Ok(())
    }

    /// Poll the upload until it is ready and return the new release ID
    async fn wait_until_ready(&self, upload_id: &str) -> Result<u64> {
        let poll = self.client().poll_options();
        let url = self.url(&["uploads", "releases", upload_id])?;
        info!(upload_id, "waiting for release to be processed");

        for attempt in 1..=poll.max_attempts {
            let status: UploadStatus = self
                .client()
                .fetch_json(Method::GET, url.clone(), NO_BODY, StatusCode::OK)
                .await?;

            match status.upload_status.as_str() {
                STATUS_READY => {
                    return status.release_distinct_id.ok_or_else(|| {
                        AppCenterError::UploadFailed(format!(
                            "upload {} is ready but has no release_distinct_id",
                            upload_id
                        ))
                    });
                }
                STATUS_ERROR => {
                    let details = status.error_details.unwrap_or_default();
                    warn!(upload_id, %details, "release processing failed");
                    return Err(AppCenterError::UploadFailed(format!(
                        "upload {} failed: {}",
                        upload_id, details
                    )));
                }
                other => debug!(attempt, status = other, "release not ready yet"),
            }

            if attempt < poll.max_attempts {
                tokio::time::sleep(poll.interval).await;
            }
        }

        Err(AppCenterError::Timeout(format!(
            "upload {} not ready after {} status checks",
            upload_id, poll.max_attempts
        )))
    }
}

/// Split the file according to the server's chunk layout
fn split_chunks<'a>(bytes: &'a [u8], metadata: &UploadMetadata) -> Result<Vec<&'a [u8]>> {
    if metadata.chunk_size == 0 {
        return Err(AppCenterError::UploadFailed(
            "server returned a chunk size of 0".to_string(),
        ));
    }

    let chunk_size = usize::try_from(metadata.chunk_size).map_err(|_| {
        AppCenterError::UploadFailed(format!("chunk size {} too large", metadata.chunk_size))
    })?;
    let chunks: Vec<&[u8]> = bytes.chunks(chunk_size).collect();

    if chunks.len() != metadata.chunk_list.len() {
        return Err(AppCenterError::UploadFailed(format!(
            "file splits into {} chunks of {} bytes but the server expects {}",
            chunks.len(),
            chunk_size,
            metadata.chunk_list.len()
        )));
    }

    Ok(chunks)
}
