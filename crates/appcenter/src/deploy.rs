//! End-to-end deploy of one build
//!
//! Runs the steps a CI job needs after a build: create the release, share it
//! with groups, stores and testers, set notes, upload symbols. Steps run in
//! that order and the first failure ends the run.

use serde::Serialize;
use tracing::{debug, info};

use crate::client::Client;
use crate::config::{DeployConfig, UploadMode};
use crate::error::{ConfigError, Result};
use crate::runner::CommandRunner;
use crate::types::Release;

/// What a deploy run did
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub app: String,
    pub mode: UploadMode,
    pub release: Release,
    pub groups: usize,
    pub stores: usize,
    pub testers: usize,
    pub notes_updated: bool,
    pub symbols_uploaded: bool,
}

impl DeployConfig {
    /// Client for this configuration's token, base URL and polling policy
    pub fn client(&self, debug_http: bool) -> Result<Client> {
        let token = self
            .api_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingField("api_token".to_string()))?;

        let mut builder = Client::builder(token)
            .poll_options(self.poll.into())
            .debug(debug_http);
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url.clone());
        }
        builder.build()
    }
}

fn non_empty(names: &[String]) -> impl Iterator<Item = &String> {
    names.iter().filter(|n| !n.is_empty())
}

/// Create a release and distribute it as configured
///
/// `runner` is only used in [`UploadMode::Cli`].
pub async fn deploy(
    client: &Client,
    config: &DeployConfig,
    runner: &dyn CommandRunner,
) -> Result<DeployReport> {
    let app = client.app(config.owner.as_str(), config.app.as_str());
    let opts = config.release_options();
    let mode = config.release.mode;
    info!(app = %app.slug(), %mode, file = %opts.file_path.display(), "starting deploy");

    let release = match mode {
        UploadMode::Api => app.create_release(&opts).await?,
        UploadMode::Cli => app.create_release_with_cli(runner, &opts).await?,
    };

    let mut groups = 0;
    match mode {
        UploadMode::Api => {
            for name in non_empty(&config.groups) {
                let group = app.group(name).await?;
                app.add_release_to_group(&group, release.id, &opts).await?;
                groups += 1;
            }
        }
        // The tool and the follow-up attach in create_release_with_cli
        // already covered every group.
        UploadMode::Cli => groups = non_empty(&config.groups).count(),
    }

    let mut stores = 0;
    for name in non_empty(&config.stores) {
        let store = app.store(name).await?;
        app.add_release_to_store(&store, release.id).await?;
        stores += 1;
    }

    let mut testers = 0;
    for email in non_empty(&config.testers) {
        app.add_tester_to_release(email, release.id, &opts).await?;
        testers += 1;
    }

    let notes = config.resolve_release_notes()?.filter(|n| !n.trim().is_empty());
    let notes_updated = match notes {
        Some(notes) => {
            app.set_release_notes(&notes, release.id).await?;
            true
        }
        None => {
            debug!("no release notes configured");
            false
        }
    };

    let symbols_uploaded = match &config.release.symbols {
        Some(path) => {
            app.upload_symbol(path, &release).await?;
            true
        }
        None => false,
    };

    info!(
        release_id = release.id,
        groups,
        stores,
        testers,
        notes_updated,
        symbols_uploaded,
        "deploy finished"
    );

    Ok(DeployReport {
        app: app.slug(),
        mode,
        release,
        groups,
        stores,
        testers,
        notes_updated,
        symbols_uploaded,
    })
}
