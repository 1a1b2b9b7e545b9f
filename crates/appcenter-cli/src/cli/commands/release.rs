//! Release command - inspect and update existing releases

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde_json::json;
use tracing::info;

use appcenter::{App, ReleaseOptions};

use super::common::{open_app, AppArgs};
use crate::cli::{output, Cli, OutputFormat};

/// Release management
#[derive(Debug, Args)]
pub struct ReleaseCommand {
    #[command(flatten)]
    pub target: AppArgs,

    #[command(subcommand)]
    pub subcommand: ReleaseSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ReleaseSubcommand {
    /// Show a release
    Show {
        /// Release ID
        id: u64,
    },

    /// Show the most recent release
    Latest,

    /// Replace a release's notes
    Notes {
        /// Release ID
        id: u64,

        /// New notes
        #[arg(required_unless_present = "file")]
        text: Option<String>,

        /// Read the notes from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// Share a release with a tester
    AddTester {
        /// Release ID
        id: u64,

        /// Tester email
        email: String,

        #[command(flatten)]
        flags: DistributionFlags,
    },

    /// Distribute a release to a group
    AddGroup {
        /// Release ID
        id: u64,

        /// Group name
        group: String,

        #[command(flatten)]
        flags: DistributionFlags,
    },

    /// Submit a release to a store
    AddStore {
        /// Release ID
        id: u64,

        /// Store name
        store: String,
    },

    /// Upload a symbol file for a release
    UploadSymbols {
        /// Release ID
        id: u64,

        /// dSYM zip or mapping.txt
        path: PathBuf,
    },
}

/// Flags sent with group and tester distribution
#[derive(Debug, Args)]
pub struct DistributionFlags {
    /// Force testers to install the update
    #[arg(long)]
    pub mandatory: bool,

    /// Email testers about the release
    #[arg(long)]
    pub notify_testers: bool,
}

impl DistributionFlags {
    fn options(&self) -> ReleaseOptions {
        ReleaseOptions {
            mandatory: self.mandatory,
            notify_testers: self.notify_testers,
            ..Default::default()
        }
    }
}

impl ReleaseCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let subcommand_name = match &self.subcommand {
            ReleaseSubcommand::Show { .. } => "show",
            ReleaseSubcommand::Latest => "latest",
            ReleaseSubcommand::Notes { .. } => "notes",
            ReleaseSubcommand::AddTester { .. } => "add-tester",
            ReleaseSubcommand::AddGroup { .. } => "add-group",
            ReleaseSubcommand::AddStore { .. } => "add-store",
            ReleaseSubcommand::UploadSymbols { .. } => "upload-symbols",
        };
        info!(subcommand = subcommand_name, "executing release command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let app = open_app(cli, &self.target)?;

        match &self.subcommand {
            ReleaseSubcommand::Show { id } => {
                let release = app.release(*id).await?;
                show(cli, &release)
            }

            ReleaseSubcommand::Latest => {
                let release = app.latest_release().await?;
                show(cli, &release)
            }

            ReleaseSubcommand::Notes { id, text, file } => {
                let notes = match file {
                    Some(path) => std::fs::read_to_string(path)
                        .map_err(|e| anyhow::anyhow!("Failed to read notes file: {}", e))?
                        .trim()
                        .to_string(),
                    None => text.clone().unwrap_or_default(),
                };
                app.set_release_notes(&notes, *id).await?;
                done(cli, &app, *id, "notes", "Release notes updated")
            }

            ReleaseSubcommand::AddTester { id, email, flags } => {
                app.add_tester_to_release(email, *id, &flags.options()).await?;
                done(
                    cli,
                    &app,
                    *id,
                    "tester",
                    &format!("Shared release {} with {}", id, style(email).cyan()),
                )
            }

            ReleaseSubcommand::AddGroup { id, group, flags } => {
                let group = app.group(group).await?;
                app.add_release_to_group(&group, *id, &flags.options()).await?;
                done(
                    cli,
                    &app,
                    *id,
                    "group",
                    &format!("Added release {} to group '{}'", id, style(&group.name).cyan()),
                )
            }

            ReleaseSubcommand::AddStore { id, store } => {
                let store = app.store(store).await?;
                app.add_release_to_store(&store, *id).await?;
                done(
                    cli,
                    &app,
                    *id,
                    "store",
                    &format!("Submitted release {} to store '{}'", id, style(&store.name).cyan()),
                )
            }

            ReleaseSubcommand::UploadSymbols { id, path } => {
                let release = app.release(*id).await?;
                app.upload_symbol(path, &release).await?;
                done(
                    cli,
                    &app,
                    *id,
                    "symbols",
                    &format!("Uploaded symbols for release {}", id),
                )
            }
        }
    }
}

fn show(cli: &Cli, release: &appcenter::Release) -> anyhow::Result<()> {
    if cli.format == OutputFormat::Json {
        output::json(release)?;
    } else if !cli.quiet {
        output::print_release(release);
    }
    Ok(())
}

fn done(cli: &Cli, app: &App, id: u64, action: &str, message: &str) -> anyhow::Result<()> {
    if cli.format == OutputFormat::Json {
        output::json(&json!({
            "app": app.slug(),
            "release_id": id,
            "action": action,
            "ok": true,
        }))?;
    } else if !cli.quiet {
        output::success(message);
    }
    Ok(())
}
